//! Assertion Commands

use anyhow::Result;
use clap::{Args, Subcommand};

use virtuoso_common::StepAction;

use crate::commands::step::{self, SelectorArgs, SelectorValueArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum AssertCommands {
    /// Assert that an element exists
    Exists(SelectorArgs),

    /// Assert that an element does not exist
    NotExists(SelectorArgs),

    /// Assert that an element has the given text
    Equals(SelectorValueArgs),

    /// Assert that an element does not have the given text
    NotEquals(SelectorValueArgs),

    /// Assert that an element's value is greater than a value
    Gt(SelectorValueArgs),

    /// Assert that an element's value is greater than or equal to a value
    Gte(SelectorValueArgs),

    /// Assert that an element's value is less than a value
    Lt(SelectorValueArgs),

    /// Assert that an element's value is less than or equal to a value
    Lte(SelectorValueArgs),

    /// Assert that an element's text matches a regular expression
    Matches(SelectorValueArgs),

    /// Assert that a checkbox or radio button is checked
    Checked(SelectorArgs),

    /// Assert that an option is selected
    Selected(SelectorArgs),

    /// Assert that a stored variable has a value
    Variable(VariableArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VariableArgs {
    /// Variable name
    pub name: String,

    /// Expected value
    pub expected: String,

    #[command(flatten)]
    pub target: StepTarget,
}

impl AssertCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        use AssertCommands::*;
        match self {
            Exists(a) => (StepAction::AssertExists { element: a.selector }, a.target),
            NotExists(a) => (StepAction::AssertNotExists { element: a.selector }, a.target),
            Equals(a) => (
                StepAction::AssertEquals {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            NotEquals(a) => (
                StepAction::AssertNotEquals {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            Gt(a) => (
                StepAction::AssertGreaterThan {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            Gte(a) => (
                StepAction::AssertGreaterThanOrEqual {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            Lt(a) => (
                StepAction::AssertLessThan {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            Lte(a) => (
                StepAction::AssertLessThanOrEqual {
                    element: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            Matches(a) => (
                StepAction::AssertMatches {
                    element: a.selector,
                    pattern: a.value,
                },
                a.target,
            ),
            Checked(a) => (StepAction::AssertChecked { element: a.selector }, a.target),
            Selected(a) => (StepAction::AssertSelected { element: a.selector }, a.target),
            Variable(a) => (
                StepAction::AssertVariable {
                    name: a.name,
                    expected: a.expected,
                },
                a.target,
            ),
        }
    }
}

pub async fn execute(cmd: AssertCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
