//! Dropdown Selection Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, SelectorArgs, SelectorValueArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum SelectCommands {
    /// Pick an option by its visible text
    #[command(name = "option")]
    ByText(SelectorValueArgs),

    /// Pick an option by its value attribute
    Value(SelectorValueArgs),

    /// Pick an option by index
    Index {
        /// Dropdown selector
        selector: String,

        /// Zero-based option index
        index: u32,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Pick the last option
    Last(SelectorArgs),
}

impl SelectCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            SelectCommands::ByText(a) => (
                StepAction::PickText {
                    selector: a.selector,
                    text: a.value,
                },
                a.target,
            ),
            SelectCommands::Value(a) => (
                StepAction::PickValue {
                    selector: a.selector,
                    value: a.value,
                },
                a.target,
            ),
            SelectCommands::Index {
                selector,
                index,
                target,
            } => (StepAction::PickIndex { selector, index }, target),
            SelectCommands::Last(a) => (StepAction::PickLast { selector: a.selector }, a.target),
        }
    }
}

pub async fn execute(cmd: SelectCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
