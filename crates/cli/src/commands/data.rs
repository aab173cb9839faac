//! Data Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::steps::CookieOptions;
use virtuoso_common::StepAction;

use crate::commands::step::{self, NoArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum DataCommands {
    /// Store values in variables
    #[command(subcommand)]
    Store(StoreCommands),

    /// Manage browser cookies
    #[command(subcommand)]
    Cookie(CookieCommands),
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Store an element's text
    ElementText {
        /// Element selector or visible text
        selector: String,

        /// Variable name
        variable: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Store a literal value
    Literal {
        /// Value to store
        value: String,

        /// Variable name
        variable: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Store an element attribute
    Attribute {
        /// Element selector or visible text
        selector: String,

        /// Attribute name (e.g. href)
        attribute: String,

        /// Variable name
        variable: String,

        #[command(flatten)]
        target: StepTarget,
    },
}

#[derive(Subcommand)]
pub enum CookieCommands {
    /// Create a cookie
    Create {
        /// Cookie name
        name: String,

        /// Cookie value
        value: String,

        /// Cookie domain
        #[arg(long)]
        domain: Option<String>,

        /// Cookie path
        #[arg(long)]
        path: Option<String>,

        /// Only send over HTTPS
        #[arg(long)]
        secure: bool,

        /// Hide from JavaScript
        #[arg(long)]
        http_only: bool,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Delete a cookie
    Delete {
        /// Cookie name
        name: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Delete all cookies
    ClearAll(NoArgs),
}

impl DataCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            DataCommands::Store(StoreCommands::ElementText {
                selector,
                variable,
                target,
            }) => (StepAction::StoreElementText { selector, variable }, target),
            DataCommands::Store(StoreCommands::Literal {
                value,
                variable,
                target,
            }) => (StepAction::StoreLiteral { value, variable }, target),
            DataCommands::Store(StoreCommands::Attribute {
                selector,
                attribute,
                variable,
                target,
            }) => (
                StepAction::StoreAttribute {
                    selector,
                    attribute,
                    variable,
                },
                target,
            ),
            DataCommands::Cookie(CookieCommands::Create {
                name,
                value,
                domain,
                path,
                secure,
                http_only,
                target,
            }) => (
                StepAction::CookieCreate {
                    name,
                    value,
                    options: CookieOptions {
                        domain,
                        path,
                        secure,
                        http_only,
                    },
                },
                target,
            ),
            DataCommands::Cookie(CookieCommands::Delete { name, target }) => {
                (StepAction::CookieDelete { name }, target)
            }
            DataCommands::Cookie(CookieCommands::ClearAll(a)) => {
                (StepAction::CookieClearAll, a.target)
            }
        }
    }
}

pub async fn execute(cmd: DataCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
