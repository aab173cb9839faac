//! Interaction Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, SelectorArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum InteractCommands {
    /// Click an element
    Click {
        /// Element selector or visible text
        selector: String,

        /// Variable holding the element to click
        #[arg(long)]
        variable: Option<String>,

        /// Where to click inside the element (e.g. TOP_LEFT, CENTER)
        #[arg(long)]
        position_type: Option<String>,

        /// Element kind hint (e.g. BUTTON, LINK)
        #[arg(long)]
        element_type: Option<String>,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Double-click an element
    DoubleClick(SelectorArgs),

    /// Right-click an element
    RightClick(SelectorArgs),

    /// Hover over an element
    Hover(SelectorArgs),

    /// Type text into an input
    Write {
        /// Input selector
        selector: String,

        /// Text to type
        text: String,

        /// Store the typed text in this variable
        #[arg(long)]
        variable: Option<String>,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Press a key (e.g. Enter, Tab, CTRL_a)
    Key {
        /// Key to press
        key: String,

        /// Send the key to this element instead of the page
        #[arg(long = "target")]
        element: Option<String>,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl InteractCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            InteractCommands::Click {
                selector,
                variable,
                position_type,
                element_type,
                target,
            } => (
                StepAction::Click {
                    selector,
                    variable,
                    position_type,
                    element_type,
                },
                target,
            ),
            InteractCommands::DoubleClick(a) => {
                (StepAction::DoubleClick { selector: a.selector }, a.target)
            }
            InteractCommands::RightClick(a) => {
                (StepAction::RightClick { selector: a.selector }, a.target)
            }
            InteractCommands::Hover(a) => (StepAction::Hover { selector: a.selector }, a.target),
            InteractCommands::Write {
                selector,
                text,
                variable,
                target,
            } => (
                StepAction::Write {
                    selector,
                    text,
                    variable,
                },
                target,
            ),
            InteractCommands::Key {
                key,
                element,
                target,
            } => (
                StepAction::Key {
                    key,
                    target: element,
                },
                target,
            ),
        }
    }
}

pub async fn execute(cmd: InteractCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
