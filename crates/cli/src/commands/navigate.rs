//! Navigation Commands

use anyhow::Result;
use clap::{Args, Subcommand};

use virtuoso_common::steps::parse_coordinates;
use virtuoso_common::StepAction;

use crate::commands::step::{self, NoArgs, SelectorArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum NavigateCommands {
    /// Navigate to a URL
    To {
        /// URL to open (http:// or https://)
        url: String,

        /// Open the URL in a new tab
        #[arg(long)]
        new_tab: bool,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Scroll to the top of the page
    ScrollTop(NoArgs),

    /// Scroll to the bottom of the page
    ScrollBottom(NoArgs),

    /// Scroll an element into view
    ScrollElement(SelectorArgs),

    /// Scroll to absolute page coordinates
    ScrollPosition(CoordinateArgs),

    /// Scroll by a relative offset
    ScrollBy(CoordinateArgs),

    /// Scroll up one page step
    ScrollUp(NoArgs),

    /// Scroll down one page step
    ScrollDown(NoArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CoordinateArgs {
    /// Coordinates as X,Y (e.g. 0,500)
    #[arg(allow_hyphen_values = true)]
    pub coordinates: String,

    #[command(flatten)]
    pub target: StepTarget,
}

impl NavigateCommands {
    pub fn into_step(self) -> Result<(StepAction, StepTarget)> {
        let step = match self {
            NavigateCommands::To {
                url,
                new_tab,
                target,
            } => (StepAction::Navigate { url, new_tab }, target),
            NavigateCommands::ScrollTop(a) => (StepAction::ScrollTop, a.target),
            NavigateCommands::ScrollBottom(a) => (StepAction::ScrollBottom, a.target),
            NavigateCommands::ScrollElement(a) => {
                (StepAction::ScrollElement { selector: a.selector }, a.target)
            }
            NavigateCommands::ScrollPosition(a) => {
                let (x, y) = parse_coordinates(&a.coordinates)?;
                (StepAction::ScrollPosition { x, y }, a.target)
            }
            NavigateCommands::ScrollBy(a) => {
                let (x, y) = parse_coordinates(&a.coordinates)?;
                (StepAction::ScrollBy { x, y }, a.target)
            }
            NavigateCommands::ScrollUp(a) => (StepAction::ScrollUp, a.target),
            NavigateCommands::ScrollDown(a) => (StepAction::ScrollDown, a.target),
        };
        Ok(step)
    }
}

pub async fn execute(cmd: NavigateCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step()?;
    step::run(ctx, action, &target).await
}
