//! Window and Frame Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::steps::parse_dimensions;
use virtuoso_common::StepAction;

use crate::commands::step::{self, NoArgs, SelectorArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum WindowCommands {
    /// Switch frames or tabs
    #[command(subcommand)]
    Switch(SwitchCommands),

    /// Resize the browser window
    Resize {
        /// Size as WIDTHxHEIGHT (e.g. 1024x768)
        size: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Maximize the browser window
    Maximize(NoArgs),
}

#[derive(Subcommand)]
pub enum SwitchCommands {
    /// Switch into an iframe
    Iframe(SelectorArgs),

    /// Switch to the parent frame
    ParentFrame(NoArgs),

    /// Switch browser tabs
    #[command(subcommand)]
    Tab(TabCommands),
}

#[derive(Subcommand)]
pub enum TabCommands {
    /// Switch to the next tab
    Next(NoArgs),

    /// Switch to the previous tab
    Prev(NoArgs),

    /// Switch to a tab by index
    Index {
        /// Zero-based tab index
        index: u32,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl WindowCommands {
    pub fn into_step(self) -> Result<(StepAction, StepTarget)> {
        let step = match self {
            WindowCommands::Switch(SwitchCommands::Iframe(a)) => {
                (StepAction::SwitchIframe { selector: a.selector }, a.target)
            }
            WindowCommands::Switch(SwitchCommands::ParentFrame(a)) => {
                (StepAction::SwitchParentFrame, a.target)
            }
            WindowCommands::Switch(SwitchCommands::Tab(TabCommands::Next(a))) => {
                (StepAction::SwitchNextTab, a.target)
            }
            WindowCommands::Switch(SwitchCommands::Tab(TabCommands::Prev(a))) => {
                (StepAction::SwitchPrevTab, a.target)
            }
            WindowCommands::Switch(SwitchCommands::Tab(TabCommands::Index { index, target })) => {
                (StepAction::SwitchTabIndex { index }, target)
            }
            WindowCommands::Resize { size, target } => {
                let (width, height) = parse_dimensions(&size)?;
                (StepAction::Resize { width, height }, target)
            }
            WindowCommands::Maximize(a) => (StepAction::Maximize, a.target),
        };
        Ok(step)
    }
}

pub async fn execute(cmd: WindowCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step()?;
    step::run(ctx, action, &target).await
}
