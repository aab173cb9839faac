//! Dialog Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, NoArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum DialogCommands {
    /// Dismiss a browser dialog
    #[command(subcommand)]
    Dismiss(DismissCommands),
}

#[derive(Subcommand)]
pub enum DismissCommands {
    /// Dismiss an alert
    Alert(NoArgs),

    /// Answer a confirm dialog
    Confirm {
        /// Press OK
        #[arg(long, conflicts_with = "reject")]
        accept: bool,

        /// Press Cancel (the default)
        #[arg(long)]
        reject: bool,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Cancel a prompt
    Prompt(NoArgs),

    /// Answer a prompt with text
    PromptWithText {
        /// Text to enter
        text: String,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl DialogCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        let DialogCommands::Dismiss(cmd) = self;
        match cmd {
            DismissCommands::Alert(a) => (StepAction::DismissAlert, a.target),
            DismissCommands::Confirm { accept, target, .. } => {
                (StepAction::DismissConfirm { accept }, target)
            }
            DismissCommands::Prompt(a) => (StepAction::DismissPrompt, a.target),
            DismissCommands::PromptWithText { text, target } => {
                (StepAction::DismissPromptWithText { text }, target)
            }
        }
    }
}

pub async fn execute(cmd: DialogCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
