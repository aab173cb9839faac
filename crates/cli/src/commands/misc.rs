//! Miscellaneous Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum MiscCommands {
    /// Add a comment step
    Comment {
        /// Comment text
        text: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Run JavaScript in the page
    Execute {
        /// Script body or script name
        script: String,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl MiscCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            MiscCommands::Comment { text, target } => (StepAction::Comment { text }, target),
            MiscCommands::Execute { script, target } => (StepAction::Execute { script }, target),
        }
    }
}

pub async fn execute(cmd: MiscCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
