//! File Upload Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum FileCommands {
    /// Upload a file into a file input
    Upload {
        /// File input selector
        selector: String,

        /// Path or name of the file to upload
        path: String,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Upload a file fetched from a URL
    UploadUrl {
        /// File input selector
        selector: String,

        /// URL of the file (http:// or https://)
        url: String,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl FileCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            FileCommands::Upload {
                selector,
                path,
                target,
            } => (StepAction::Upload { selector, path }, target),
            FileCommands::UploadUrl {
                selector,
                url,
                target,
            } => (StepAction::UploadUrl { selector, url }, target),
        }
    }
}

pub async fn execute(cmd: FileCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
