//! Wait Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::steps::DEFAULT_WAIT_TIMEOUT_MS;
use virtuoso_common::StepAction;

use crate::commands::step::{self, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum WaitCommands {
    /// Wait for an element to appear
    Element {
        /// Element selector or visible text
        selector: String,

        /// Timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_WAIT_TIMEOUT_MS)]
        timeout: u64,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Wait for an element to disappear
    ElementNotVisible {
        /// Element selector or visible text
        selector: String,

        /// Timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_WAIT_TIMEOUT_MS)]
        timeout: u64,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Pause for a fixed time
    Time {
        /// Duration in milliseconds
        milliseconds: u64,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl WaitCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            WaitCommands::Element {
                selector,
                timeout,
                target,
            } => (
                StepAction::WaitElement {
                    selector,
                    timeout_ms: timeout,
                },
                target,
            ),
            WaitCommands::ElementNotVisible {
                selector,
                timeout,
                target,
            } => (
                StepAction::WaitElementNotVisible {
                    selector,
                    timeout_ms: timeout,
                },
                target,
            ),
            WaitCommands::Time {
                milliseconds,
                target,
            } => (StepAction::WaitTime { ms: milliseconds }, target),
        }
    }
}

pub async fn execute(cmd: WaitCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
