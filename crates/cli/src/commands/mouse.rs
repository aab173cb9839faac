//! Mouse Commands

use anyhow::Result;
use clap::Subcommand;

use virtuoso_common::StepAction;

use crate::commands::step::{self, SelectorArgs, StepTarget};
use crate::commands::Context;

#[derive(Subcommand)]
pub enum MouseCommands {
    /// Press the mouse button on an element
    Down(SelectorArgs),

    /// Release the mouse button on an element
    Up(SelectorArgs),

    /// Move the mouse into an element
    Enter(SelectorArgs),

    /// Move the mouse to an element
    Move(SelectorArgs),

    /// Move the mouse by a relative offset
    #[command(allow_negative_numbers = true)]
    MoveBy {
        /// Horizontal offset in pixels
        dx: i32,

        /// Vertical offset in pixels
        dy: i32,

        #[command(flatten)]
        target: StepTarget,
    },

    /// Move the mouse to page coordinates
    #[command(allow_negative_numbers = true)]
    MoveTo {
        /// X coordinate
        x: i32,

        /// Y coordinate
        y: i32,

        #[command(flatten)]
        target: StepTarget,
    },
}

impl MouseCommands {
    pub fn into_step(self) -> (StepAction, StepTarget) {
        match self {
            MouseCommands::Down(a) => (StepAction::MouseDown { selector: a.selector }, a.target),
            MouseCommands::Up(a) => (StepAction::MouseUp { selector: a.selector }, a.target),
            MouseCommands::Enter(a) => (StepAction::MouseEnter { selector: a.selector }, a.target),
            MouseCommands::Move(a) => (StepAction::MouseMove { selector: a.selector }, a.target),
            MouseCommands::MoveBy { dx, dy, target } => (StepAction::MouseMoveBy { dx, dy }, target),
            MouseCommands::MoveTo { x, y, target } => (StepAction::MouseMoveTo { x, y }, target),
        }
    }
}

pub async fn execute(cmd: MouseCommands, ctx: &Context) -> Result<()> {
    let (action, target) = cmd.into_step();
    step::run(ctx, action, &target).await
}
