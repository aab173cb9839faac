//! Session Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::fmt::Write as _;

use virtuoso_common::{CheckpointId, SessionState, SessionStore};

use crate::commands::Context;
use crate::output::{print_info, print_success, print_value, OutputFormat};

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Show the current session
    Show,

    /// Set the checkpoint new steps are added to
    SetCheckpoint {
        /// Checkpoint ID
        checkpoint_id: String,

        /// Skip checking that the checkpoint exists
        #[arg(long)]
        no_validate: bool,
    },

    /// Set the position of the next step
    SetPosition {
        /// Next step position (1 or more)
        position: u32,
    },

    /// Forget the checkpoint and reset the position
    Clear,
}

/// Session summary for output
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub session_file: String,
    #[serde(flatten)]
    pub state: &'a SessionState,
}

fn human(view: &SessionView<'_>) -> String {
    let mut text = String::from("📋 Session\n");
    let checkpoint = view
        .state
        .current_checkpoint_id
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "(none)".to_string());
    let _ = writeln!(text, "   Checkpoint:     {}", checkpoint);
    let _ = writeln!(text, "   Next position:  {}", view.state.next_position);
    let _ = writeln!(
        text,
        "   Auto-increment: {}",
        if view.state.auto_increment_enabled { "on" } else { "off" }
    );
    if let Some(updated) = view.state.updated_at {
        let _ = writeln!(text, "   Updated:        {}", updated.to_rfc3339());
    }
    let _ = writeln!(text, "   File:           {}", view.session_file);
    text
}

pub async fn execute(cmd: SessionCommands, ctx: &Context) -> Result<()> {
    let mut session = match cmd {
        SessionCommands::Clear | SessionCommands::SetCheckpoint { .. } => {
            ctx.load_session_or_default()
        }
        _ => ctx.load_session()?,
    };
    let chatty = matches!(ctx.format, OutputFormat::Human | OutputFormat::Ai);

    match cmd {
        SessionCommands::Show => {}

        SessionCommands::SetCheckpoint {
            checkpoint_id,
            no_validate,
        } => {
            let id = CheckpointId::parse(&checkpoint_id)?;
            if !no_validate {
                let client = ctx.client()?;
                let checkpoint = client.get_checkpoint(&id).await?;
                if chatty && !checkpoint.title.is_empty() {
                    print_info(&format!("Checkpoint {}: {}", id, checkpoint.title));
                }
            }
            session.set_checkpoint(id.clone())?;
            if chatty {
                print_success(&format!("Session checkpoint set to {}", id));
            }
        }

        SessionCommands::SetPosition { position } => {
            session.set_next_position(position)?;
            if chatty {
                print_success(&format!("Next step position set to {}", position));
            }
        }

        SessionCommands::Clear => {
            session.clear()?;
            if chatty {
                print_success("Session cleared");
            }
        }
    }

    let view = SessionView {
        session_file: session.store().describe(),
        state: session.state(),
    };
    print_value(&view, ctx.format, || human(&view))
}
