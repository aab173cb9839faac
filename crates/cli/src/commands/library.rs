//! Library Checkpoint Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

use virtuoso_common::{Checkpoint, CheckpointId, LibraryCheckpoint};

use crate::commands::Context;
use crate::output::{library_human, print_value};

#[derive(Subcommand)]
pub enum LibraryCommands {
    /// Convert a checkpoint into a reusable library checkpoint
    Add {
        /// Checkpoint ID
        checkpoint_id: String,
    },

    /// Show a library checkpoint and its steps
    Get {
        /// Library checkpoint ID
        library_checkpoint_id: u64,
    },

    /// Attach a library checkpoint to a journey
    Attach {
        /// Journey (test suite) ID
        journey_id: u64,

        /// Library checkpoint ID
        library_checkpoint_id: u64,

        /// Position in the journey
        position: u32,
    },

    /// Move a step inside a library checkpoint
    MoveStep {
        /// Library checkpoint ID
        library_checkpoint_id: u64,

        /// Test step ID
        step_id: u64,

        /// New position
        position: u32,
    },

    /// Remove a step from a library checkpoint
    RemoveStep {
        /// Library checkpoint ID
        library_checkpoint_id: u64,

        /// Test step ID
        step_id: u64,
    },

    /// Rename a library checkpoint
    Update {
        /// Library checkpoint ID
        library_checkpoint_id: u64,

        /// New title
        title: String,
    },
}

/// Result of library operations that return no entity
#[derive(Debug, Serialize)]
pub struct LibraryStepChange {
    pub status: &'static str,
    pub operation: &'static str,
    pub library_checkpoint_id: u64,
    pub step_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// Result of attaching a library checkpoint
#[derive(Debug, Serialize)]
pub struct AttachResult {
    pub status: &'static str,
    pub journey_id: u64,
    pub library_checkpoint_id: u64,
    pub position: u32,
    pub checkpoint: Checkpoint,
}

pub async fn execute(cmd: LibraryCommands, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match cmd {
        LibraryCommands::Add { checkpoint_id } => {
            let id = CheckpointId::parse(&checkpoint_id)?;
            let library = client.add_to_library(&id).await?;
            info!(checkpoint = %id, library_checkpoint = library.id, "added to library");
            print_value(&library, ctx.format, || {
                format!(
                    "✅ Checkpoint {} added to library as {} ({})\n",
                    id, library.id, library.name
                )
            })?;
        }

        LibraryCommands::Get {
            library_checkpoint_id,
        } => {
            let library: LibraryCheckpoint =
                client.get_library_checkpoint(library_checkpoint_id).await?;
            print_value(&library, ctx.format, || library_human(&library))?;
        }

        LibraryCommands::Attach {
            journey_id,
            library_checkpoint_id,
            position,
        } => {
            let checkpoint = client
                .attach_library_checkpoint(journey_id, library_checkpoint_id, position)
                .await?;
            let result = AttachResult {
                status: "success",
                journey_id,
                library_checkpoint_id,
                position,
                checkpoint,
            };
            print_value(&result, ctx.format, || {
                format!(
                    "✅ Attached library checkpoint {} to journey {} at position {} (checkpoint {})\n",
                    library_checkpoint_id, journey_id, position, result.checkpoint.id
                )
            })?;
        }

        LibraryCommands::MoveStep {
            library_checkpoint_id,
            step_id,
            position,
        } => {
            client
                .move_library_step(library_checkpoint_id, step_id, position)
                .await?;
            let change = LibraryStepChange {
                status: "success",
                operation: "move",
                library_checkpoint_id,
                step_id,
                position: Some(position),
            };
            print_value(&change, ctx.format, || {
                format!(
                    "✅ Moved step {} to position {} in library checkpoint {}\n",
                    step_id, position, library_checkpoint_id
                )
            })?;
        }

        LibraryCommands::RemoveStep {
            library_checkpoint_id,
            step_id,
        } => {
            client
                .remove_library_step(library_checkpoint_id, step_id)
                .await?;
            let change = LibraryStepChange {
                status: "success",
                operation: "remove",
                library_checkpoint_id,
                step_id,
                position: None,
            };
            print_value(&change, ctx.format, || {
                format!(
                    "✅ Removed step {} from library checkpoint {}\n",
                    step_id, library_checkpoint_id
                )
            })?;
        }

        LibraryCommands::Update {
            library_checkpoint_id,
            title,
        } => {
            if title.trim().is_empty() {
                return Err(virtuoso_common::Error::InvalidArgument(
                    "title cannot be empty".to_string(),
                )
                .into());
            }
            let library = client
                .update_library_checkpoint(library_checkpoint_id, &title)
                .await?;
            print_value(&library, ctx.format, || {
                format!(
                    "✅ Library checkpoint {} renamed to \"{}\"\n",
                    library_checkpoint_id, title
                )
            })?;
        }
    }

    Ok(())
}
