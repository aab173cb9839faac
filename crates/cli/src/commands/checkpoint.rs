//! Checkpoint and step lookup commands

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

use virtuoso_common::{CheckpointId, Error, Journey, TestStep};

use crate::commands::Context;
use crate::output::{journey_human, print_success, print_value, OutputFormat};

#[derive(Args, Debug)]
pub struct ListCheckpointsArgs {
    /// Journey (test suite) ID
    pub journey_id: u64,
}

#[derive(Args, Debug)]
pub struct CreateCheckpointArgs {
    /// Journey (test suite) ID to attach the checkpoint to
    pub journey_id: u64,

    /// Goal ID
    pub goal_id: u64,

    /// Snapshot ID
    pub snapshot_id: u64,

    /// Checkpoint title
    pub name: String,

    /// Position in the journey (2 or more; 1 holds the navigation checkpoint)
    #[arg(long, default_value_t = 2)]
    pub position: u32,

    /// Also make the new checkpoint the session checkpoint
    #[arg(long)]
    pub use_in_session: bool,
}

#[derive(Args, Debug)]
pub struct GetStepArgs {
    /// Test step ID
    pub step_id: u64,
}

/// One row of `list-checkpoints`
#[derive(Debug, Serialize)]
pub struct CheckpointSummary {
    pub id: u64,
    pub position: u32,
    pub title: String,
    pub step_count: usize,
    pub is_navigation: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckpointList {
    pub journey_id: u64,
    pub journey_name: String,
    pub checkpoints: Vec<CheckpointSummary>,
}

impl From<&Journey> for CheckpointList {
    fn from(journey: &Journey) -> Self {
        Self {
            journey_id: journey.id,
            journey_name: journey.display_name().to_string(),
            checkpoints: journey
                .cases
                .iter()
                .map(|case| CheckpointSummary {
                    id: case.id,
                    position: case.position,
                    title: case.title.clone(),
                    step_count: case.steps.len(),
                    is_navigation: case.position == 1,
                })
                .collect(),
        }
    }
}

/// Result of `create-checkpoint`
#[derive(Debug, Serialize)]
pub struct CreatedCheckpoint {
    pub status: &'static str,
    pub checkpoint_id: u64,
    pub title: String,
    pub journey_id: u64,
    pub goal_id: u64,
    pub snapshot_id: u64,
    pub position: u32,
    pub session_updated: bool,
}

pub async fn list(args: ListCheckpointsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let journey = client.list_checkpoints(args.journey_id).await?;
    let list = CheckpointList::from(&journey);

    match ctx.format {
        OutputFormat::Ai => {
            print!("{}", list_ai(&list));
            Ok(())
        }
        format => print_value(&list, format, || journey_human(&journey)),
    }
}

fn list_ai(list: &CheckpointList) -> String {
    let mut text = format!(
        "Journey \"{}\" (id {}) has {} checkpoints.\n",
        list.journey_name,
        list.journey_id,
        list.checkpoints.len()
    );
    for checkpoint in &list.checkpoints {
        let _ = write!(
            text,
            "{}. \"{}\" (id {}), {} steps",
            checkpoint.position, checkpoint.title, checkpoint.id, checkpoint.step_count
        );
        if checkpoint.is_navigation {
            text.push_str(", holds the shared navigation step");
        }
        text.push('\n');
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Next steps:");
    let _ = writeln!(text, "- Pick a checkpoint: api-cli session set-checkpoint <ID>");
    let _ = writeln!(
        text,
        "- Add a checkpoint: api-cli create-checkpoint {} <GOAL_ID> <SNAPSHOT_ID> <NAME>",
        list.journey_id
    );
    text
}

pub async fn create(args: CreateCheckpointArgs, ctx: &Context) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(Error::InvalidArgument("checkpoint name cannot be empty".to_string()).into());
    }
    if args.position < 2 {
        return Err(Error::InvalidArgument(format!(
            "position must be 2 or greater, got {}",
            args.position
        ))
        .into());
    }

    let client = ctx.client()?;
    let checkpoint = client
        .create_checkpoint(args.goal_id, args.snapshot_id, &args.name)
        .await?;
    client
        .attach_checkpoint(args.journey_id, checkpoint.id, args.position)
        .await?;
    info!(
        checkpoint = checkpoint.id,
        journey = args.journey_id,
        position = args.position,
        "checkpoint created"
    );

    if args.use_in_session {
        let mut session = ctx.load_session_or_default();
        session.set_checkpoint(CheckpointId::parse(&checkpoint.id.to_string())?)?;
    }

    let title = if checkpoint.title.is_empty() {
        args.name.clone()
    } else {
        checkpoint.title.clone()
    };
    let created = CreatedCheckpoint {
        status: "success",
        checkpoint_id: checkpoint.id,
        title,
        journey_id: args.journey_id,
        goal_id: args.goal_id,
        snapshot_id: args.snapshot_id,
        position: args.position,
        session_updated: args.use_in_session,
    };

    match ctx.format {
        OutputFormat::Human | OutputFormat::Ai => {
            print_success(&format!(
                "Created checkpoint '{}' (ID {}) in journey {} at position {}",
                created.title, created.checkpoint_id, created.journey_id, created.position
            ));
            if created.session_updated {
                println!("   Session checkpoint set to {}", created.checkpoint_id);
            } else if ctx.format == OutputFormat::Ai {
                println!(
                    "Next step: api-cli session set-checkpoint {}",
                    created.checkpoint_id
                );
            }
            Ok(())
        }
        format => print_value(&created, format, String::new),
    }
}

pub async fn get_step(args: GetStepArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let step = client.get_step(args.step_id).await?;
    print_value(&step, ctx.format, || step_human(&step))
}

fn step_human(step: &TestStep) -> String {
    let mut text = format!(
        "🔎 Step {} ({}) at index {} in checkpoint {}\n",
        step.id, step.action, step.step_index, step.checkpoint_id
    );
    if !step.value.is_empty() {
        let _ = writeln!(text, "   Value: {}", step.value);
    }
    if !step.meta.is_empty() {
        let _ = writeln!(text, "   Meta: {}", serde_json::Value::Object(step.meta.clone()));
    }
    if !step.target.is_empty() {
        let _ = writeln!(text, "   Target: {}", serde_json::Value::Object(step.target.clone()));
    }
    let flags: Vec<&str> = [
        (step.optional, "optional"),
        (step.ignore_outcome, "ignore outcome"),
        (step.skip, "skipped"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if !flags.is_empty() {
        let _ = writeln!(text, "   Flags: {}", flags.join(", "));
    }
    text
}
