//! Shared step creation flow

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use virtuoso_common::{Config, SessionContext, SessionStore, StepAction, StepOutput};

use crate::client::VirtuosoClient;
use crate::commands::Context;
use crate::output::{print_warning, render_step};

/// Placement flags shared by every step command
#[derive(Args, Debug, Clone, Default)]
pub struct StepTarget {
    /// Position in the checkpoint (defaults to the session's next position)
    pub position: Option<String>,

    /// Checkpoint ID (defaults to the session checkpoint)
    #[arg(long, short = 'c')]
    pub checkpoint: Option<String>,
}

/// A single selector argument
#[derive(Args, Debug, Clone)]
pub struct SelectorArgs {
    /// Element selector or visible text
    pub selector: String,

    #[command(flatten)]
    pub target: StepTarget,
}

/// A selector plus one value
#[derive(Args, Debug, Clone)]
pub struct SelectorValueArgs {
    /// Element selector or visible text
    pub selector: String,

    /// Value to use
    pub value: String,

    #[command(flatten)]
    pub target: StepTarget,
}

/// Steps that take no positional arguments
#[derive(Args, Debug, Clone)]
pub struct NoArgs {
    #[command(flatten)]
    pub target: StepTarget,
}

/// Validate, place and create a step, then advance the session position.
///
/// Validation and placement failures happen before any request is sent.
/// A session that cannot be saved afterwards only produces a warning, since
/// the step already exists.
pub async fn create<S: SessionStore>(
    config: &Config,
    session: &mut SessionContext<S>,
    action: &StepAction,
    target: &StepTarget,
) -> Result<StepOutput> {
    action.validate()?;

    let mut args = action.args();
    let position_index = args.len();
    if let Some(position) = &target.position {
        args.push(position.clone());
    }
    let placement = session.resolve(&args, target.checkpoint.as_deref(), position_index)?;

    config.validate()?;
    let client = VirtuosoClient::new(config)?;
    let step_id = client
        .create_step(&placement.checkpoint_id, placement.position, &action.parsed_step())
        .await?;
    info!(
        step_type = action.step_type(),
        step_id,
        checkpoint = %placement.checkpoint_id,
        position = placement.position,
        "step created"
    );

    if let Err(e) = session.persist(&placement) {
        warn!(error = %e, "could not advance session position");
        print_warning(&format!("Step created, but {}", e));
    }

    Ok(StepOutput {
        status: "success".to_string(),
        step_type: action.step_type().to_string(),
        checkpoint_id: placement.checkpoint_id,
        step_id,
        position: placement.position,
        parsed_step: action.describe(),
        using_context: placement.used_session_context,
        auto_position: placement.auto_positioned,
        extra: action.extra(),
    })
}

/// Create a step against the on-disk session and print the result
pub async fn run(ctx: &Context, action: StepAction, target: &StepTarget) -> Result<()> {
    let mut session = ctx.load_session()?;
    let output = create(&ctx.config, &mut session, &action, target).await?;

    let text = render_step(&output, ctx.format)?;
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    Ok(())
}
