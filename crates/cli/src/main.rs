//! api-cli - Main Entry Point
//!
//! Builds Virtuoso test checkpoints one step at a time from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};

use virtuoso_cli::commands::{
    self, assert, checkpoint, data, dialog, file, interact, library, misc, mouse, navigate, select, session,
    validate, wait, window, Context,
};
use virtuoso_cli::output::{self, OutputFormat};
use virtuoso_common::Config;

/// api-cli - Virtuoso test step authoring
#[derive(Parser)]
#[command(name = "api-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to virtuoso-config.yaml
    #[arg(long, env = "VIRTUOSO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Session file (defaults to ~/.api-cli/session.json)
    #[arg(long, env = "VIRTUOSO_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    /// Output format (defaults to output.default_format from config)
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assertion steps
    #[command(subcommand)]
    Assert(assert::AssertCommands),

    /// Click, type and key press steps
    #[command(subcommand)]
    Interact(interact::InteractCommands),

    /// Navigation and scrolling steps
    #[command(subcommand)]
    Navigate(navigate::NavigateCommands),

    /// Wait steps
    #[command(subcommand)]
    Wait(wait::WaitCommands),

    /// Variable and cookie steps
    #[command(subcommand)]
    Data(data::DataCommands),

    /// Browser dialog steps
    #[command(subcommand)]
    Dialog(dialog::DialogCommands),

    /// Frame, tab and window steps
    #[command(subcommand)]
    Window(window::WindowCommands),

    /// Low-level mouse steps
    #[command(subcommand)]
    Mouse(mouse::MouseCommands),

    /// Dropdown selection steps
    #[command(subcommand)]
    Select(select::SelectCommands),

    /// File upload steps
    #[command(subcommand)]
    File(file::FileCommands),

    /// Comment and script steps
    #[command(subcommand)]
    Misc(misc::MiscCommands),

    /// List the checkpoints of a journey
    ListCheckpoints(checkpoint::ListCheckpointsArgs),

    /// Create a checkpoint and attach it to a journey
    CreateCheckpoint(checkpoint::CreateCheckpointArgs),

    /// Show a single test step
    GetStep(checkpoint::GetStepArgs),

    /// Manage library checkpoints
    #[command(subcommand)]
    Library(library::LibraryCommands),

    /// Manage the session context
    #[command(subcommand)]
    Session(session::SessionCommands),

    /// Check configuration and API connectivity
    ValidateConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout stays reserved for command output
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("Error: {:#}", e));
        std::process::exit(commands::exit_code_for(&e));
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        println!("api-cli v{}", virtuoso_common::VERSION);
        return Ok(());
    }

    let config = Config::discover(cli.config.as_deref())?;
    let format = match cli.output {
        Some(format) => format,
        None => config.output.default_format.parse().unwrap_or_else(|_| {
            warn!(
                format = %config.output.default_format,
                "unknown output.default_format, using human"
            );
            OutputFormat::Human
        }),
    };
    let session_path = cli
        .session_file
        .clone()
        .unwrap_or_else(|| config.session_path());
    debug!(session = %session_path.display(), ?format, "starting");

    let ctx = Context::new(config, format, session_path);

    match cli.command {
        Commands::Assert(cmd) => assert::execute(cmd, &ctx).await,
        Commands::Interact(cmd) => interact::execute(cmd, &ctx).await,
        Commands::Navigate(cmd) => navigate::execute(cmd, &ctx).await,
        Commands::Wait(cmd) => wait::execute(cmd, &ctx).await,
        Commands::Data(cmd) => data::execute(cmd, &ctx).await,
        Commands::Dialog(cmd) => dialog::execute(cmd, &ctx).await,
        Commands::Window(cmd) => window::execute(cmd, &ctx).await,
        Commands::Mouse(cmd) => mouse::execute(cmd, &ctx).await,
        Commands::Select(cmd) => select::execute(cmd, &ctx).await,
        Commands::File(cmd) => file::execute(cmd, &ctx).await,
        Commands::Misc(cmd) => misc::execute(cmd, &ctx).await,
        Commands::ListCheckpoints(args) => checkpoint::list(args, &ctx).await,
        Commands::CreateCheckpoint(args) => checkpoint::create(args, &ctx).await,
        Commands::GetStep(args) => checkpoint::get_step(args, &ctx).await,
        Commands::Library(cmd) => library::execute(cmd, &ctx).await,
        Commands::Session(cmd) => session::execute(cmd, &ctx).await,
        Commands::ValidateConfig => validate::execute(&ctx).await,
        Commands::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trailing_position_and_checkpoint() {
        let cli = Cli::parse_from([
            "api-cli",
            "assert",
            "exists",
            "Login",
            "4",
            "--checkpoint",
            "1678318",
            "-o",
            "json",
        ]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Assert(assert::AssertCommands::Exists(args)) => {
                assert_eq!(args.selector, "Login");
                assert_eq!(args.target.position.as_deref(), Some("4"));
                assert_eq!(args.target.checkpoint.as_deref(), Some("1678318"));
            }
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn test_negative_mouse_offsets() {
        let cli = Cli::parse_from(["api-cli", "mouse", "move-by", "-10", "25"]);
        match cli.command {
            Commands::Mouse(mouse::MouseCommands::MoveBy { dx, dy, target }) => {
                assert_eq!((dx, dy), (-10, 25));
                assert!(target.position.is_none());
            }
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn test_nested_groups() {
        let cli = Cli::parse_from([
            "api-cli", "window", "switch", "tab", "index", "2",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Window(window::WindowCommands::Switch(
                window::SwitchCommands::Tab(window::TabCommands::Index { index: 2, .. })
            ))
        ));

        let cli = Cli::parse_from([
            "api-cli",
            "create-checkpoint",
            "608038",
            "13776",
            "43802",
            "Checkout Test",
            "--position",
            "3",
        ]);
        match cli.command {
            Commands::CreateCheckpoint(args) => {
                assert_eq!(args.journey_id, 608038);
                assert_eq!(args.name, "Checkout Test");
                assert_eq!(args.position, 3);
                assert!(!args.use_in_session);
            }
            _ => panic!("parsed the wrong command"),
        }

        let cli = Cli::parse_from(["api-cli", "data", "store", "literal", "42", "answer"]);
        assert!(matches!(
            cli.command,
            Commands::Data(data::DataCommands::Store(data::StoreCommands::Literal { .. }))
        ));
    }
}
