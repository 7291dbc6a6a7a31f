use anyhow::Result;
use clap::{Parser, Subcommand};
use navfeed::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for navfeed::AppCommand {
    fn from(cmd: Commands) -> navfeed::AppCommand {
        match cmd {
            Commands::Serve => navfeed::AppCommand::Serve,
            Commands::Refresh => navfeed::AppCommand::Refresh,
            Commands::Prefixes => navfeed::AppCommand::Prefixes,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve cached NAV data and refresh it daily (default)
    Serve,
    /// Run the NAV pipeline once and wait for enrichment
    Refresh,
    /// List unique AMC prefixes from the live NAV feed
    Prefixes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Setup => navfeed::cli::setup::setup(),
        cmd => navfeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
