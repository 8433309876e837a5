// ABOUTME: Entry point for the kymata CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use std::time::Duration;

use clap::Parser;
use cli::{ApplicationsCommand, BootstrapCommand, Cli, Commands, OperatorsCommand, SyncCommand};
use kymata::commands::{self, SetupOptions, SyncOptions};
use kymata::error::Result;
use kymata::output::Output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let output = Output::from_flags(cli.quiet, cli.json);

    let result = run(cli).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::from_flags(cli.quiet, cli.json);

    match cli.command {
        Commands::Operators { command } => match command {
            OperatorsCommand::Setup { timing } => {
                let options = SetupOptions {
                    timeout: timing.timeout.map(Duration::from_secs),
                    poll_interval: timing.poll_interval.map(Duration::from_secs),
                };
                commands::setup(options, output).await
            }
        },
        Commands::Bootstrap { command } => match command {
            BootstrapCommand::Resources {
                environment,
                region,
            } => commands::resources(&environment, &region, output).await,
        },
        Commands::Applications { command } => match command {
            ApplicationsCommand::Register { environment } => {
                commands::register(&environment, output).await
            }
        },
        Commands::Sync { command } => match command {
            SyncCommand::Trigger {
                environment,
                dry_run,
                force,
                timing,
            } => {
                let options = SyncOptions {
                    dry_run,
                    timeout: timing.timeout.map(Duration::from_secs),
                    poll_interval: timing.poll_interval.map(Duration::from_secs),
                    force,
                };
                commands::trigger(&environment, options, output).await
            }
        },
    }
}
