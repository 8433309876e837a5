// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kymata")]
#[command(about = "Wave-ordered GitOps sync orchestration for logging stacks")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage GitOps operator installation
    Operators {
        #[command(subcommand)]
        command: OperatorsCommand,
    },

    /// Provision cloud resources backing the stack
    Bootstrap {
        #[command(subcommand)]
        command: BootstrapCommand,
    },

    /// Manage declarative application registration
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },

    /// Trigger and gate synchronization runs
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
}

#[derive(Subcommand)]
pub enum OperatorsCommand {
    /// Register and converge the operator-installation units (wave 0)
    Setup {
        #[command(flatten)]
        timing: TimingArgs,
    },
}

#[derive(Subcommand)]
pub enum BootstrapCommand {
    /// Run the provisioning script for an environment
    Resources {
        /// Target environment (defined in config)
        environment: String,

        /// Cloud region to provision into
        #[arg(long)]
        region: String,
    },
}

#[derive(Subcommand)]
pub enum ApplicationsCommand {
    /// Register the declarative units for an environment
    Register {
        /// Target environment (defined in config)
        environment: String,
    },
}

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Synchronize an environment's registered units in wave order
    Trigger {
        /// Target environment (defined in config)
        environment: String,

        /// Suppress trigger side effects; probes still run
        #[arg(long)]
        dry_run: bool,

        /// Break a live run lock
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        timing: TimingArgs,
    },
}

#[derive(Args)]
pub struct TimingArgs {
    /// Per-unit timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Poll interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,
}
