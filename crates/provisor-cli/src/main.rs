mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    broker::BrokerSubcommand, flag::FlagSubcommand, instance::InstanceSubcommand,
    key::KeySubcommand, ops::OpsSubcommand,
};
use provisor_core::flags::RequestPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "provisor",
    about = "Service-broker resource lifecycle manager — provision instances and keys through brokers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .provisor/)
    #[arg(long, global = true, env = "PROVISOR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Actor recorded in audit events (default: from config)
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Bypass admin-skippable feature flags
    #[arg(long, global = true)]
    admin: bool,

    /// Bypass flags open to read-only admins
    #[arg(long, global = true)]
    admin_read_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and default config
    Init,

    /// Manage brokers
    Broker {
        #[command(subcommand)]
        subcommand: BrokerSubcommand,
    },

    /// Manage service instances
    Instance {
        #[command(subcommand)]
        subcommand: InstanceSubcommand,
    },

    /// Manage service keys
    Key {
        #[command(subcommand)]
        subcommand: KeySubcommand,
    },

    /// Manage feature flags
    Flag {
        #[command(subcommand)]
        subcommand: FlagSubcommand,
    },

    /// Inspect operation state
    Ops {
        #[command(subcommand)]
        subcommand: OpsSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let ctx = cmd::Ctx {
        json: cli.json,
        actor: cli.actor,
        policy: RequestPolicy {
            admin_override: cli.admin,
            admin_read_only: cli.admin_read_only,
        },
    };

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Broker { subcommand } => cmd::broker::run(&root, subcommand, &ctx),
        Commands::Instance { subcommand } => cmd::instance::run(&root, subcommand, &ctx),
        Commands::Key { subcommand } => cmd::key::run(&root, subcommand, &ctx),
        Commands::Flag { subcommand } => cmd::flag::run(&root, subcommand, &ctx),
        Commands::Ops { subcommand } => cmd::ops::run(&root, subcommand, &ctx),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
