use clap::{Parser, Subcommand};

mod commands;
mod config;

mod errors;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::init_cmd::{self, InitArgs};
use crate::commands::sync_cmd::{self, SyncArgs};

/// BranchWarden CLI: Push branch restriction rules to Bitbucket Cloud
#[derive(Parser)]
#[command(name = "branch-warden")]
#[command(about = "Push branch restriction rules to Bitbucket Cloud repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the configured branch restrictions to the remote repository
    #[command()]
    Sync(SyncArgs),

    /// Write a starter configuration file
    Init(InitArgs),

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("BRANCH_WARDEN_LOG"))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Sync(args) => match sync_cmd::execute(args).await {
            Ok(report) => {
                if report.is_success() {
                    println!("Branch restrictions applied");
                    std::process::exit(0);
                } else {
                    error!(
                        failed = report.failed(),
                        "One or more branch restrictions could not be applied"
                    );
                    std::process::exit(1);
                }
            }
            Err(e) => {
                println!("Error: {e}");
                std::process::exit(2);
            }
        },
        Commands::Init(args) => {
            if let Err(e) = init_cmd::execute(args) {
                println!("Error: {e}");
                std::process::exit(2);
            }
        }
        Commands::Version => {
            // Print version info from baked-in value
            println!(
                "branch-warden version {}",
                option_env!("BRANCH_WARDEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            std::process::exit(0);
        }
    }
}
