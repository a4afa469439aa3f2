//! Bottleshop CLI - catalog and user management for operators.
//!
//! # Usage
//!
//! ```bash
//! # Insert the products (and initial stock) listed in a YAML file
//! bottleshop seed catalog.yaml
//!
//! # Check a seed file without touching the backend
//! bottleshop seed catalog.yaml --dry-run
//!
//! # Give a user access to the inventory screen
//! bottleshop admin grant --username sam
//!
//! # List profiles, newest first
//! bottleshop admin list
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Base URL of the hosted backend project
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service-role key (bypasses row-level security)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bottleshop")]
#[command(author, version, about = "Bottleshop operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert products from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,

        /// Validate the file and stop
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Set the admin flag on a profile
    Grant {
        /// Username on the profile
        #[arg(short, long)]
        username: String,
    },
    /// List profiles, newest first
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file, dry_run } => commands::seed::products(&file, dry_run).await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { username } => commands::admin::grant(&username).await?,
            AdminAction::List => commands::admin::list().await?,
        },
    }
    Ok(())
}
