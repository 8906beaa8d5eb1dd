//! Food Admin CLI - database migrations, catalog seeding and admin roles.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! fa-cli migrate
//!
//! # Seed the menu from a YAML file, replacing existing items
//! fa-cli seed catalog --file seed/items.yaml --clear
//!
//! # Manage admins (users must have synced from the app first)
//! fa-cli admin grant --user user_2abc
//! fa-cli admin revoke --user user_2abc
//! fa-cli admin list
//! ```
//!
//! The database URL is read from `FOOD_DATABASE_URL` (or `DATABASE_URL`),
//! with `.env` support.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fa-cli")]
#[command(author, version, about = "Food Admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage admin roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog items from a YAML file
    Catalog {
        /// Path to the YAML catalog
        #[arg(short, long)]
        file: String,

        /// Delete existing items first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a user the admin role
    Grant {
        /// Identity provider user id
        #[arg(short, long)]
        user: String,
    },
    /// Return an admin to the customer role
    Revoke {
        /// Identity provider user id
        #[arg(short, long)]
        user: String,
    },
    /// List admins
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fa_cli=info,food_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, clear } => commands::seed::catalog(&file, clear).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Grant { user } => commands::admin::grant(&user).await?,
            AdminAction::Revoke { user } => commands::admin::revoke(&user).await?,
            AdminAction::List => commands::admin::list().await?,
        },
    }
    Ok(())
}
