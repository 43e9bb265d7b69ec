//! Culinary CLI - database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! culinary-cli migrate
//!
//! # Replace all data with the bundled sample dataset
//! culinary-cli seed
//!
//! # Load a custom dataset on top of the existing data
//! culinary-cli seed --file data/extra.yaml --keep
//!
//! # Delete every user, recipe and ingredient
//! culinary-cli reset
//! ```
//!
//! All commands read `CULINARY_DATABASE_URL` (or `DATABASE_URL`) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "culinary-cli")]
#[command(author, version, about = "Recipes API maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load a dataset of users, recipes and ingredients
    Seed {
        /// YAML dataset to load instead of the bundled sample
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Keep existing data instead of clearing it first
        #[arg(short, long)]
        keep: bool,
    },
    /// Delete all users along with their recipes and ingredients
    Reset,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, keep } => commands::seed::run(file.as_deref(), keep).await?,
        Commands::Reset => commands::seed::reset().await?,
    }
    Ok(())
}
