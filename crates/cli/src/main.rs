//! Grocery Mart CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gm-cli migrate
//!
//! # Replace the catalog with the seed products
//! gm-cli seed --file crates/cli/seed/products.yaml
//!
//! # Create an admin user
//! gm-cli admin create -e admin@grocerymart.com -n "Admin User"
//!
//! # Count products
//! gm-cli products count
//! ```
//!
//! # Environment Variables
//!
//! - `GROCERY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Grocery Mart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load products from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,

        /// Add to the existing catalog instead of replacing it
        #[arg(long)]
        keep_existing: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin user (no-op if the email is taken)
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long, default_value = "Admin User")]
        name: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Print the number of products
    Count,
}

#[tokio::main]
async fn main() {
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
        Commands::Seed {
            file,
            keep_existing,
        } => commands::seed::run(&file, keep_existing).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name } => {
                commands::admin::create(&email, &name).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductsAction::Count => commands::products::count().await?,
        },
    }
    Ok(())
}
