//! Command-line interface for trolley.
//!
//! Results go to stdout; logs and progress go to stderr so the output stays
//! pipeable.

mod commands;
mod observer;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::cache::CacheCommand;
use commands::search::SearchArgs;

/// Grocery product search with cached nutrition lookups.
#[derive(Parser, Debug)]
#[command(name = "trolley")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the storefront for products
    Search(SearchArgs),

    /// Inspect or maintain the nutrition cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = trolley_core::AppConfig::load()?;
    tracing::debug!(cache = %config.cache_path.display(), "configuration loaded");

    match cli.command {
        Commands::Search(args) => commands::search::run(args, config).await,
        Commands::Cache(command) => commands::cache::run(command, config),
    }
}
