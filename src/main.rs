//! url-relay entry point.
//!
//! # Usage
//!
//! ```bash
//! # Shortener API
//! url-relay serve
//!
//! # Remote cache service
//! LISTEN=0.0.0.0:8081 url-relay cache
//!
//! # Analytics consumer
//! url-relay analytics
//! ```
//!
//! All settings come from the environment (see [`url_relay::config`]); a
//! `.env` file in the working directory is loaded first.

use anyhow::Result;
use clap::{Parser, Subcommand};
use url_relay::{config, server};

#[derive(Parser)]
#[command(name = "url-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the URL shortener API
    Serve,

    /// Run the remote cache service
    Cache,

    /// Consume URL events and record metrics
    Analytics,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    server::init_logging(&config);
    config.print_summary();

    match cli.command {
        Commands::Serve => server::serve(config).await,
        Commands::Cache => server::cache(config).await,
        Commands::Analytics => server::analytics(config).await,
    }
}
