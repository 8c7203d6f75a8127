//! Search Console data exporter CLI.

mod cmd;
mod export;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gsc_client::SearchConsoleClient;

#[derive(Parser)]
#[command(name = "gsc", version, about = "Export Search Console analytics to CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the properties available to the authenticated account
    Properties,
    /// Extract analytics rows and write CSV files
    Extract(cmd::extract::ExtractArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Keep the default quiet so log lines don't fight the progress bars.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let client = SearchConsoleClient::from_env().await.context(
        "failed to build an authenticated client; set GSC_ACCESS_TOKEN, or GSC_CLIENT_ID, \
         GSC_CLIENT_SECRET, and GSC_REFRESH_TOKEN",
    )?;

    match cli.command {
        Command::Properties => cmd::properties::run(&client).await,
        Command::Extract(args) => cmd::extract::run(&client, args).await,
    }
}
