/*
news-context - prints the news block the assistant splices into its prompt.
Both secrets must be present, as for the assistant process itself.
*/

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use common::{Config, Credentials};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newsfeed::{prompt, FeedManager};

#[derive(Parser, Debug)]
#[command(name = "news-context", about = "Print the dated news context block used in assistant prompts")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Refresh the news file from the sensors before printing
    #[arg(long)]
    refresh: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = Config::resolve(args.config.as_deref()).await?;

    let credentials = Credentials::from_env(&config.credentials).map_err(|e| {
        error!(error = %e, "missing credential");
        e
    })?;

    let manager = FeedManager::from_config(&config, credentials.feed_token)
        .context("failed to initialise feed manager")?;

    if args.refresh {
        if manager.refresh().await {
            info!("news refreshed before building context");
        } else {
            warn!("refresh failed, using cached news");
        }
    }

    println!("{}", prompt::news_context(&manager, Local::now().naive_local()).await);
    Ok(())
}
