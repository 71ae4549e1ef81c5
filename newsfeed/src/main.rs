/*
newsfeed - command-line front end for the sensor news cache.
Runs one operation (refresh or a query) and prints the result to stdout.
*/

use anyhow::Context;
use clap::{Parser, ValueEnum};
use common::Config;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

use newsfeed::format::{self, OutputMode};
use newsfeed::{query, FeedManager};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    /// Structured JSON envelope
    Json,
    /// Raw data for prompt injection
    Text,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Json => OutputMode::Structured,
            OutputArg::Text => OutputMode::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "newsfeed", about = "News Feed Manager")]
struct Args {
    /// Sensor entity ids to fetch news from (defaults to the configured list)
    #[arg(long, num_args = 1.., value_name = "NAME")]
    sensors: Option<Vec<String>>,

    /// Output JSON file path (defaults to the configured store path)
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Operation to perform: update_news, list_titles, get_article_details or get_file_contents
    #[arg(long)]
    operation: String,

    /// Article title for get_article_details
    #[arg(long)]
    title: Option<String>,

    /// Output format: json (structured) or text (raw data)
    #[arg(long, value_enum, default_value_t = OutputArg::Json)]
    output: OutputArg,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the result.
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut config = Config::resolve(args.config.as_deref()).await.map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;
    if let Some(sensors) = args.sensors {
        config.source.sensors = sensors;
    }
    if let Some(path) = args.output_file {
        config.store.path = path.to_string_lossy().into_owned();
    }
    debug!(sensors = ?config.source.sensors, store = %config.store.path, "configuration resolved");

    let token = common::feed_token_from_env(&config.credentials).map_err(|e| {
        error!(error = %e, "missing credential");
        e
    })?;

    let manager = FeedManager::from_config(&config, token).context("failed to initialise feed manager")?;

    let result = query::execute(&manager, &args.operation, args.title.as_deref()).await;
    println!("{}", format::render(&result, args.output.into()));

    Ok(())
}
