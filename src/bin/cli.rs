//! Notice Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use notice_crawler::{
    error::Result,
    models::{Config, ExtractedPost},
    pipeline,
    services::{HttpFetcher, PageFetcher},
};

/// Forum notice extractor and notice index publisher
#[derive(Parser, Debug)]
#[command(
    name = "notice-crawler",
    version,
    about = "Extracts forum notices and publishes the notice index"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "crawler.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Skip forum sources; index authored notices only
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index authored notices and sync the publish target (no network)
    Index,

    /// Crawl forum sources only
    Crawl {
        /// Write extracted posts as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Notice crawler starting...");

    // `validate` must fail on a broken file instead of falling back
    let config = if matches!(cli.command, Some(Command::Validate)) {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    log::info!("Loaded configuration from {}", cli.config.display());
    let config = Arc::new(config);

    match cli.command {
        None => {
            let fetcher = if cli.offline {
                None
            } else {
                Some(http_fetcher(&config)?)
            };
            let report = pipeline::run_pipeline(Arc::clone(&config), fetcher).await?;
            log::info!(
                "Index has {} entries ({} authored)",
                report.index.len(),
                report.documents
            );
        }

        Some(Command::Index) => {
            let report = pipeline::run_pipeline(Arc::clone(&config), None).await?;
            log::info!("Index has {} entries", report.index.len());
        }

        Some(Command::Crawl { output }) => {
            let fetcher = http_fetcher(&config)?;
            let outcome = pipeline::run_crawler(Arc::clone(&config), fetcher).await?;

            if let Some(path) = output {
                let posts: Vec<ExtractedPost<'_>> = outcome.extracted().collect();
                let json = serde_json::to_string_pretty(&posts)?;
                std::fs::write(&path, json)?;
                log::info!("{} posts written to {}", posts.len(), path.display());
            }
        }

        Some(Command::Validate) => {
            pipeline::run_validate(&config)?;
        }
    }

    log::info!("Done!");

    Ok(())
}

fn http_fetcher(config: &Config) -> Result<Arc<dyn PageFetcher>> {
    Ok(Arc::new(HttpFetcher::new(&config.crawler)?))
}
