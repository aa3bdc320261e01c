//! Catalog scraper CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use catalog_scraper::{
    error::Result,
    models::Config,
    pipeline::{self, ScrapeOptions},
    storage::LocalStorage,
    utils::http,
};
use clap::{Parser, Subcommand};

/// Catalog product-page scraper
#[derive(Parser, Debug)]
#[command(
    name = "catalog-scraper",
    version,
    about = "Scrapes catalog product pages into a CSV export"
)]
struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every identifier in the input file
    Scrape {
        /// Identifier file (default: paths.ids_file from config)
        #[arg(long)]
        ids: Option<PathBuf>,

        /// Skip the remote catalog lookup
        #[arg(long)]
        skip_known: bool,
    },

    /// Report how many identifiers the remote catalog already holds
    Known,

    /// Validate configuration and compile page selectors
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let loaded = Config::load(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Config::default()
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    match cli.command {
        Command::Scrape { ids, skip_known } => {
            let storage = Arc::new(LocalStorage::new(&config.paths));
            let options = ScrapeOptions {
                ids_file: ids,
                skip_known,
            };

            match pipeline::run_scrape(&config, storage, &options).await {
                Ok(summary) => {
                    log::info!("Export written to {}", summary.export_location);
                    if let Some(location) = summary.suits_location {
                        log::info!("Suit index written to {}", location);
                    }
                }
                Err(e) => {
                    log::error!("Scrape failed: {}", e);
                    return Err(e);
                }
            }
        }

        Command::Known => {
            let client = http::create_async_client(&config.crawler)?;
            match pipeline::fetch_known_ids(&config, &client).await {
                Ok(known) => log::info!("Remote catalog holds {} identifiers", known.len()),
                Err(e) => {
                    log::error!("Catalog lookup failed: {}", e);
                    return Err(e);
                }
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK (includes page selectors and policy)");
        }
    }

    log::info!("Done!");

    Ok(())
}
