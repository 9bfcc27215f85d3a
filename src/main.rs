//! # Feed Digest
//!
//! Collects many RSS/Atom feeds grouped by topic, normalizes their entries,
//! removes duplicates, scrapes article pages to recover missing images and
//! body text, and writes one JSON snapshot grouped by category.
//!
//! ## Usage
//!
//! ```sh
//! feed_digest -c feeds.yaml -o news.json
//! ```
//!
//! ## Pipeline
//!
//! For each category, in config order:
//! 1. **Fetch**: request every feed at once; failed feeds contribute nothing
//! 2. **Extract**: parse RSS/Atom and map entries to items (a few per feed)
//! 3. **Dedupe**: merge by link, keep the newest, sort newest-first, cap
//! 4. **Enrich**: scrape article pages in small batches for image and body
//! 5. **Fallback**: placeholder image, description as body
//!
//! The snapshot is written once at the end; only config or output failures
//! abort the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod dedup;
mod fallback;
mod feeds;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::Config;
use fetch::HttpFetcher;
use outputs::json;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_digest starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, "Parsed CLI arguments");

    let config = Config::load(&args.config).await?;
    let fetcher = HttpFetcher::new(&config)?;

    let result = aggregator::aggregate(&config, &fetcher).await;
    let total_items: usize = result.categories.iter().map(|c| c.items.len()).sum();
    info!(
        categories = result.categories.len(),
        items = total_items,
        "Aggregation complete"
    );

    json::write_snapshot(&result, &args.output).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
