//! Crawler module: the level-by-level harvest
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetch`] seam
//! - Single-page harvesting (fetch, extract, persist, discover)
//! - Frontier deduplication against the visited set
//! - The level barrier driving a bounded worker pool

mod context;
mod fetcher;
mod frontier;
mod manager;
mod page;

#[cfg(test)]
mod testing;

pub use context::{CrawlContext, CrawlSettings, CrawlStats, StatsSnapshot};
pub use fetcher::{build_http_client, fetch_url, Fetch, FetchResult, HttpFetcher};
pub use frontier::{dedup_frontier, CrawlTask};
pub use manager::{CrawlManager, CrawlReport, LevelReport};
pub use page::{PageCrawler, PageError};

use crate::config::Config;
use crate::storage::{ParagraphSink, SqliteStorage, Storage};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the paragraph database and record a new run
/// 2. Build the HTTP client from the user-agent settings
/// 3. Crawl `max-levels` levels from the configured seeds
/// 4. Mark the run completed with its final counters
///
/// Only setup errors are returned. Individual pages that fail are logged and
/// counted in the report.
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `config_hash` - Hash of the config file, stored on the run record
pub async fn crawl(config: Config, config_hash: &str) -> Result<CrawlReport, HarvestError> {
    let storage = Arc::new(SqliteStorage::new(Path::new(&config.output.database_path))?);
    let run_id = storage.create_run(config_hash, config.crawler.max_levels)?;
    tracing::info!(
        "Started run {} writing to {}",
        run_id,
        storage.path().display()
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent)?);
    let settings = CrawlSettings::from_config(&config)?;
    let sink: Arc<dyn ParagraphSink> = storage.clone();
    let ctx = Arc::new(CrawlContext::new(settings, fetcher, sink));

    let seeds = config
        .seeds
        .iter()
        .map(|seed| CrawlTask::new(seed.url.clone(), seed.tag.clone()))
        .collect();

    let mut manager = CrawlManager::new(ctx);
    let report = manager.run(seeds, config.crawler.max_levels).await;

    storage.complete_run(run_id, report.stats.pages_crawled, report.stats.paragraphs)?;
    tracing::info!("Run {} completed", run_id);

    Ok(report)
}
