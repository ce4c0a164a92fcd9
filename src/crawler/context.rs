//! Shared state handed to every page crawl
//!
//! One `CrawlContext` lives for the whole run. It carries the immutable crawl
//! settings, the fetch and storage collaborators, and the aggregate counters
//! every worker updates.

use crate::config::{Config, DEFAULT_CONCURRENCY, DEFAULT_PAGE_TIMEOUT_SECS};
use crate::crawler::fetcher::Fetch;
use crate::storage::ParagraphSink;
use crate::HarvestError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Settings the crawl core needs, resolved from configuration
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Base URL relative article links are resolved against
    pub base_domain: Url,

    /// `id` of the main-content container
    pub content_region_id: String,

    /// Worker pool size
    pub concurrency: usize,

    /// Upper bound on fetching one page
    pub page_timeout: Duration,
}

impl CrawlSettings {
    /// Creates settings with the default pool size and page timeout
    pub fn new(base_domain: Url, content_region_id: impl Into<String>) -> Self {
        Self {
            base_domain,
            content_region_id: content_region_id.into(),
            concurrency: DEFAULT_CONCURRENCY as usize,
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
        }
    }

    /// Resolves settings from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let base_domain = Url::parse(&config.site.base_domain)?;

        Ok(Self {
            base_domain,
            content_region_id: config.site.content_region_id.clone(),
            concurrency: config.crawler.concurrency as usize,
            page_timeout: Duration::from_secs(config.crawler.page_timeout_secs),
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_page_timeout(mut self, page_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self
    }
}

/// Aggregate counters updated concurrently by crawl workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_crawled: AtomicU64,
    paragraphs: AtomicU64,
    pages_failed: AtomicU64,
    paragraphs_rejected: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pages fetched, extracted and persisted
    pub pages_crawled: u64,

    /// Paragraphs that passed the prose filter on crawled pages
    pub paragraphs: u64,

    /// Pages that failed to fetch, had no content region, timed out or crashed
    pub pages_failed: u64,

    /// Paragraphs the sink refused to store
    pub paragraphs_rejected: u64,
}

impl CrawlStats {
    /// Records one completed page and the paragraphs it kept
    pub fn record_page(&self, paragraphs: u64) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
        self.paragraphs.fetch_add(paragraphs, Ordering::Relaxed);
    }

    /// Records a page that produced nothing
    pub fn record_failure(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a paragraph the sink refused
    pub fn record_rejected(&self) {
        self.paragraphs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            paragraphs: self.paragraphs.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            paragraphs_rejected: self.paragraphs_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Everything a page crawl needs, shared by reference across workers
pub struct CrawlContext {
    settings: CrawlSettings,
    fetcher: Arc<dyn Fetch>,
    sink: Arc<dyn ParagraphSink>,
    stats: CrawlStats,
}

impl CrawlContext {
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn Fetch>,
        sink: Arc<dyn ParagraphSink>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            sink,
            stats: CrawlStats::default(),
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &dyn Fetch {
        self.fetcher.as_ref()
    }

    /// Returns an owned handle so appends can move onto the blocking pool
    pub fn sink(&self) -> Arc<dyn ParagraphSink> {
        Arc::clone(&self.sink)
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate_across_threads() {
        let stats = Arc::new(CrawlStats::default());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_page(3);
                    }
                    stats.record_failure();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_crawled, 10_000);
        assert_eq!(snapshot.paragraphs, 30_000);
        assert_eq!(snapshot.pages_failed, 10);
        assert_eq!(snapshot.paragraphs_rejected, 0);
    }

    #[test]
    fn test_settings_builders() {
        let base = Url::parse("https://en.wikipedia.org").unwrap();
        let settings = CrawlSettings::new(base, "mw-content-text")
            .with_concurrency(0)
            .with_page_timeout(Duration::from_millis(250));

        assert_eq!(settings.concurrency, 1);
        assert_eq!(settings.page_timeout, Duration::from_millis(250));
        assert_eq!(settings.content_region_id, "mw-content-text");
    }
}
