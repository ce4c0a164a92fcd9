//! Crawl manager - level-synchronized breadth-first traversal
//!
//! The manager owns the frontier and the visited set. Each level it:
//! - drops already-visited and repeated URLs from the frontier
//! - marks the survivors visited
//! - fans them out to a bounded worker pool and waits for every one
//! - flattens the discovered links into the next frontier

use crate::crawler::context::{CrawlContext, StatsSnapshot};
use crate::crawler::frontier::{dedup_frontier, CrawlTask};
use crate::crawler::page::PageCrawler;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What happened during one level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelReport {
    /// Zero-based level; seeds are level 0
    pub level: u32,

    /// Tasks in the frontier before deduplication
    pub queued: usize,

    /// Tasks dropped as already visited or repeated
    pub filtered: usize,

    /// Tasks handed to the worker pool
    pub dispatched: usize,

    /// Child tasks returned by this level's pages
    pub discovered: usize,

    /// Workers that panicked
    pub failed_workers: usize,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// One entry per level, in order
    pub levels: Vec<LevelReport>,

    /// Aggregate counters at the end of the run
    pub stats: StatsSnapshot,
}

impl CrawlReport {
    /// Total tasks dispatched across all levels
    pub fn pages_dispatched(&self) -> usize {
        self.levels.iter().map(|l| l.dispatched).sum()
    }
}

/// Drives the breadth-first crawl
pub struct CrawlManager {
    ctx: Arc<CrawlContext>,
    visited: HashSet<String>,
}

impl CrawlManager {
    pub fn new(ctx: Arc<CrawlContext>) -> Self {
        Self {
            ctx,
            visited: HashSet::new(),
        }
    }

    /// Every URL dispatched so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Crawls `max_levels` levels starting from `seeds`
    ///
    /// The loop always runs `max_levels` times. Once the frontier is empty the
    /// remaining levels dispatch nothing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use wiki_harvest::crawler::{
    ///     CrawlContext, CrawlManager, CrawlSettings, CrawlTask, HttpFetcher,
    /// };
    /// use wiki_harvest::config::UserAgentConfig;
    /// use wiki_harvest::storage::SqliteStorage;
    ///
    /// # async fn example(agent: UserAgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    /// let settings = CrawlSettings::new("https://en.wikipedia.org".parse()?, "mw-content-text");
    /// let fetcher = Arc::new(HttpFetcher::new(&agent)?);
    /// let sink = Arc::new(SqliteStorage::new(std::path::Path::new("harvest.db"))?);
    /// let mut manager = CrawlManager::new(Arc::new(CrawlContext::new(settings, fetcher, sink)));
    ///
    /// let seeds = vec![CrawlTask::new("https://en.wikipedia.org/wiki/History", "hist")];
    /// let report = manager.run(seeds, 2).await;
    /// println!("{} paragraphs", report.stats.paragraphs);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&mut self, seeds: Vec<CrawlTask>, max_levels: u32) -> CrawlReport {
        let mut frontier = seeds;
        let mut levels = Vec::new();

        for level in 0..max_levels {
            tracing::info!("Starting level {}...", level);

            let queued = frontier.len();
            let batch = dedup_frontier(std::mem::take(&mut frontier), &self.visited);
            let filtered = queued - batch.len();

            tracing::info!(
                "{} URLs filtered for having already been crawled or being repeated",
                filtered
            );
            tracing::info!("{} URLs to be crawled", batch.len());

            // Marked before dispatch so nothing in this level can be queued again
            self.visited.extend(batch.iter().map(|task| task.url.clone()));

            let dispatched = batch.len();
            let (children, failed_workers) = self.dispatch_level(batch).await;

            let report = LevelReport {
                level,
                queued,
                filtered,
                dispatched,
                discovered: children.len(),
                failed_workers,
            };
            tracing::info!(
                "Level {} finished: {} pages dispatched, {} links discovered, {} workers failed",
                level,
                report.dispatched,
                report.discovered,
                report.failed_workers
            );

            levels.push(report);
            frontier = children;
        }

        let stats = self.ctx.stats().snapshot();
        tracing::info!("Total pages crawled: {}", stats.pages_crawled);
        tracing::info!("Total paragraphs collected: {}", stats.paragraphs);
        if stats.pages_failed > 0 || stats.paragraphs_rejected > 0 {
            tracing::warn!(
                "{} pages failed, {} paragraphs could not be stored",
                stats.pages_failed,
                stats.paragraphs_rejected
            );
        }

        CrawlReport { levels, stats }
    }

    /// Runs one level on the worker pool and waits for all of it
    ///
    /// Returns the flattened child tasks, in dispatch order, and the number of
    /// workers that panicked. Those count as having found no links.
    async fn dispatch_level(&self, batch: Vec<CrawlTask>) -> (Vec<CrawlTask>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.ctx.settings().concurrency));

        let mut slots: Vec<Vec<CrawlTask>> = (0..batch.len()).map(|_| Vec::new()).collect();
        let mut workers = JoinSet::new();

        for (index, task) in batch.into_iter().enumerate() {
            let crawler = PageCrawler::new(Arc::clone(&self.ctx));
            let semaphore = Arc::clone(&semaphore);

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, None);
                };

                (index, Some(crawler.crawl(&task).await))
            });
        }

        let mut failed_workers = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Some(children))) => slots[index] = children,
                Ok((_, None)) => {
                    failed_workers += 1;
                    self.ctx.stats().record_failure();
                }
                Err(e) => {
                    tracing::error!("Crawl worker failed: {}", e);
                    failed_workers += 1;
                    self.ctx.stats().record_failure();
                }
            }
        }

        (slots.into_iter().flatten().collect(), failed_workers)
    }
}
