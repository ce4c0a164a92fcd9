//! Crawl tasks and frontier deduplication

use std::collections::HashSet;

/// One page to crawl and the topic label its content is filed under
///
/// Only the URL identifies a task. The tag rides along and is inherited by
/// every link discovered on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub url: String,
    pub tag: String,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tag: tag.into(),
        }
    }

    /// Creates the task for a link found on this task's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self::new(url, self.tag.clone())
    }
}

/// Reduces a frontier to the tasks that still need crawling
///
/// Tasks whose URL is in `visited` are dropped, then repeated URLs collapse to
/// a single task. The first occurrence in frontier order wins, so its tag is
/// the one that survives. Survivors keep their relative order.
pub fn dedup_frontier(frontier: Vec<CrawlTask>, visited: &HashSet<String>) -> Vec<CrawlTask> {
    let mut seen: HashSet<String> = HashSet::with_capacity(frontier.len());

    frontier
        .into_iter()
        .filter(|task| !visited.contains(&task.url) && seen.insert(task.url.clone()))
        .collect()
}
