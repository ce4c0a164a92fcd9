//! Single-page crawl: fetch, extract, persist, discover
//!
//! A page crawl never fails from the caller's point of view. Fetch errors,
//! fetches that outlive the page timeout and pages without a content region
//! are logged and produce no children. Sink errors are logged per paragraph
//! and the rest of the page is still stored.
//!
//! Only the fetch is bounded by the page timeout. Once a body has arrived the
//! page always runs to completion, so every stored paragraph is counted.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::FetchResult;
use crate::crawler::frontier::CrawlTask;
use crate::extract::{extract_page, ExtractError};
use crate::storage::ParagraphRecord;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a page contributed nothing
#[derive(Debug, Error)]
pub enum PageError {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Crawls individual pages against a shared [`CrawlContext`]
#[derive(Clone)]
pub struct PageCrawler {
    ctx: Arc<CrawlContext>,
}

impl PageCrawler {
    pub fn new(ctx: Arc<CrawlContext>) -> Self {
        Self { ctx }
    }

    /// Crawls one page and returns the tasks for the next level
    ///
    /// # Steps
    ///
    /// 1. Fetch `task.url`, giving up after the page timeout
    /// 2. Locate the main-content region and run the extraction pipeline
    /// 3. Store every retained paragraph, one at a time
    /// 4. Count the page and its paragraphs
    /// 5. Turn every article link into a child task carrying `task.tag`
    pub async fn crawl(&self, task: &CrawlTask) -> Vec<CrawlTask> {
        match self.harvest(task).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!("Error getting content of {}: {}", task.url, e);
                self.ctx.stats().record_failure();
                Vec::new()
            }
        }
    }

    async fn harvest(&self, task: &CrawlTask) -> Result<Vec<CrawlTask>, PageError> {
        tracing::debug!("Getting content of page {}", task.url);

        let settings = self.ctx.settings();
        let fetched =
            tokio::time::timeout(settings.page_timeout, self.ctx.fetcher().fetch(&task.url))
                .await
                .map_err(|_| PageError::Timeout(settings.page_timeout))?;

        let body = match fetched {
            FetchResult::Success { status_code, body } => {
                tracing::debug!("HTTP {} ({} bytes): {}", status_code, body.len(), task.url);
                body
            }
            FetchResult::HttpError { status_code } => {
                return Err(PageError::Http {
                    status: status_code,
                })
            }
            FetchResult::NetworkError { error } => return Err(PageError::Network(error)),
        };

        let page = extract_page(&body, &settings.content_region_id, &settings.base_domain)?;

        tracing::debug!(
            "{} paragraphs kept, {} article links found: {}",
            page.paragraphs.len(),
            page.links.len(),
            task.url
        );

        let kept = page.paragraphs.len() as u64;
        self.persist(task, page.paragraphs).await;
        self.ctx.stats().record_page(kept);

        Ok(page.links.into_iter().map(|url| task.child(url)).collect())
    }

    /// Appends each paragraph on the blocking pool
    ///
    /// Every paragraph gets its own attempt; a refused or crashed append is
    /// logged, counted and skipped.
    async fn persist(&self, task: &CrawlTask, paragraphs: Vec<String>) {
        for text in paragraphs {
            let record = ParagraphRecord::new(text, &task.url, &task.tag);
            let sink = self.ctx.sink();

            match tokio::task::spawn_blocking(move || sink.append(&record)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Failed to store paragraph from {}: {}", task.url, e);
                    self.ctx.stats().record_rejected();
                }
                Err(e) => {
                    tracing::warn!("Paragraph append from {} did not finish: {}", task.url, e);
                    self.ctx.stats().record_rejected();
                }
            }
        }
    }
}
