//! In-memory collaborators for crawler tests

use crate::crawler::context::{CrawlContext, CrawlSettings};
use crate::crawler::fetcher::{Fetch, FetchResult};
use crate::storage::{ParagraphRecord, ParagraphSink, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const BASE: &str = "https://en.wikipedia.org";
pub const REGION: &str = "mw-content-text";

/// Builds an article page with the given paragraphs and links in its content region
pub fn article(paragraphs: &[&str], links: &[&str]) -> String {
    let mut html = String::from(
        "<html><body><div id=\"mw-navigation\"><a href=\"/wiki/Main_Page\">Main</a></div>\
         <div id=\"mw-content-text\">",
    );
    for paragraph in paragraphs {
        html.push_str(&format!("<p>{}</p>", paragraph));
    }
    for link in links {
        html.push_str(&format!("<a href=\"{}\">link</a>", link));
    }
    html.push_str("</div></body></html>");
    html
}

/// One step in a fetch, as seen by [`StaticSite`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started(String),
    Finished(String),
}

/// Fetcher serving a fixed set of pages; unknown URLs are 404
#[derive(Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    panics: HashSet<String>,
    delays: HashMap<String, Duration>,
    events: Mutex<Vec<FetchEvent>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// Makes fetching `url` panic
    pub fn panicking(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    /// Makes fetching `url` take `delay` before answering
    pub fn delayed(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Makes fetching `url` hang for a very long time
    pub fn stalling(self, url: &str) -> Self {
        self.delayed(url, Duration::from_secs(3600))
    }

    /// Every URL fetched so far, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FetchEvent::Started(url) => Some(url),
                FetchEvent::Finished(_) => None,
            })
            .collect()
    }

    /// Start and finish of every fetch, in the order they happened
    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: FetchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Fetch for StaticSite {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.record(FetchEvent::Started(url.to_string()));

        if self.panics.contains(url) {
            panic!("fetcher crashed on {}", url);
        }
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let result = match self.pages.get(url) {
            Some(body) => FetchResult::Success {
                status_code: 200,
                body: body.clone(),
            },
            None => FetchResult::HttpError { status_code: 404 },
        };
        self.record(FetchEvent::Finished(url.to_string()));
        result
    }
}

/// Sink keeping records in memory, optionally refusing some
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ParagraphRecord>>,
    reject_containing: Option<String>,
    append_delay: Option<Duration>,
}

impl MemorySink {
    /// Refuses every paragraph containing `needle`
    pub fn rejecting(needle: &str) -> Self {
        Self {
            reject_containing: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Blocks for `delay` on every append
    pub fn slow(delay: Duration) -> Self {
        Self {
            append_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ParagraphRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl ParagraphSink for MemorySink {
    fn append(&self, record: &ParagraphRecord) -> StorageResult<()> {
        if let Some(delay) = self.append_delay {
            std::thread::sleep(delay);
        }
        if let Some(needle) = &self.reject_containing {
            if record.text.contains(needle.as_str()) {
                return Err(StorageError::Database("constraint failed".to_string()));
            }
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn test_settings() -> CrawlSettings {
    CrawlSettings::new(Url::parse(BASE).unwrap(), REGION).with_concurrency(4)
}

pub fn test_context(site: StaticSite, sink: Arc<MemorySink>) -> Arc<CrawlContext> {
    context_with(test_settings(), Arc::new(site), sink)
}

pub fn context_with(
    settings: CrawlSettings,
    site: Arc<StaticSite>,
    sink: Arc<MemorySink>,
) -> Arc<CrawlContext> {
    Arc::new(CrawlContext::new(settings, site, sink))
}
