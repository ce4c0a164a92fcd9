use serde::Deserialize;

/// Default number of pages crawled in parallel
pub const DEFAULT_CONCURRENCY: u32 = 50;

/// Default number of breadth-first levels
pub const DEFAULT_MAX_LEVELS: u32 = 2;

/// Default upper bound on a single page task, in seconds
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 120;

/// Default domain relative article links are resolved against
pub const DEFAULT_BASE_DOMAIN: &str = "https://en.wikipedia.org";

/// Default id of the element holding an article's main content
pub const DEFAULT_CONTENT_REGION_ID: &str = "mw-content-text";

/// Main configuration structure for Wiki-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of breadth-first levels to crawl (seeds are level 0)
    #[serde(rename = "max-levels", default = "default_max_levels")]
    pub max_levels: u32,

    /// Size of the worker pool
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Upper bound on fetching, extracting and persisting one page
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_levels: DEFAULT_MAX_LEVELS,
            concurrency: DEFAULT_CONCURRENCY,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
        }
    }
}

/// Layout of the crawled site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host article links are resolved against
    #[serde(rename = "base-domain", default = "default_base_domain")]
    pub base_domain: String,

    /// `id` attribute of the main content container
    #[serde(rename = "content-region-id", default = "default_content_region_id")]
    pub content_region_id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            content_region_id: DEFAULT_CONTENT_REGION_ID.to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A starting page and the topic label its content is filed under
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub url: String,
    pub tag: String,
}

fn default_max_levels() -> u32 {
    DEFAULT_MAX_LEVELS
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

fn default_page_timeout() -> u64 {
    DEFAULT_PAGE_TIMEOUT_SECS
}

fn default_base_domain() -> String {
    DEFAULT_BASE_DOMAIN.to_string()
}

fn default_content_region_id() -> String {
    DEFAULT_CONTENT_REGION_ID.to_string()
}
