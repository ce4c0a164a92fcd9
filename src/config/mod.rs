//! Configuration module for Wiki-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wiki_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {} levels deep", config.crawler.max_levels);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SeedEntry, SiteConfig, UserAgentConfig,
    DEFAULT_BASE_DOMAIN, DEFAULT_CONCURRENCY, DEFAULT_CONTENT_REGION_ID, DEFAULT_MAX_LEVELS,
    DEFAULT_PAGE_TIMEOUT_SECS,
};

pub use validation::{validate_max_levels, MAX_LEVELS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
