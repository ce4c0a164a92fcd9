//! Storage traits and error types
//!
//! This module defines the trait interfaces for storage backends and
//! associated error types.

use crate::storage::{ParagraphRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Connection pool lock poisoned")]
    PoolPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for harvested paragraphs
///
/// Crawl workers call `append` concurrently, one record at a time, so
/// implementations must not share one mutable session between callers.
pub trait ParagraphSink: Send + Sync {
    /// Durably stores a single paragraph
    fn append(&self, record: &ParagraphRecord) -> StorageResult<()>;
}

/// Run bookkeeping and read-side queries over the harvested data
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `max_levels` - Number of levels the run will crawl
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&self, config_hash: &str, max_levels: u32) -> StorageResult<i64>;

    /// Marks a run as completed and records its final totals
    fn complete_run(&self, run_id: i64, pages_crawled: u64, paragraphs: u64)
        -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Counts stored paragraphs
    fn count_paragraphs(&self) -> StorageResult<u64>;

    /// Counts stored paragraphs per tag, largest first
    fn count_paragraphs_by_tag(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Counts distinct source pages that contributed paragraphs
    fn count_distinct_urls(&self) -> StorageResult<u64>;

    /// Lists every distinct `(url, tag)` pair, sorted
    fn list_url_tags(&self) -> StorageResult<Vec<(String, String)>>;
}
