//! Storage module for persisting harvested paragraphs
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Concurrent paragraph appends from crawl workers
//! - Run tracking
//! - Read-side statistics for reports

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ParagraphSink, Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// One paragraph harvested from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphRecord {
    /// Paragraph text as it appeared on the page
    pub text: String,

    /// URL of the page the paragraph came from
    pub source_url: String,

    /// Topic label inherited from the seed
    pub tag: String,

    /// When the paragraph was captured
    pub captured_at: DateTime<Utc>,
}

impl ParagraphRecord {
    /// Creates a record stamped with the current time
    pub fn new(
        text: impl Into<String>,
        source_url: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
            tag: tag.into(),
            captured_at: Utc::now(),
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub max_levels: u32,
    pub status: RunStatus,
    pub pages_crawled: u64,
    pub paragraphs: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}
