//! Statistics generation from the paragraph database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{RunRecord, Storage};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct ParagraphStatistics {
    /// Total number of stored paragraphs
    pub total_paragraphs: u64,

    /// Number of distinct pages paragraphs came from
    pub distinct_urls: u64,

    /// Paragraph count per tag, largest first
    pub by_tag: Vec<(String, u64)>,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl ParagraphStatistics {
    /// Share of all paragraphs filed under `count`, as a percentage
    pub fn share(&self, count: u64) -> f64 {
        if self.total_paragraphs == 0 {
            0.0
        } else {
            (count as f64 / self.total_paragraphs as f64) * 100.0
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ParagraphStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<ParagraphStatistics, HarvestError> {
    let total_paragraphs = storage.count_paragraphs()?;
    let distinct_urls = storage.count_distinct_urls()?;

    let by_tag = storage.count_paragraphs_by_tag()?;
    let latest_run = storage.get_latest_run()?;

    Ok(ParagraphStatistics {
        total_paragraphs,
        distinct_urls,
        by_tag,
        latest_run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ParagraphStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total paragraphs: {}", stats.total_paragraphs);
    println!("  Distinct pages: {}", stats.distinct_urls);
    println!();

    if !stats.by_tag.is_empty() {
        println!("Paragraphs by Tag:");
        for (tag, count) in &stats.by_tag {
            println!("  {}: {} ({:.1}%)", tag, count, stats.share(*count));
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Levels: {}", run.max_levels);
            println!("  Pages crawled: {}", run.pages_crawled);
            println!("  Paragraphs: {}", run.paragraphs);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No runs recorded yet."),
    }
}
