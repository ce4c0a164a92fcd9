//! Output module for reporting on harvested paragraphs
//!
//! Reads the paragraph database and prints per-tag totals together with the
//! most recent run record.

pub mod stats;

pub use stats::{load_statistics, print_statistics, ParagraphStatistics};
