//! Storage module for persisting harvested works
//!
//! This module handles durable output for the harvester:
//! - The `WorkRecord` row type
//! - The `WorkSink` trait the coordinator writes through
//! - A CSV implementation with append-per-page durability

mod csv_sink;
mod traits;

pub use csv_sink::CsvSink;
pub use traits::{StorageError, StorageResult, WorkSink};

/// Title written when a blurb's title cannot be read
pub const MISSING_TITLE: &str = "No title found";

/// Value written in place of a count that could not be read
pub const UNKNOWN_COUNT: i64 = -1;

/// Statistics for one work, as listed in its blurb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    pub id: String,
    pub chapters: Option<u32>,
    pub words: Option<u64>,
    pub kudos: Option<u64>,
    pub title: String,
}

impl WorkRecord {
    /// Serializes the record as a CSV row, unknown counts as `-1`
    pub fn to_row(&self) -> [String; 5] {
        [
            self.id.clone(),
            count_field(self.chapters.map(u64::from)),
            count_field(self.words),
            count_field(self.kudos),
            self.title.clone(),
        ]
    }
}

fn count_field(count: Option<u64>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => UNKNOWN_COUNT.to_string(),
    }
}
