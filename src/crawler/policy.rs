//! Deduplication and the word-floor stopping rule
//!
//! Listings are sorted by word count, so the first work at or under the floor marks
//! the point past which nothing else is worth collecting.

use crate::storage::WorkRecord;
use std::collections::HashSet;

/// Records that survived filtering, plus the early-stop signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredPage {
    /// New records in page order
    pub records: Vec<WorkRecord>,

    /// A work at or below the word floor was reached
    pub stop_early: bool,
}

/// Per-page filter applied to extracted works
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    word_floor: u64,
}

impl StopPolicy {
    pub fn new(word_floor: u64) -> Self {
        Self { word_floor }
    }

    pub fn word_floor(&self) -> u64 {
        self.word_floor
    }

    /// Filters one page of records against `seen`
    ///
    /// Records are visited in page order. A record whose id is already in
    /// `seen` is skipped; any other id is inserted into `seen` before the
    /// record is judged. The first record with a known word count at or below
    /// the floor ends the page with `stop_early` set: a record exactly at the
    /// floor is kept, one below it is dropped. Records with an unknown word
    /// count are kept.
    pub fn filter_page(&self, records: Vec<WorkRecord>, seen: &mut HashSet<String>) -> FilteredPage {
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id.clone()) {
                tracing::debug!("Skipping already seen work {}", record.id);
                continue;
            }

            match record.words {
                None => {
                    tracing::warn!("Hit a work with no word count: {}", record.id);
                }
                Some(words) if words <= self.word_floor => {
                    tracing::info!(
                        "Hit a work with {} words or fewer, stopping search.",
                        self.word_floor
                    );
                    if words == self.word_floor {
                        kept.push(record);
                    }
                    return FilteredPage {
                        records: kept,
                        stop_early: true,
                    };
                }
                Some(_) => {}
            }

            kept.push(record);
        }

        FilteredPage {
            records: kept,
            stop_early: false,
        }
    }
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::new(5000)
    }
}
