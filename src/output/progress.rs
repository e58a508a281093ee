//! Console progress reporting
//!
//! Everything goes through `tracing` so verbosity follows the CLI flags.

use crate::storage::WorkRecord;
use std::time::Duration;

/// Formats a duration as `HH:MM:SS`
///
/// Hours are not wrapped, so a two-day harvest prints `48:00:00`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (minutes, seconds) = (secs / 60, secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// One-line summary of a written record
pub fn record_summary(record: &WorkRecord) -> String {
    let row = record.to_row();
    format!(
        "Title: {}, Chapters: {}, Words: {}, Kudos: {}",
        row[4], row[1], row[2], row[3]
    )
}

/// Logs every record of a freshly written page
pub fn log_records(records: &[WorkRecord]) {
    for record in records {
        tracing::info!("{}", record_summary(record));
    }
}

/// Logs the end of a page
pub fn log_page_processed(page: u32, recorded: u64, elapsed: Duration) {
    tracing::info!("Page {} processed ({} works recorded this run)", page, recorded);
    tracing::info!("Runtime: {}", format_elapsed(elapsed));
}
