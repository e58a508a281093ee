//! Output module for reporting harvest progress and results
//!
//! This module handles:
//! - Per-page and per-record console progress
//! - The companion readme written next to each CSV

pub mod progress;
mod readme;

pub use progress::{format_elapsed, log_page_processed, log_records, record_summary};
pub use readme::{format_readme, readme_path, write_readme, HarvestSummary, RunOutcome};
