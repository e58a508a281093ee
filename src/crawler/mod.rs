//! Crawler module for listing page fetching and processing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with rate-limit retries
//! - Work blurb extraction
//! - Deduplication and the word-floor stopping rule
//! - The page-by-page coordinator and the per-tag harvest driver

mod coordinator;
mod fetcher;
mod harvest;
mod parser;
mod policy;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, RetryPolicy};
pub use harvest::Harvest;
pub use parser::{extract_works, parse_count, ExtractedPage};
pub use policy::{FilteredPage, StopPolicy};

pub use crate::storage::WorkRecord;

use crate::config::Config;
use crate::output::HarvestSummary;
use crate::HarvestError;

/// Runs a complete harvest operation
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Open the CSV sink (pre-loading existing IDs when resuming)
/// 2. Build the HTTP client
/// 3. Run the coordinator once per tag, or once without tags
/// 4. Write the companion readme
///
/// # Example
///
/// ```no_run
/// use blurb_harvest::config::load_config;
/// use blurb_harvest::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = harvest(config).await?;
/// println!("{} works recorded", summary.total_recorded());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<HarvestSummary, HarvestError> {
    Harvest::new(config).run().await
}
