//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `CrawlState`: current URL, seen identifiers, per-run counters and flags
//! - `CrawlPhase`: where a run stands after each page (running or terminal)

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::CrawlState;
pub use phase::CrawlPhase;
