//! Mutable state carried through a harvest
//!
//! The seen-identifier set lives for the whole process and only ever grows.
//! Everything else is per-run and cleared by [`CrawlState::reset_run`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::url::current_page;

/// State of the harvest loop
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// URL of the next listing page to fetch
    url: String,

    /// Page number of `url`
    page: u32,

    /// Every work identifier observed so far
    seen: HashSet<String>,

    /// Works written during the current run
    recorded: u64,

    /// A listing page came back empty
    exhausted: bool,

    /// A work fell below the word floor
    stopped_early: bool,

    /// When the current run started
    started_at: Instant,
}

impl CrawlState {
    /// Creates a state positioned at `url` with nothing seen yet
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let page = current_page(&url).unwrap_or(1);
        Self {
            url,
            page,
            seen: HashSet::new(),
            recorded: 0,
            exhausted: false,
            stopped_early: false,
            started_at: Instant::now(),
        }
    }

    /// Creates a state whose seen-set is pre-loaded, e.g. from an existing CSV
    pub fn with_seen(url: impl Into<String>, seen: HashSet<String>) -> Self {
        let mut state = Self::new(url);
        state.seen = seen;
        state
    }

    /// Starts a new run at `url`
    ///
    /// Counters, flags and the clock are reset. The seen-set is kept.
    pub fn reset_run(&mut self, url: impl Into<String>) {
        self.set_url(url.into(), None);
        self.recorded = 0;
        self.exhausted = false;
        self.stopped_early = false;
        self.started_at = Instant::now();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Moves to `url`; `page` is read from the URL when not given
    pub fn set_url(&mut self, url: String, page: Option<u32>) {
        self.page = page.or_else(|| current_page(&url)).unwrap_or(1);
        self.url = url;
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn seen_mut(&mut self) -> &mut HashSet<String> {
        &mut self.seen
    }

    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn add_recorded(&mut self, count: usize) {
        self.recorded += count as u64;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Flags the listing as exhausted; the flag is never cleared mid-run
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    pub fn mark_stopped_early(&mut self) {
        self.stopped_early = true;
    }

    /// Time since the current run started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
