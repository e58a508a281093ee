//! Phase definitions for a harvest run
//!
//! This module defines where a run stands after each listing page.
use std::fmt;

use crate::config::RequestedCount;
use crate::state::CrawlState;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Working toward a bounded requested count
    Running,

    /// Requested count is "all"; only exhaustion or the word floor ends the run
    UnboundedRunning,

    // ===== Terminal Phases =====
    /// A listing page came back with no works
    Exhausted,

    /// The recorded count reached the requested count
    Satisfied,

    /// A work fell below the word floor
    BelowWordFloor,
}

impl CrawlPhase {
    /// Decides the phase from the run's state and the requested count
    ///
    /// Exhaustion wins over everything, then the word floor, then the count.
    pub fn evaluate(state: &CrawlState, requested: RequestedCount) -> Self {
        if state.is_exhausted() {
            Self::Exhausted
        } else if state.stopped_early() {
            Self::BelowWordFloor
        } else if requested.is_unbounded() {
            Self::UnboundedRunning
        } else if requested.is_satisfied_by(state.recorded()) {
            Self::Satisfied
        } else {
            Self::Running
        }
    }

    /// Returns true if this is a terminal phase
    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }

    /// Returns true if another page should be fetched
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::UnboundedRunning)
    }

    /// Short label used in logs and the readme
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::UnboundedRunning => "unbounded_running",
            Self::Exhausted => "exhausted",
            Self::Satisfied => "satisfied",
            Self::BelowWordFloor => "below_word_floor",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
