//! Harvest coordinator - the page-by-page crawl loop
//!
//! One iteration fetches the current listing page, extracts its works,
//! filters them, persists the survivors, advances the URL and re-evaluates
//! the run's phase. Pages are handled strictly one after another with a
//! politeness delay in between.

use crate::config::{Config, RequestedCount};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::extract_works;
use crate::crawler::policy::StopPolicy;
use crate::output::{log_page_processed, log_records, RunOutcome};
use crate::state::{CrawlPhase, CrawlState};
use crate::storage::WorkSink;
use crate::url::next_page;
use crate::HarvestError;
use std::time::Duration;

/// Main harvest coordinator structure
pub struct Coordinator<S: WorkSink> {
    fetcher: Fetcher,
    policy: StopPolicy,
    sink: S,
    state: CrawlState,
    requested: RequestedCount,
    politeness_delay: Duration,
    pages: u32,
}

impl<S: WorkSink> Coordinator<S> {
    /// Creates a new coordinator positioned at `start_url`
    ///
    /// With `output.resume` set, identifiers already in `sink` are loaded into
    /// the seen-set so they are neither fetched into nor written to the sink again.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to build the HTTP client or preload the sink
    pub fn new(
        config: &Config,
        sink: S,
        start_url: impl Into<String>,
    ) -> Result<Self, HarvestError> {
        let url = start_url.into();

        let state = if config.output.resume {
            CrawlState::with_seen(url, sink.preload()?)
        } else {
            CrawlState::new(url)
        };

        Ok(Self::from_parts(
            Fetcher::new(&config.fetch)?,
            StopPolicy::new(config.filter.word_floor),
            sink,
            state,
            config.search.requested,
            Duration::from_millis(config.fetch.politeness_delay),
        ))
    }

    /// Assembles a coordinator from already-built components
    pub fn from_parts(
        fetcher: Fetcher,
        policy: StopPolicy,
        sink: S,
        state: CrawlState,
        requested: RequestedCount,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            policy,
            sink,
            state,
            requested,
            politeness_delay,
            pages: 0,
        }
    }

    /// Prepares a new run starting at `url`
    ///
    /// Per-run counters and flags are cleared; identifiers seen by earlier
    /// runs stay excluded.
    pub fn reset(&mut self, url: impl Into<String>) {
        self.state.reset_run(url);
        self.pages = 0;
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn politeness_delay(&self) -> Duration {
        self.politeness_delay
    }

    /// Listing pages fetched during the current run
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        CrawlPhase::evaluate(&self.state, self.requested)
    }

    /// Runs the loop until a terminal phase is reached
    ///
    /// The phase is checked before the first fetch, so a request for zero
    /// works fetches nothing.
    pub async fn run(&mut self) -> Result<CrawlPhase, HarvestError> {
        tracing::info!("Starting harvest at {}", self.state.url());

        let mut phase = self.phase();
        while phase.is_running() {
            phase = self.step().await?;

            if phase.is_running() {
                tokio::time::sleep(self.politeness_delay).await;
            }
        }

        tracing::info!(
            "Harvest run finished ({}): {} works recorded from {} pages",
            phase,
            self.state.recorded(),
            self.pages
        );

        Ok(phase)
    }

    /// Processes a single listing page and returns the resulting phase
    ///
    /// This method:
    /// 1. Fetches the current page (waiting out 429s)
    /// 2. Extracts the works, flagging exhaustion on an empty page
    /// 3. Drops already-seen works and applies the word floor
    /// 4. Appends the survivors to the sink
    /// 5. Advances the URL, even when the run is about to stop
    pub async fn step(&mut self) -> Result<CrawlPhase, HarvestError> {
        let body = self.fetcher.fetch(self.state.url()).await?;

        let extracted = extract_works(&body);
        if extracted.is_empty {
            self.state.mark_exhausted();
        }

        let filtered = self
            .policy
            .filter_page(extracted.records, self.state.seen_mut());
        if filtered.stop_early {
            self.state.mark_stopped_early();
        }

        let written = self.sink.append(&filtered.records)?;
        log_records(&filtered.records);
        self.state.add_recorded(written);

        let processed = self.state.page();
        let (url, page) = next_page(self.state.url())?;
        self.state.set_url(url, Some(page));
        self.pages += 1;

        log_page_processed(processed, self.state.recorded(), self.state.elapsed());

        Ok(self.phase())
    }

    /// Summarizes the finished run
    pub fn outcome(&self, tag: Option<String>, phase: CrawlPhase) -> RunOutcome {
        RunOutcome {
            tag,
            phase,
            recorded: self.state.recorded(),
            pages: self.pages,
            next_url: self.state.url().to_string(),
        }
    }
}
