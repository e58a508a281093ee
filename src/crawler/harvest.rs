//! Harvest driver - one coordinator run per tag
//!
//! The archive's tag field ORs tags together, but the listing is capped, so
//! each configured tag gets a run of its own. The coordinator's seen-set
//! carries over between runs, which keeps a work tagged with several of the
//! tags from being written twice.

use crate::config::Config;
use crate::crawler::coordinator::Coordinator;
use crate::output::{readme_path, write_readme, HarvestSummary};
use crate::storage::CsvSink;
use crate::url::starting_url;
use crate::HarvestError;
use chrono::Local;

/// A configured harvest over one or more runs
#[derive(Debug, Clone)]
pub struct Harvest {
    config: Config,
    config_hash: Option<String>,
}

impl Harvest {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_hash: None,
        }
    }

    /// Records the hash of the config file the harvest was loaded from
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tag and first URL of every run, in order
    ///
    /// Without tags there is a single untagged run.
    pub fn planned_runs(&self) -> Vec<(Option<String>, String)> {
        let search = &self.config.search;

        if search.tags.is_empty() {
            return vec![(None, starting_url(&search.url, None, search.start_page))];
        }

        search
            .tags
            .iter()
            .map(|tag| {
                (
                    Some(tag.clone()),
                    starting_url(&search.url, Some(tag), search.start_page),
                )
            })
            .collect()
    }

    /// Runs every planned run and writes the readme
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestSummary)` - All runs reached a terminal phase
    /// * `Err(HarvestError)` - A fetch, URL or storage failure ended the harvest;
    ///   every page written before it stays in the CSV
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let output = &self.config.output;
        std::fs::create_dir_all(&output.directory)?;

        let sink = CsvSink::new(&output.directory, &output.name);
        tracing::info!("Writing works to {}", sink.path().display());

        let planned = self.planned_runs();
        let first_url = planned.first().map(|(_, url)| url.clone()).unwrap_or_default();
        let mut coordinator = Coordinator::new(&self.config, sink, first_url)?;
        let mut runs = Vec::new();

        if self.config.search.multichapter_only {
            tracing::debug!("multichapter_only is recorded in the readme but does not filter works");
        }

        for (index, (tag, url)) in planned.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(coordinator.politeness_delay()).await;
                coordinator.reset(url);
            }

            match &tag {
                Some(tag) => tracing::info!("Harvesting works tagged '{}'", tag),
                None => tracing::info!("Harvesting search results"),
            }

            let phase = coordinator.run().await?;
            runs.push(coordinator.outcome(tag, phase));
        }

        let summary = HarvestSummary {
            requested: self.config.search.requested,
            multichapter_only: self.config.search.multichapter_only,
            tags: self.config.search.tags.clone(),
            config_hash: self.config_hash.clone(),
            runs,
            retrieved_on: Local::now(),
        };

        write_readme(&summary, &readme_path(&output.directory, &output.name))?;
        tracing::info!(
            "That's all, folks: {} works recorded",
            summary.total_recorded()
        );

        Ok(summary)
    }
}
