//! Companion readme generation
//!
//! Next to every CSV sits `<name>_readme.txt` describing how it was produced:
//! where the harvest stopped, what was asked for, and when.

use crate::config::RequestedCount;
use crate::state::CrawlPhase;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of one harvest run (one tag, or the untagged search)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Tag injected for this run, if any
    pub tag: Option<String>,

    /// Terminal phase the run ended in
    pub phase: CrawlPhase,

    /// Works written during this run
    pub recorded: u64,

    /// Listing pages fetched during this run
    pub pages: u32,

    /// URL the run would have fetched next
    pub next_url: String,
}

/// Everything the readme records about a harvest
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub requested: RequestedCount,
    pub multichapter_only: bool,
    pub tags: Vec<String>,
    pub config_hash: Option<String>,
    pub runs: Vec<RunOutcome>,
    pub retrieved_on: DateTime<Local>,
}

impl HarvestSummary {
    /// URL the last run stopped at, if any run happened
    pub fn final_url(&self) -> Option<&str> {
        self.runs.last().map(|run| run.next_url.as_str())
    }

    /// Works written across all runs
    pub fn total_recorded(&self) -> u64 {
        self.runs.iter().map(|run| run.recorded).sum()
    }
}

/// Path of the readme belonging to output `name`
pub fn readme_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}_readme.txt", name))
}

/// Writes the readme, replacing any previous one
pub fn write_readme(summary: &HarvestSummary, output_path: &Path) -> std::io::Result<()> {
    let text = format_readme(summary);

    let mut file = File::create(output_path)?;
    file.write_all(text.as_bytes())?;

    Ok(())
}

/// Formats a harvest summary as readme text
pub fn format_readme(summary: &HarvestSummary) -> String {
    let mut text = String::new();

    text.push_str(&format!("url: {}\n", summary.final_url().unwrap_or("")));
    text.push_str(&format!("num_requested_fic: {}\n", summary.requested));
    text.push_str(&format!(
        "multichapter_only: {}\n",
        summary.multichapter_only
    ));
    if !summary.tags.is_empty() {
        text.push_str(&format!("tags: {}\n", summary.tags.join(", ")));
    }
    text.push_str(&format!("recorded: {}\n", summary.total_recorded()));

    for run in &summary.runs {
        let label = run.tag.as_deref().unwrap_or("(no tag)");
        text.push_str(&format!(
            "run {}: {} after {} pages, {} recorded, next {}\n",
            label, run.phase, run.pages, run.recorded, run.next_url
        ));
    }

    if let Some(hash) = &summary.config_hash {
        text.push_str(&format!("config_hash: {}\n", hash));
    }
    text.push_str(&format!(
        "retrieved on: {}",
        summary.retrieved_on.format("%Y-%m-%d %H:%M:%S%.6f")
    ));

    text
}
