//! CSV-backed record sink
//!
//! Rows are `id,chapters,words,kudos,title` with no header. The file is opened
//! in append mode for every page and flushed before `append` returns, so an
//! interrupted harvest keeps every page written before the interruption.

use crate::storage::traits::{StorageResult, WorkSink};
use crate::storage::WorkRecord;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Record sink writing to `<directory>/<name>.csv`
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink for the output `name` inside `directory`
    ///
    /// Nothing is touched on disk until the first `append`.
    pub fn new(directory: &Path, name: &str) -> Self {
        Self {
            path: directory.join(format!("{}.csv", name)),
        }
    }

    /// Creates a sink writing to exactly `path`
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkSink for CsvSink {
    fn append(&mut self, records: &[WorkRecord]) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let mut written = 0;
        for record in records {
            writer.write_record(record.to_row())?;
            written += 1;
        }
        writer.flush()?;

        tracing::debug!("Appended {} rows to {}", written, self.path.display());
        Ok(written)
    }

    fn preload(&self) -> StorageResult<HashSet<String>> {
        if !self.path.exists() {
            tracing::info!(
                "No existing file at {}; creating a new one",
                self.path.display()
            );
            return Ok(HashSet::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut ids = HashSet::new();
        for row in reader.records() {
            if let Some(id) = row?.get(0).filter(|id| !id.is_empty()) {
                ids.insert(id.to_string());
            }
        }

        tracing::info!(
            "Skipping {} existing IDs from {}",
            ids.len(),
            self.path.display()
        );
        Ok(ids)
    }
}
