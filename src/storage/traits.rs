//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::storage::WorkRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable record sinks
///
/// A sink receives one listing page's surviving records at a time. Whatever
/// `append` reports as written must already be durable when it returns.
pub trait WorkSink {
    /// Appends `records` in order
    ///
    /// # Returns
    ///
    /// The number of records written
    fn append(&mut self, records: &[WorkRecord]) -> StorageResult<usize>;

    /// Identifiers already present in the sink from earlier harvests
    fn preload(&self) -> StorageResult<HashSet<String>>;
}
