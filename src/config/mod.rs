//! Configuration module for Blurb-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus reading the optional tag list.
//!
//! # Example
//!
//! ```no_run
//! use blurb_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvest will request: {}", config.search.requested);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, FilterConfig, OutputConfig, RequestedCount, SearchConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_tags};
pub use validation::validate;
