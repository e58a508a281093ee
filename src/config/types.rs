use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ConfigError;

/// Main configuration structure for Blurb-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration for `url` with every other setting at its default
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            search: SearchConfig {
                url: url.into(),
                requested: RequestedCount::All,
                start_page: default_start_page(),
                multichapter_only: false,
                tags: Vec::new(),
            },
            fetch: FetchConfig::default(),
            filter: FilterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// What to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Listing URL copied from the archive's search page
    pub url: String,

    /// How many works to record before stopping
    #[serde(default)]
    pub requested: RequestedCount,

    /// Page the harvest starts from
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Only multichapter works are wanted (recorded, not yet applied)
    #[serde(rename = "multichapter-only", default)]
    pub multichapter_only: bool,

    /// Tags to OR into the search, one harvest run each
    #[serde(default)]
    pub tags: Vec<String>,
}

/// HTTP behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default)]
    pub user_agent: String,

    /// Delay between successive listing pages (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// Delay before retrying a 429 response (milliseconds)
    #[serde(rename = "rate-limit-backoff", default = "default_rate_limit_backoff")]
    pub rate_limit_backoff: u64,

    /// Give up after this many 429 retries; unset retries forever
    #[serde(rename = "max-rate-limit-retries", default)]
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            politeness_delay: default_politeness_delay(),
            rate_limit_backoff: default_rate_limit_backoff(),
            max_rate_limit_retries: None,
        }
    }
}

/// Stopping rules applied to each listing page
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// A work with fewer words than this ends the harvest
    #[serde(rename = "word-floor", default = "default_word_floor")]
    pub word_floor: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            word_floor: default_word_floor(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Base name of the CSV and readme files
    #[serde(default = "default_output_name")]
    pub name: String,

    /// Directory the output files are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Skip works already present in an existing CSV
    #[serde(default)]
    pub resume: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: default_output_name(),
            directory: default_output_directory(),
            resume: false,
        }
    }
}

/// Number of works a harvest should record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestedCount {
    /// Keep going until the listing runs out
    #[default]
    All,
    /// Stop once at least this many works are recorded
    Count(u64),
}

impl RequestedCount {
    /// Returns true once `recorded` satisfies the request
    pub fn is_satisfied_by(&self, recorded: u64) -> bool {
        match self {
            Self::All => false,
            Self::Count(n) => recorded >= *n,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for RequestedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Count(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for RequestedCount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "a" | "all" => Ok(Self::All),
            other => other
                .parse()
                .map(Self::Count)
                .map_err(|_| ConfigError::InvalidCount(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for RequestedCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequestedVisitor;

        impl<'de> Visitor<'de> for RequestedVisitor {
            type Value = RequestedCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative integer or \"all\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(RequestedCount::Count)
                    .map_err(|_| E::custom(format!("requested count cannot be negative: {}", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(RequestedCount::Count(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RequestedVisitor)
    }
}

fn default_start_page() -> u32 {
    1
}

fn default_politeness_delay() -> u64 {
    5000
}

fn default_rate_limit_backoff() -> u64 {
    10000
}

fn default_word_floor() -> u64 {
    5000
}

fn default_output_name() -> String {
    "work_ids".to_string()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
