//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests for listing pages
//! - Fixed-interval retry of 429 responses
//! - Error classification

use crate::config::FetchConfig;
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a single request
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered 429 Too Many Requests
    RateLimited,

    /// Any other non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },
}

/// How 429 responses are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between a 429 and the identical retry
    pub backoff: Duration,

    /// Retries allowed before giving up; `None` retries forever
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            backoff: Duration::from_millis(config.rate_limit_backoff),
            max_retries: config.max_rate_limit_retries,
        }
    }

    /// Returns true if a request that has already been retried `retries` times may go again
    pub fn allows_retry(&self, retries: u32) -> bool {
        self.max_retries.map_or(true, |max| retries < max)
    }
}

/// Builds an HTTP client with proper configuration
///
/// An empty user agent sends no User-Agent header at all.
///
/// # Example
///
/// ```no_run
/// use blurb_harvest::config::FetchConfig;
/// use blurb_harvest::crawler::build_http_client;
///
/// let config = FetchConfig {
///     user_agent: "harvest-bot/1.0 (admin@example.com)".to_string(),
///     ..FetchConfig::default()
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if !config.user_agent.is_empty() {
        builder = builder.user_agent(config.user_agent.clone());
    }

    builder.build()
}

/// Sends one GET request and classifies the response
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchResult, HarvestError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Ok(FetchResult::RateLimited);
    }

    if !status.is_success() {
        return Ok(FetchResult::HttpError {
            status_code: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchResult::Success {
        status_code: status.as_u16(),
        body,
    })
}

/// Listing page fetcher with rate-limit handling
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from_config(config),
        })
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches `url`, waiting out 429 responses
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | HTTP 429 | Sleep `backoff`, resend the same request |
    /// | HTTP 429, retry cap reached | `HarvestError::RateLimited` |
    /// | Other status | `HarvestError::HttpStatus` |
    /// | Transport failure | `HarvestError::Http` |
    pub async fn fetch(&self, url: &str) -> Result<String, HarvestError> {
        tracing::info!("Requesting page: {}", url);
        let mut retries = 0;

        loop {
            match fetch_url(&self.client, url).await? {
                FetchResult::Success { status_code, body } => {
                    tracing::debug!("HTTP {} for {} ({} bytes)", status_code, url, body.len());
                    return Ok(body);
                }

                FetchResult::RateLimited => {
                    if !self.policy.allows_retry(retries) {
                        return Err(HarvestError::RateLimited {
                            url: url.to_string(),
                            attempts: retries + 1,
                        });
                    }
                    retries += 1;
                    tracing::warn!(
                        "Request answered with Status-Code 429, retrying in {:?} (retry {})",
                        self.policy.backoff,
                        retries
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }

                FetchResult::HttpError { status_code } => {
                    return Err(HarvestError::HttpStatus {
                        url: url.to_string(),
                        status: status_code,
                    });
                }
            }
        }
    }
}
