//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Sleeping the fixed politeness delay before every request
//! - Classifying failures (HTTP status, timeout, network)
//!
//! There is no retry: the caller decides whether to skip and continue.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a request produced no usable content
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request exceeded the configured timeout
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// Connection, TLS or body transfer failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::Network {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Network { url, .. } => url,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use craft_harvest::config::UserAgentConfig;
/// use craft_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page and image fetcher
///
/// Sleeps the configured delay before *every* request, then issues a single
/// GET. Requests never overlap because the crawler awaits each one.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    delay: Duration,
}

impl PageFetcher {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.timeout())?;
        Ok(Self::new(client, crawler.delay()))
    }

    /// Fetches a page and returns its body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Fetches a resource and returns its raw body
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
