//! HTTP client for the batch endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::config::ListingConfig;
use crate::protocol::Listing;

/// Any way a batch fetch can fail. Callers treat all variants alike; the
/// distinction only exists for the log line.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Shared HTTP client for every listing. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ListClient {
    http: reqwest::Client,
}

impl ListClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Fetch one batch of `T` from the configured endpoint.
    pub async fn fetch_batch<T: Listing>(&self, cfg: &ListingConfig) -> Result<Vec<T>, FetchError> {
        let url = cfg.endpoint();
        debug!("[{}] GET {}", T::KIND.path(), url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let envelope: T::Envelope = serde_json::from_slice(&body)?;
        Ok(envelope.into())
    }
}

impl Default for ListClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}
