//! HTTP client for the places provider.
//!
//! Wraps `reqwest` with API key handling, bounded retry on transport
//! failures and typed response deserialization. Every endpoint checks the
//! `status` envelope and surfaces provider-level failures as
//! [`PlacesError::Api`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::{retry_with_backoff, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Client for the places provider.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, retry: RetryPolicy) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("mplscoffee/0.1 (coffee-shop-harvester)")
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry,
        })
    }

    /// Builds the request URL for `endpoint` with percent-encoded query
    /// parameters. The API key is always appended last.
    pub(crate) fn build_url(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request under the retry policy, asserts a 2xx status
    /// and deserializes the body.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] on network failure or a non-2xx status
    /// once retries are exhausted, [`PlacesError::Deserialize`] if the body
    /// does not match `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &Url,
    ) -> Result<T, PlacesError> {
        retry_with_backoff(self.retry, endpoint, move || async move {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(strip_url)?;
            let response = response.error_for_status().map_err(strip_url)?;
            let body = response.text().await.map_err(strip_url)?;
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: endpoint.to_owned(),
                source: e,
            })
        })
        .await
    }

    /// Checks the `status` envelope. `OK`, `ZERO_RESULTS` and a missing
    /// status pass; anything else is a provider error.
    pub(crate) fn check_status(
        endpoint: &'static str,
        status: &str,
        error_message: Option<&str>,
    ) -> Result<(), PlacesError> {
        match status {
            "" | "OK" | "ZERO_RESULTS" => Ok(()),
            other => Err(PlacesError::Api {
                endpoint,
                status: other.to_owned(),
                message: error_message.unwrap_or("no error message").to_owned(),
            }),
        }
    }
}

// Request URLs carry the API key; keep it out of error messages and logs.
fn strip_url(e: reqwest::Error) -> PlacesError {
    PlacesError::Http(e.without_url())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
