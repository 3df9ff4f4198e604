//! HTTP client abstraction for language-model API communication.
//!
//! Providers talk to their backends through the [`HttpClient`] trait so tests
//! can swap in a recording client and assert exactly how many requests a flow
//! made.

use crate::error::GrittyError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Upper bound on a single request, after which it fails with
/// [`GrittyError::Network`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP communication with external APIs.
///
/// # Example
///
/// ```ignore
/// use gritty::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new()?;
/// let response = client.post_json(
///     "https://api.example.com/endpoint",
///     &[("Authorization", "Bearer token")],
///     &serde_json::json!({"key": "value"}),
/// ).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body.
    ///
    /// Non-success statuses are returned as ordinary responses; only transport
    /// failures (connect, timeout, unreadable body) are errors.
    ///
    /// # Errors
    ///
    /// Returns [`GrittyError::Network`] if the request cannot be completed.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, GrittyError>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the default [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, GrittyError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, GrittyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GrittyError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, GrittyError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| GrittyError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GrittyError::Network(e.to_string()))?;

        debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
