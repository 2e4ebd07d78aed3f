//! HTTP transport seam for the model gateway.
//!
//! [`ModelGateway`](crate::ModelGateway) only needs "POST this JSON with a
//! bearer token and give me the status and body". Keeping that behind a
//! trait lets tests count calls and script responses without a network.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;

/// Raw HTTP response: status code plus the unparsed body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors from the transport layer itself (no HTTP response obtained).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No complete response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The HTTP request failed (network, DNS, TLS, etc.).
    #[error("{}", error_chain(.0))]
    Request(#[source] reqwest::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(timeout)
        } else {
            TransportError::Request(err)
        }
    }
}

/// reqwest's `Display` omits the cause ("connection refused", ...).
fn error_chain(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one JSON POST with an `Authorization: Bearer` header.
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, timeout))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Body(error_chain(&e))
            }
        })?;

        Ok(TransportResponse { status, body })
    }
}
