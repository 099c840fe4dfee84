//! Transport abstraction and the reqwest-backed implementation
//!
//! The gateway is transport-agnostic: anything implementing [`Transport`]
//! can carry requests. [`HttpTransport`] is the production implementation,
//! with bounded retry for *transient network* failures only — HTTP-level
//! errors are never retried here; classifying and propagating them is the
//! gateway's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client as ReqwestClient;
use thiserror::Error;
use tracing::debug;

use crate::auth::session::SessionCredential;
use crate::errors::GatewayError;
use crate::request::{ApiRequest, ApiResponse};

/// Failures below the HTTP layer
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// Carries requests to the server
///
/// The credential is attached at send time so a replayed request goes out
/// unmodified except for the refreshed credential header.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch a request, attaching the credential when present
    ///
    /// Any HTTP status is an `Ok` outcome; `Err` is reserved for failures
    /// below the HTTP layer.
    ///
    /// # Errors
    /// Returns [`TransportError`] when the request cannot be delivered.
    async fn send(
        &self,
        request: &ApiRequest,
        credential: Option<&SessionCredential>,
    ) -> Result<ApiResponse, TransportError>;
}

/// Reqwest-based transport with transient-failure retry
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpTransport {
    /// Start building a new transport
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn map_error(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() || err.is_request() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }

    fn build_request(
        &self,
        request: &ApiRequest,
        credential: Option<&SessionCredential>,
    ) -> Result<reqwest::Request, TransportError> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self.client.request(request.method().clone(), &url);

        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(credential) = credential {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", credential.token));
        }
        if let Some(payload) = request.payload() {
            builder = builder.json(payload);
        }

        builder.build().map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        credential: Option<&SessionCredential>,
    ) -> Result<ApiResponse, TransportError> {
        let attempts = self.max_attempts.max(1);

        let mut last_error = None;
        for attempt in 0..attempts {
            let prepared = self.build_request(request, credential)?;
            let method = prepared.method().clone();
            let url = prepared.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(prepared).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");
                    let body = response
                        .text()
                        .await
                        .map_err(|e| TransportError::Other(e.to_string()))?;
                    return Ok(ApiResponse::new(status, body));
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");
                    let mapped = self.map_error(&err);
                    let transient =
                        matches!(mapped, TransportError::Timeout(_) | TransportError::Connect(_));
                    if transient && attempt + 1 < attempts {
                        last_error = Some(mapped);
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }
                    return Err(mapped);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TransportError::Other("transport exhausted retries".to_string())))
    }
}

/// Builder for [`HttpTransport`]
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Server base URL, e.g. `https://review.example.com`
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = Some(base_url);
        self
    }

    /// Per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + transient retries)
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Base delay for exponential backoff between transient retries
    #[must_use]
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// User agent presented to the server
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the transport
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] when the base URL is missing or the
    /// underlying client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport, GatewayError> {
        let base_url = self
            .base_url
            .ok_or_else(|| GatewayError::Config("transport base URL not set".to_string()))?;

        let mut builder = ReqwestClient::builder().timeout(self.timeout);
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        builder = builder.default_headers(default_headers);

        let client = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpTransport {
            client,
            base_url,
            timeout: self.timeout,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}
