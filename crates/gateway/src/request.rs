//! Request and response models
//!
//! [`ApiRequest`] is immutable once built: a replay re-dispatches the same
//! request unmodified, with only the refreshed credential header attached by
//! the transport at send time.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::GatewayError;

/// An outbound request addressed by resource path
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    payload: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request with the given method and resource path
    ///
    /// The path is relative to the transport's base URL and may carry a
    /// query string.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), payload: None, headers: Vec::new() }
    }

    /// Convenience constructor for a GET request
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Convenience constructor for a POST request
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Convenience constructor for a DELETE request
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON payload
    ///
    /// # Errors
    /// Returns [`GatewayError::Validation`] if the payload cannot be
    /// serialized.
    pub fn with_json<T: Serialize>(mut self, payload: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| GatewayError::Validation(format!("failed to serialize body: {e}")))?;
        self.payload = Some(value);
        Ok(self)
    }

    /// Attach an extra header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append query parameters to the path
    ///
    /// Values must already be URL-safe; callers pass enum discriminants and
    /// numbers, never free text.
    #[must_use]
    pub fn with_query(mut self, pairs: &[(&str, String)]) -> Self {
        for (key, value) in pairs {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(key);
            self.path.push('=');
            self.path.push_str(value);
        }
        self
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resource path, including any query string
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// JSON payload, if any
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Extra headers attached to the request
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// A response as seen by the gateway: status plus raw body text
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// Create a response from status and body
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// HTTP status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body text
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserialize the body as JSON
    ///
    /// 204/205 responses carry no body by spec; they deserialize as JSON
    /// null so `()` targets succeed.
    ///
    /// # Errors
    /// Returns [`GatewayError::Validation`] if the body cannot be parsed
    /// into the target type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        if self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::RESET_CONTENT
            || self.body.is_empty()
        {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                GatewayError::Validation(format!(
                    "no content response ({}), but response type cannot be deserialized from an empty body",
                    self.status.as_u16()
                ))
            });
        }

        serde_json::from_str(&self.body)
            .map_err(|e| GatewayError::Validation(format!("failed to parse response: {e}")))
    }
}

/// Result delivered to a caller awaiting a diverted request
pub(crate) type GatewayResult = Result<ApiResponse, GatewayError>;

/// A diverted request plus the handle its original caller is awaiting
///
/// Every entry reaches exactly one terminal disposition: replayed and
/// resolved, or rejected when the episode fails. A caller that drops its
/// future abandons interest; the terminal send then becomes a no-op.
pub(crate) struct PendingEntry {
    request: ApiRequest,
    responder: oneshot::Sender<GatewayResult>,
    observed_generation: u64,
}

impl PendingEntry {
    pub(crate) fn new(
        request: ApiRequest,
        responder: oneshot::Sender<GatewayResult>,
        observed_generation: u64,
    ) -> Self {
        Self { request, responder, observed_generation }
    }

    pub(crate) fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Credential generation in effect when the diverted attempt was made
    pub(crate) fn observed_generation(&self) -> u64 {
        self.observed_generation
    }

    /// Deliver the terminal disposition to the original caller
    pub(crate) fn complete(self, result: GatewayResult) {
        if self.responder.send(result).is_err() {
            debug!(path = %self.request.path(), "caller abandoned diverted request");
        }
    }
}
