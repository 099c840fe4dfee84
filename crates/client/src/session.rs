//! Session operations and the login credential source
//!
//! Two collaborators live here:
//!
//! - [`SessionCredentialSource`] implements the gateway's
//!   [`CredentialSource`]: it prompts the [`LoginPrompt`] collaborator for
//!   credentials and exchanges them at the session endpoint over the bare
//!   transport. The exchange deliberately bypasses the gateway — a login
//!   request must never recurse into diversion.
//! - [`SessionClient`] covers session-scoped resources (current user,
//!   logout) through the gateway like any other client.

use std::sync::Arc;

use async_trait::async_trait;
use redline_domain::constants::{CURRENT_USER_PATH, SESSION_PATH};
use redline_domain::{LoginRequest, Result, SessionToken, User};
use redline_gateway::{
    ApiRequest, CredentialError, CredentialSource, HttpTransport, RequestGateway,
    SessionCredential, Transport,
};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::map_gateway_error;

/// The user closed or cancelled the login prompt
#[derive(Debug, Clone, Copy, Error)]
#[error("login prompt dismissed")]
pub struct PromptDismissed;

/// Login/credential UI collaborator
///
/// Implementations gather credentials from the user (form, keychain,
/// environment). Returning [`PromptDismissed`] cancels the authentication
/// episode.
#[async_trait]
pub trait LoginPrompt: Send + Sync {
    /// Ask for credentials
    ///
    /// # Errors
    /// Returns [`PromptDismissed`] when the user declines to log in.
    async fn request_login(&self) -> std::result::Result<LoginRequest, PromptDismissed>;
}

/// Exchanges prompted credentials for a session token
pub struct SessionCredentialSource {
    prompt: Arc<dyn LoginPrompt>,
    transport: Arc<HttpTransport>,
}

impl SessionCredentialSource {
    /// Create a source over the given prompt and transport
    #[must_use]
    pub fn new(prompt: Arc<dyn LoginPrompt>, transport: Arc<HttpTransport>) -> Self {
        Self { prompt, transport }
    }
}

#[async_trait]
impl CredentialSource for SessionCredentialSource {
    async fn obtain_credentials(&self) -> std::result::Result<SessionCredential, CredentialError> {
        let login = self.prompt.request_login().await.map_err(|_| CredentialError::Cancelled)?;
        debug!(user_name = %login.user_name, "submitting login to session endpoint");

        let request = ApiRequest::post(SESSION_PATH)
            .with_json(&login)
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let session: SessionToken = response
                    .json()
                    .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
                info!(user_name = %session.user.user_name, "login accepted");
                Ok(match session.expires_at {
                    Some(expires_at) => SessionCredential::with_expiry(session.token, expires_at),
                    None => SessionCredential::new(session.token),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CredentialError::Rejected(format!(
                    "session endpoint rejected the credentials ({})",
                    response.status()
                )))
            }
            status => Err(CredentialError::Unavailable(format!(
                "session endpoint returned {status}"
            ))),
        }
    }
}

/// Session-scoped resource operations
pub struct SessionClient {
    gateway: Arc<RequestGateway>,
}

impl SessionClient {
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch the currently authenticated user
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let response = self
            .gateway
            .execute(ApiRequest::get(CURRENT_USER_PATH))
            .await
            .map_err(map_gateway_error)?;
        response.json().map_err(map_gateway_error)
    }

    /// End the session on the server and drop the local credential
    ///
    /// # Errors
    /// Returns a mapped [`redline_domain::RedlineError`] on failure; the
    /// local credential is only cleared after the server acknowledged.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.gateway
            .execute(ApiRequest::delete(SESSION_PATH))
            .await
            .map_err(map_gateway_error)?;
        self.gateway.credential_store().clear().await;
        info!("session ended");
        Ok(())
    }

    /// Whether a usable session credential is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.gateway.is_authenticated().await
    }
}
