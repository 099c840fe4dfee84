//! # Redline Client
//!
//! Typed resource clients for the Redline code-review service, built on the
//! authenticated request gateway: session and current-user operations,
//! commit listings and details, comments, and follow-ups. Callers never see
//! authentication state — a challenged request is transparently replayed
//! once the session credential is refreshed.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use redline_client::session::LoginPrompt;
//! use redline_client::{ClientConfig, RedlineClient};
//! use redline_domain::{CommitFilter, LoginRequest, PageRequest};
//!
//! struct EnvPrompt;
//!
//! #[async_trait::async_trait]
//! impl LoginPrompt for EnvPrompt {
//!     async fn request_login(
//!         &self,
//!     ) -> Result<LoginRequest, redline_client::session::PromptDismissed> {
//!         Ok(LoginRequest::new("alice", "secret"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> redline_domain::Result<()> {
//!     let config = ClientConfig::load()?;
//!     let client = RedlineClient::builder()
//!         .config(config)
//!         .login_prompt(Arc::new(EnvPrompt))
//!         .build()?;
//!
//!     let page = client.commits().list(CommitFilter::ToReview, PageRequest::default()).await?;
//!     println!("{} commits awaiting review", page.total);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use redline_domain::{RedlineError, Result};
use redline_gateway::{GatewayError, GatewayObserver, HttpTransport, RequestGateway};

pub mod comments;
pub mod commits;
pub mod config;
pub mod followups;
pub mod session;

pub use comments::CommentsClient;
pub use commits::CommitsClient;
pub use config::ClientConfig;
pub use followups::FollowupsClient;
pub use session::{LoginPrompt, SessionClient, SessionCredentialSource};

/// Map a gateway error onto the application-wide taxonomy
pub(crate) fn map_gateway_error(err: GatewayError) -> RedlineError {
    match err {
        GatewayError::UserCancelled => {
            RedlineError::Cancelled("user cancelled authentication".to_string())
        }
        GatewayError::AuthenticationFailed(msg) => RedlineError::Auth(msg),
        GatewayError::Network(msg) => RedlineError::Network(msg),
        GatewayError::Timeout(duration) => {
            RedlineError::Network(format!("timeout after {duration:?}"))
        }
        GatewayError::Server(msg) => RedlineError::Server(msg),
        GatewayError::Validation(msg) => RedlineError::Validation(msg),
        GatewayError::Config(msg) => RedlineError::Config(msg),
        GatewayError::Internal(msg) => RedlineError::Internal(msg),
    }
}

/// Facade over the gateway and the typed resource clients
pub struct RedlineClient {
    gateway: Arc<RequestGateway>,
    session: SessionClient,
    commits: CommitsClient,
    comments: CommentsClient,
    followups: FollowupsClient,
}

impl RedlineClient {
    /// Create a builder for fluent configuration
    #[must_use]
    pub fn builder() -> RedlineClientBuilder {
        RedlineClientBuilder::default()
    }

    /// Session operations (current user, logout)
    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Commit listings, details, and review state
    #[must_use]
    pub fn commits(&self) -> &CommitsClient {
        &self.commits
    }

    /// Comment posting
    #[must_use]
    pub fn comments(&self) -> &CommentsClient {
        &self.comments
    }

    /// Follow-up listings and resolution
    #[must_use]
    pub fn followups(&self) -> &FollowupsClient {
        &self.followups
    }

    /// The underlying gateway, for advanced operations
    #[must_use]
    pub fn gateway(&self) -> Arc<RequestGateway> {
        Arc::clone(&self.gateway)
    }
}

impl std::fmt::Debug for RedlineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedlineClient").field("gateway", &self.gateway).finish()
    }
}

/// Builder for [`RedlineClient`]
#[derive(Default)]
pub struct RedlineClientBuilder {
    config: Option<ClientConfig>,
    login_prompt: Option<Arc<dyn LoginPrompt>>,
    observer: Option<Arc<dyn GatewayObserver>>,
}

impl RedlineClientBuilder {
    /// Set the client configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the login prompt collaborator
    #[must_use]
    pub fn login_prompt(mut self, prompt: Arc<dyn LoginPrompt>) -> Self {
        self.login_prompt = Some(prompt);
        self
    }

    /// Set the gateway observer (defaults to tracing-backed logging)
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn GatewayObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client, wiring transport, credential source, and gateway
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`RedlineError::Config`] when required pieces are missing or
    /// invalid.
    pub fn build(self) -> Result<RedlineClient> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let prompt = self
            .login_prompt
            .ok_or_else(|| RedlineError::Config("login prompt not set".to_string()))?;

        let transport = HttpTransport::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .max_attempts(config.transport_attempts)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(map_gateway_error)?;
        let transport = Arc::new(transport);

        let source = Arc::new(SessionCredentialSource::new(prompt, Arc::clone(&transport)));

        let mut builder = RequestGateway::builder()
            .transport(transport)
            .credential_source(source)
            .resolve_timeout(Duration::from_secs(config.resolve_timeout_secs));
        if let Some(observer) = self.observer {
            builder = builder.observer(observer);
        }
        let gateway = Arc::new(builder.build().map_err(map_gateway_error)?);

        Ok(RedlineClient {
            session: SessionClient::new(Arc::clone(&gateway)),
            commits: CommitsClient::new(Arc::clone(&gateway)),
            comments: CommentsClient::new(Arc::clone(&gateway)),
            followups: FollowupsClient::new(Arc::clone(&gateway)),
            gateway,
        })
    }
}
