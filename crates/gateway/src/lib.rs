//! # Redline Gateway
//!
//! Generic authenticated request gateway: detects authentication failure on
//! any outgoing request, suspends the application's in-flight and new
//! requests, refreshes the session credential exactly once per
//! unauthenticated episode, and replays the suspended requests in FIFO
//! order — transparently to callers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  RequestGateway  │  Public façade: execute(request)
//! └────────┬─────────┘
//!          │
//!          ├──► Transport          (HTTP dispatch, reqwest by default)
//!          ├──► InterceptorChain   (ordered response classifiers)
//!          ├──► AuthStateTracker   (episode gate, atomic check-and-set)
//!          │
//!          └──► EpisodeDriver      (background task)
//!                    │
//!                    ├──► RequestQueue        (FIFO buffer of diverted requests)
//!                    ├──► CredentialResolver  (single-flight exchange)
//!                    │         └──► CredentialSource  (login collaborator)
//!                    └──► SessionStore        (shared credential + generation)
//! ```
//!
//! # Authentication-failure signal
//!
//! HTTP **401 Unauthorized** marks "authentication required": the request is
//! diverted into the queue and an episode begins. "Authentication failed
//! outright" is a resolver outcome (the credential source cancelling,
//! rejecting, or timing out), which rejects every queued request with
//! [`GatewayError::AuthenticationFailed`]. The session credential rides the
//! `Authorization: Bearer <token>` header, attached by the transport at send
//! time so replays go out unmodified except for the refreshed credential.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use redline_gateway::{
//!     ApiRequest, CredentialError, CredentialSource, HttpTransport, RequestGateway,
//!     SessionCredential,
//! };
//!
//! struct PromptingSource;
//!
//! #[async_trait::async_trait]
//! impl CredentialSource for PromptingSource {
//!     async fn obtain_credentials(&self) -> Result<SessionCredential, CredentialError> {
//!         // Ask the user to log in, exchange credentials for a session token.
//!         Ok(SessionCredential::new("fresh-token"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::builder().base_url("https://review.example.com").build()?;
//!     let gateway = RequestGateway::builder()
//!         .transport(Arc::new(transport))
//!         .credential_source(Arc::new(PromptingSource))
//!         .build()?;
//!
//!     let response = gateway.execute(ApiRequest::get("/api/commits")).await?;
//!     println!("{}", response.body());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod errors;
mod gateway;
mod interceptor;
pub mod observer;
pub mod request;
mod queue;
pub mod transport;

// Re-export the public surface
pub use auth::resolver::{CredentialError, CredentialResolver, CredentialSource};
pub use auth::session::{SessionCredential, SessionStore};
pub use auth::state::{AuthState, AuthStateTracker};
pub use errors::{ErrorCategory, GatewayError};
pub use gateway::{GatewayBuilder, RequestGateway};
pub use observer::{GatewayObserver, TracingObserver};
pub use request::{ApiRequest, ApiResponse};
pub use transport::{HttpTransport, HttpTransportBuilder, Transport, TransportError};
