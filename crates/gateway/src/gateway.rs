//! Request gateway façade and episode driver
//!
//! [`RequestGateway::execute`] is the only entry point collaborators use.
//! Requests normally dispatch straight through the transport; a 401
//! challenge diverts the request to the episode driver, a background task
//! that owns the FIFO queue, runs the credential resolver exactly once per
//! episode, and replays the queue in arrival order. Callers never observe
//! the episode — only added latency, or a terminal failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::auth::resolver::{CredentialError, CredentialResolver, CredentialSource};
use crate::auth::session::{SessionCredential, SessionStore};
use crate::auth::state::{AuthState, AuthStateTracker};
use crate::errors::GatewayError;
use crate::interceptor::{Disposition, InterceptorChain};
use crate::observer::{GatewayObserver, TracingObserver};
use crate::queue::RequestQueue;
use crate::request::{ApiRequest, ApiResponse, PendingEntry};
use crate::transport::Transport;

/// Default bound on a credential exchange, login prompt included
pub(crate) const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(120);

/// Authenticated request gateway
///
/// Cloneable façade over the transport, the interceptor chain, and the
/// episode driver. See the crate docs for the full data flow.
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    tracker: Arc<AuthStateTracker>,
    store: Arc<SessionStore>,
    chain: InterceptorChain,
    observer: Arc<dyn GatewayObserver>,
    diversions: mpsc::UnboundedSender<PendingEntry>,
}

impl RequestGateway {
    /// Create a builder for fluent configuration
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Execute a request, transparently re-authenticating when challenged
    ///
    /// The returned future resolves with the eventual (possibly replayed)
    /// response. Dropping it abandons the caller's interest: an in-flight
    /// dispatch is aborted best-effort, while an already-diverted request
    /// stays queued until the episode concludes.
    ///
    /// # Errors
    /// Returns a classified [`GatewayError`]; authentication challenges
    /// are only surfaced as [`GatewayError::AuthenticationFailed`] after a
    /// failed episode.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        if self.tracker.current_state() == AuthState::Authenticating {
            debug!(path = %request.path(), "episode in progress; suspending request");
            return self.divert(request, self.store.generation()).await;
        }

        let observed_generation = self.store.generation();
        let credential = self.store.current().await;
        if credential.as_ref().is_some_and(|c| c.is_expired(0)) {
            debug!(path = %request.path(), "held credential expired; diverting without dispatch");
            return self.divert(request, observed_generation).await;
        }

        let outcome = self.transport.send(&request, credential.as_ref()).await;
        match self.chain.classify(&request, &outcome) {
            Disposition::Accept => {
                outcome.map_err(|err| GatewayError::Network(err.to_string()))
            }
            Disposition::Divert => {
                debug!(path = %request.path(), "authentication challenge; diverting request");
                self.divert(request, observed_generation).await
            }
            Disposition::Fail(err) => {
                self.observer.on_error(&err);
                Err(err)
            }
        }
    }

    /// Current authentication state
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.tracker.current_state()
    }

    /// The shared credential store, for session-level operations (logout)
    #[must_use]
    pub fn credential_store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Whether a usable session credential is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.store.is_authenticated().await
    }

    async fn divert(
        &self,
        request: ApiRequest,
        observed_generation: u64,
    ) -> Result<ApiResponse, GatewayError> {
        let (responder, outcome) = oneshot::channel();
        let entry = PendingEntry::new(request, responder, observed_generation);
        self.diversions
            .send(entry)
            .map_err(|_| GatewayError::Internal("episode driver is not running".to_string()))?;

        match outcome.await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Internal(
                "authentication episode ended without a disposition".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway").field("auth_state", &self.auth_state()).finish()
    }
}

/// Builder for [`RequestGateway`]
#[derive(Default)]
pub struct GatewayBuilder {
    transport: Option<Arc<dyn Transport>>,
    credential_source: Option<Arc<dyn CredentialSource>>,
    observer: Option<Arc<dyn GatewayObserver>>,
    resolve_timeout: Option<Duration>,
}

impl GatewayBuilder {
    /// Set the transport collaborator
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the login/credential collaborator
    #[must_use]
    pub fn credential_source(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credential_source = Some(source);
        self
    }

    /// Set the notification/telemetry collaborator (defaults to
    /// [`TracingObserver`])
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn GatewayObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Bound a credential exchange, login prompt included
    #[must_use]
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = Some(timeout);
        self
    }

    /// Build the gateway and spawn its episode driver
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] when a required collaborator is
    /// missing.
    pub fn build(self) -> Result<RequestGateway, GatewayError> {
        let transport = self
            .transport
            .ok_or_else(|| GatewayError::Config("transport not set".to_string()))?;
        let source = self
            .credential_source
            .ok_or_else(|| GatewayError::Config("credential source not set".to_string()))?;
        let observer: Arc<dyn GatewayObserver> =
            self.observer.unwrap_or_else(|| Arc::new(TracingObserver));
        let resolve_timeout = self.resolve_timeout.unwrap_or(DEFAULT_RESOLVE_TIMEOUT);

        let tracker = Arc::new(AuthStateTracker::new());
        let store = Arc::new(SessionStore::new());
        let resolver = CredentialResolver::new(source, Arc::clone(&store), resolve_timeout);
        let (diversions, intake) = mpsc::unbounded_channel();

        let driver = EpisodeDriver {
            intake,
            queue: RequestQueue::new(),
            transport: Arc::clone(&transport),
            tracker: Arc::clone(&tracker),
            resolver,
            chain: InterceptorChain::standard(),
            observer: Arc::clone(&observer),
        };
        tokio::spawn(driver.run());

        Ok(RequestGateway {
            transport,
            tracker,
            store,
            chain: InterceptorChain::standard(),
            observer,
            diversions,
        })
    }
}

/// Background task owning the queue and the episode state machine
struct EpisodeDriver {
    intake: mpsc::UnboundedReceiver<PendingEntry>,
    queue: RequestQueue,
    transport: Arc<dyn Transport>,
    tracker: Arc<AuthStateTracker>,
    resolver: CredentialResolver,
    chain: InterceptorChain,
    observer: Arc<dyn GatewayObserver>,
}

impl EpisodeDriver {
    async fn run(mut self) {
        while let Some(first) = self.intake.recv().await {
            self.run_episode(first).await;
        }
        debug!("gateway dropped; episode driver exiting");
    }

    /// One authentication episode: first diversion through drained queue
    async fn run_episode(&mut self, first: PendingEntry) {
        self.tracker.mark_unauthenticated();
        let started = self.tracker.begin_authenticating();
        debug_assert!(started, "the driver is the only episode starter");

        let observed_generation = first.observed_generation();
        self.queue.enqueue(first);
        self.absorb_pending();
        self.observer.on_auth_required();
        info!(queued = self.queue.len(), "authentication required; requests suspended");

        match self.resolver.resolve(observed_generation).await {
            Ok(credential) => self.replay_queued(credential).await,
            Err(err) => self.fail_episode(&err),
        }
    }

    /// Drain the queue in FIFO order under the refreshed credential
    ///
    /// Requests diverted while the drain runs are pulled off the intake
    /// between replays and join the tail of the same pass.
    async fn replay_queued(&mut self, credential: SessionCredential) {
        let Self { queue, intake, transport, chain, observer, .. } = self;

        let replay = {
            let transport = Arc::clone(transport);
            let chain = chain.clone();
            let observer = Arc::clone(observer);
            move |request: ApiRequest| {
                let transport = Arc::clone(&transport);
                let chain = chain.clone();
                let observer = Arc::clone(&observer);
                let credential = credential.clone();
                async move {
                    let outcome = transport.send(&request, Some(&credential)).await;
                    match chain.classify(&request, &outcome) {
                        Disposition::Accept => {
                            outcome.map_err(|err| GatewayError::Network(err.to_string()))
                        }
                        Disposition::Divert => {
                            // The refreshed credential was rejected too: no
                            // nested episode, the entry fails terminally.
                            let err = GatewayError::AuthenticationFailed(
                                "refreshed credential rejected on replay".to_string(),
                            );
                            observer.on_error(&err);
                            Err(err)
                        }
                        Disposition::Fail(err) => {
                            observer.on_error(&err);
                            Err(err)
                        }
                    }
                }
            }
        };
        let absorb = || {
            let mut late = Vec::new();
            while let Ok(entry) = intake.try_recv() {
                late.push(entry);
            }
            late
        };

        queue.drain_in_order(replay, absorb).await;

        self.tracker.mark_authenticated();
        self.observer.on_auth_resolved();
        info!("authentication episode resolved; queue drained");
    }

    /// Reject every suspended request with the same terminal error
    fn fail_episode(&mut self, cause: &CredentialError) {
        self.absorb_pending();
        let terminal = GatewayError::AuthenticationFailed(cause.to_string());
        let rejected = self.queue.len();
        self.queue.reject_all(&terminal);
        self.tracker.mark_failed();

        let surfaced = match cause {
            CredentialError::Cancelled => GatewayError::UserCancelled,
            _ => terminal,
        };
        self.observer.on_auth_failed(&surfaced);
        warn!(rejected, error = %surfaced, "authentication episode failed");
    }

    fn absorb_pending(&mut self) {
        while let Ok(entry) = self.intake.try_recv() {
            self.queue.enqueue(entry);
        }
    }
}
