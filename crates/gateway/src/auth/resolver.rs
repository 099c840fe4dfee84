//! Credential resolution with single-flight semantics
//!
//! One re-authentication exchange per unauthenticated episode: concurrent
//! callers serialize on the flight lock, and a caller that acquires it
//! after another exchange completed finds the store generation advanced
//! past the one it observed — it returns the fresh credential without
//! prompting again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::session::{SessionCredential, SessionStore};

/// Why a credential exchange did not produce a credential
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("user cancelled the login prompt")]
    Cancelled,

    #[error("credentials rejected: {0}")]
    Rejected(String),

    #[error("credential source unavailable: {0}")]
    Unavailable(String),

    #[error("credential resolution timed out after {0:?}")]
    TimedOut(Duration),
}

/// Login/credential collaborator
///
/// Implementations prompt the user (or consult whatever secret store the
/// application uses) and exchange the result for a fresh session
/// credential. The gateway never sees how; it only awaits the outcome.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Obtain a fresh session credential
    ///
    /// # Errors
    /// Returns [`CredentialError`] when the user cancels, the server
    /// rejects the submitted credentials, or the exchange cannot be
    /// performed.
    async fn obtain_credentials(&self) -> Result<SessionCredential, CredentialError>;
}

/// Runs the re-authentication exchange, at most one in flight
pub struct CredentialResolver {
    source: Arc<dyn CredentialSource>,
    store: Arc<SessionStore>,
    resolve_timeout: Duration,
    flight: Mutex<()>,
}

impl CredentialResolver {
    /// Create a resolver over the given source and store
    ///
    /// `resolve_timeout` bounds the whole exchange, prompt included; a
    /// timeout behaves as a resolution failure.
    #[must_use]
    pub fn new(
        source: Arc<dyn CredentialSource>,
        store: Arc<SessionStore>,
        resolve_timeout: Duration,
    ) -> Self {
        Self { source, store, resolve_timeout, flight: Mutex::new(()) }
    }

    /// Resolve a fresh credential
    ///
    /// `observed_generation` is the store generation in effect when the
    /// caller's request failed. If a concurrent resolution already moved
    /// the store past that generation, the fresh credential is returned
    /// without a new exchange.
    ///
    /// # Errors
    /// Returns the source's [`CredentialError`], or
    /// [`CredentialError::TimedOut`] when the exchange outlives the
    /// configured timeout.
    pub async fn resolve(
        &self,
        observed_generation: u64,
    ) -> Result<SessionCredential, CredentialError> {
        let _flight = self.flight.lock().await;

        if self.store.generation() > observed_generation {
            if let Some(credential) = self.store.current().await {
                debug!(
                    observed_generation,
                    current_generation = self.store.generation(),
                    "credential already refreshed; skipping exchange"
                );
                return Ok(credential);
            }
        }

        let credential =
            match tokio::time::timeout(self.resolve_timeout, self.source.obtain_credentials())
                .await
            {
                Ok(Ok(credential)) => credential,
                Ok(Err(err)) => {
                    warn!(error = %err, "credential exchange failed");
                    return Err(err);
                }
                Err(_) => {
                    warn!(timeout = ?self.resolve_timeout, "credential exchange timed out");
                    return Err(CredentialError::TimedOut(self.resolve_timeout));
                }
            };

        self.store.install(credential.clone()).await;
        info!("session credential refreshed");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn obtain_credentials(&self) -> Result<SessionCredential, CredentialError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SessionCredential::new(format!("token-{call}")))
        }
    }

    struct CancellingSource;

    #[async_trait]
    impl CredentialSource for CancellingSource {
        async fn obtain_credentials(&self) -> Result<SessionCredential, CredentialError> {
            Err(CredentialError::Cancelled)
        }
    }

    struct StallingSource;

    #[async_trait]
    impl CredentialSource for StallingSource {
        async fn obtain_credentials(&self) -> Result<SessionCredential, CredentialError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(CredentialError::Unavailable("never reached".to_string()))
        }
    }

    #[tokio::test]
    async fn test_resolve_installs_credential() {
        let source = Arc::new(CountingSource::new());
        let store = Arc::new(SessionStore::new());
        let resolver =
            CredentialResolver::new(source.clone(), store.clone(), Duration::from_secs(5));

        let credential = resolver.resolve(0).await.unwrap();
        assert_eq!(credential.token, "token-0");
        assert_eq!(store.generation(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_observation_skips_exchange() {
        let source = Arc::new(CountingSource::new());
        let store = Arc::new(SessionStore::new());
        let resolver =
            CredentialResolver::new(source.clone(), store.clone(), Duration::from_secs(5));

        // First episode performs the exchange.
        resolver.resolve(0).await.unwrap();
        // A caller that observed generation 0 arrives late; the store is
        // already at generation 1, so no second prompt happens.
        let credential = resolver.resolve(0).await.unwrap();
        assert_eq!(credential.token, "token-0");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_current_generation_triggers_exchange() {
        let source = Arc::new(CountingSource::new());
        let store = Arc::new(SessionStore::new());
        let resolver =
            CredentialResolver::new(source.clone(), store.clone(), Duration::from_secs(5));

        resolver.resolve(0).await.unwrap();
        // Generation 1 credential was rejected by the server; a caller that
        // observed generation 1 needs a genuinely new exchange.
        let credential = resolver.resolve(1).await.unwrap();
        assert_eq!(credential.token, "token-1");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_exchange() {
        let source = Arc::new(CountingSource::new());
        let store = Arc::new(SessionStore::new());
        let resolver = Arc::new(CredentialResolver::new(
            source.clone(),
            store.clone(),
            Duration::from_secs(5),
        ));

        let a = resolver.clone();
        let b = resolver.clone();
        let (first, second) = tokio::join!(a.resolve(0), b.resolve(0));

        assert_eq!(first.unwrap().token, "token-0");
        assert_eq!(second.unwrap().token, "token-0");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_propagates() {
        let store = Arc::new(SessionStore::new());
        let resolver =
            CredentialResolver::new(Arc::new(CancellingSource), store.clone(), Duration::from_secs(5));

        let result = resolver.resolve(0).await;
        assert!(matches!(result, Err(CredentialError::Cancelled)));
        assert_eq!(store.generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_resolution_failure() {
        let store = Arc::new(SessionStore::new());
        let resolver = CredentialResolver::new(
            Arc::new(StallingSource),
            store.clone(),
            Duration::from_millis(50),
        );

        let result = resolver.resolve(0).await;
        assert!(matches!(result, Err(CredentialError::TimedOut(_))));
        assert!(store.current().await.is_none());
    }
}
