//! Session credential storage
//!
//! The credential is an opaque token overwritten on each successful
//! resolution. The store also tracks a monotonically increasing
//! *generation*: a request that failed under generation N can tell whether
//! a later episode already installed generation N+1, in which case no new
//! exchange is needed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Opaque session credential with optional expiry metadata
#[derive(Debug, Clone)]
pub struct SessionCredential {
    /// Token presented to the server on every request
    pub token: String,
    /// Absolute expiration timestamp, when the server provides one
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCredential {
    /// A credential without expiry metadata
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), expires_at: None }
    }

    /// A credential with a known expiry timestamp
    #[must_use]
    pub fn with_expiry(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { token: token.into(), expires_at: Some(expires_at) }
    }

    /// Whether the credential is expired or will expire within the given
    /// threshold
    ///
    /// A credential without expiry metadata is assumed valid.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at
            }
            None => false,
        }
    }
}

/// Shared holder of the current session credential
#[derive(Debug)]
pub struct SessionStore {
    credential: RwLock<Option<SessionCredential>>,
    generation: AtomicU64,
}

impl SessionStore {
    /// An empty store: no credential, generation zero
    #[must_use]
    pub fn new() -> Self {
        Self { credential: RwLock::new(None), generation: AtomicU64::new(0) }
    }

    /// Snapshot of the current credential
    pub async fn current(&self) -> Option<SessionCredential> {
        self.credential.read().await.clone()
    }

    /// Install a freshly resolved credential, bumping the generation
    pub async fn install(&self, credential: SessionCredential) {
        *self.credential.write().await = Some(credential);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop the credential (logout); the generation is not reset
    pub async fn clear(&self) {
        *self.credential.write().await = None;
    }

    /// Generation counter: incremented on every install
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Whether a usable (present, unexpired) credential is held
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.as_ref().is_some_and(|c| !c.is_expired(0))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_bumps_generation() {
        let store = SessionStore::new();
        assert_eq!(store.generation(), 0);
        assert!(store.current().await.is_none());

        store.install(SessionCredential::new("first")).await;
        assert_eq!(store.generation(), 1);
        assert_eq!(store.current().await.unwrap().token, "first");

        store.install(SessionCredential::new("second")).await;
        assert_eq!(store.generation(), 2);
        assert_eq!(store.current().await.unwrap().token, "second");
    }

    #[tokio::test]
    async fn test_clear_keeps_generation() {
        let store = SessionStore::new();
        store.install(SessionCredential::new("token")).await;
        store.clear().await;

        assert!(store.current().await.is_none());
        assert!(!store.is_authenticated().await);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_expiry_threshold() {
        let soon = Utc::now() + chrono::Duration::seconds(60);
        let credential = SessionCredential::with_expiry("token", soon);

        assert!(!credential.is_expired(0));
        assert!(credential.is_expired(300));
        assert!(!SessionCredential::new("no-expiry").is_expired(300));
    }

    #[tokio::test]
    async fn test_expired_credential_is_not_authenticated() {
        let store = SessionStore::new();
        let past = Utc::now() - chrono::Duration::seconds(10);
        store.install(SessionCredential::with_expiry("stale", past)).await;

        assert!(!store.is_authenticated().await);
    }
}
