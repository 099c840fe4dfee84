//! Authentication state tracking
//!
//! A process-wide tri-state gate. Transitions are the single source of
//! truth other components branch on; nothing mutates the state except
//! through the tracker's narrow method set.

use std::sync::atomic::{AtomicU8, Ordering};

const AUTHENTICATED: u8 = 0;
const UNAUTHENTICATED: u8 = 1;
const AUTHENTICATING: u8 = 2;

/// Whether the client currently believes it holds a valid session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Requests dispatch directly
    Authenticated,
    /// A failure was detected and no episode is running
    Unauthenticated,
    /// A credential-resolution episode is in progress
    Authenticating,
}

fn state_from_repr(repr: u8) -> AuthState {
    match repr {
        UNAUTHENTICATED => AuthState::Unauthenticated,
        AUTHENTICATING => AuthState::Authenticating,
        _ => AuthState::Authenticated,
    }
}

/// Tracks the authentication state across the gateway
///
/// `begin_authenticating` is an atomic check-and-set: exactly one caller
/// wins the race to start an episode, which is the only synchronization
/// needed to enforce the at-most-one-concurrent-episode invariant.
#[derive(Debug)]
pub struct AuthStateTracker {
    state: AtomicU8,
}

impl AuthStateTracker {
    /// Start optimistically authenticated; the first challenge flips the
    /// state
    #[must_use]
    pub fn new() -> Self {
        Self { state: AtomicU8::new(AUTHENTICATED) }
    }

    /// Current state snapshot
    #[must_use]
    pub fn current_state(&self) -> AuthState {
        state_from_repr(self.state.load(Ordering::Acquire))
    }

    /// Record that the session was challenged
    pub fn mark_unauthenticated(&self) {
        self.state.store(UNAUTHENTICATED, Ordering::Release);
    }

    /// Try to start an authentication episode
    ///
    /// Returns `true` only for the caller that won the race; `false` when
    /// an episode is already underway.
    pub fn begin_authenticating(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == AUTHENTICATING {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                AUTHENTICATING,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Record that the episode resolved and the queue drained
    pub fn mark_authenticated(&self) {
        self.state.store(AUTHENTICATED, Ordering::Release);
    }

    /// Record a terminal episode failure
    ///
    /// The state returns to `Unauthenticated`, not `Authenticating`: a new
    /// failure may start a fresh episode.
    pub fn mark_failed(&self) {
        self.state.store(UNAUTHENTICATED, Ordering::Release);
    }
}

impl Default for AuthStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
