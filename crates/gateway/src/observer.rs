//! Gateway event observation
//!
//! The notification/telemetry collaborator. The gateway reports episode
//! boundaries and classified errors here; presenting them (re-login
//! prompt, toast, metrics) is the application's concern.

use tracing::{info, warn};

use crate::errors::GatewayError;

/// Receives gateway lifecycle events and classified errors
///
/// All methods default to no-ops so implementations only handle what they
/// care about.
pub trait GatewayObserver: Send + Sync {
    /// An authentication episode began; requests are being suspended
    fn on_auth_required(&self) {}

    /// The episode resolved and all suspended requests were replayed
    fn on_auth_resolved(&self) {}

    /// The episode ended in terminal failure; queued requests were rejected
    fn on_auth_failed(&self, _error: &GatewayError) {}

    /// A non-auth failure was classified and surfaced to its caller
    fn on_error(&self, _error: &GatewayError) {}
}

/// Default observer: structured logging through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn on_auth_required(&self) {
        info!("authentication required; suspending requests");
    }

    fn on_auth_resolved(&self) {
        info!("authentication resolved; suspended requests replayed");
    }

    fn on_auth_failed(&self, error: &GatewayError) {
        warn!(error = %error, "authentication episode failed");
    }

    fn on_error(&self, error: &GatewayError) {
        warn!(error = %error, category = ?error.category(), "request failed");
    }
}
