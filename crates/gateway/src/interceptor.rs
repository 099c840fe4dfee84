//! Response classification chain
//!
//! An explicit ordered list of classifier functions evaluated in sequence.
//! Each classifier inspects the transport outcome and either handles it
//! (short-circuiting the chain with a tagged verdict) or passes.
//!
//! The auth-challenge classifier runs first and exclusively owns HTTP 401:
//! the error classifiers after it never see an authentication failure, so
//! the two concerns cannot double-handle a response.

use reqwest::StatusCode;

use crate::errors::GatewayError;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::TransportError;

/// Raw result of a transport dispatch
pub(crate) type TransportOutcome = Result<ApiResponse, TransportError>;

/// What a single classifier decided
pub(crate) enum Verdict {
    /// Not this classifier's concern; evaluate the next one
    Pass,
    /// Outcome handled; stop the chain
    Handled(Disposition),
}

/// Terminal classification of a transport outcome
#[derive(Debug)]
pub(crate) enum Disposition {
    /// Successful response; resolve the caller directly
    Accept,
    /// Authentication required; divert the request into the queue
    Divert,
    /// Terminal failure; reject the caller with the classified error
    Fail(GatewayError),
}

type Classifier = fn(&ApiRequest, &TransportOutcome) -> Verdict;

/// Ordered classifier pipeline
#[derive(Clone)]
pub(crate) struct InterceptorChain {
    classifiers: Vec<Classifier>,
}

impl InterceptorChain {
    /// The standard pipeline: auth challenge, validation, server,
    /// transport failure, acceptance
    pub(crate) fn standard() -> Self {
        Self {
            classifiers: vec![
                auth_challenge,
                validation_failure,
                server_failure,
                transport_failure,
                acceptance,
            ],
        }
    }

    /// Evaluate classifiers in order until one handles the outcome
    pub(crate) fn classify(&self, request: &ApiRequest, outcome: &TransportOutcome) -> Disposition {
        for classifier in &self.classifiers {
            if let Verdict::Handled(disposition) = classifier(request, outcome) {
                return disposition;
            }
        }
        // The acceptance classifier is total over Ok and transport_failure
        // over Err, so the chain always handles.
        Disposition::Fail(GatewayError::Internal("no classifier handled the outcome".to_string()))
    }
}

fn status_message(request: &ApiRequest, response: &ApiResponse) -> String {
    if response.body().is_empty() {
        format!("{} returned status {}", request.path(), response.status())
    } else {
        format!("{} returned status {}: {}", request.path(), response.status(), response.body())
    }
}

/// 401 means the session is missing or expired: divert and re-authenticate.
/// This classifier owns that status exclusively.
fn auth_challenge(_request: &ApiRequest, outcome: &TransportOutcome) -> Verdict {
    match outcome {
        Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
            Verdict::Handled(Disposition::Divert)
        }
        _ => Verdict::Pass,
    }
}

/// Remaining 4xx are the caller's problem, never buffered or retried
fn validation_failure(request: &ApiRequest, outcome: &TransportOutcome) -> Verdict {
    match outcome {
        Ok(response) if response.status().is_client_error() => {
            // 401 was already short-circuited by auth_challenge.
            Verdict::Handled(Disposition::Fail(GatewayError::Validation(status_message(
                request, response,
            ))))
        }
        _ => Verdict::Pass,
    }
}

fn server_failure(request: &ApiRequest, outcome: &TransportOutcome) -> Verdict {
    match outcome {
        Ok(response) if response.status().is_server_error() => Verdict::Handled(
            Disposition::Fail(GatewayError::Server(status_message(request, response))),
        ),
        _ => Verdict::Pass,
    }
}

fn transport_failure(_request: &ApiRequest, outcome: &TransportOutcome) -> Verdict {
    match outcome {
        Err(TransportError::Timeout(duration)) => {
            Verdict::Handled(Disposition::Fail(GatewayError::Timeout(*duration)))
        }
        Err(err) => Verdict::Handled(Disposition::Fail(GatewayError::Network(err.to_string()))),
        Ok(_) => Verdict::Pass,
    }
}

fn acceptance(request: &ApiRequest, outcome: &TransportOutcome) -> Verdict {
    match outcome {
        Ok(response) if response.status().is_success() => Verdict::Handled(Disposition::Accept),
        Ok(response) => Verdict::Handled(Disposition::Fail(GatewayError::Internal(format!(
            "unexpected status {} from {}",
            response.status(),
            request.path()
        )))),
        Err(_) => Verdict::Pass,
    }
}
