//! Client configuration
//!
//! Loads configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is absent, falls back to loading from a file
//! 3. Probes `./config.toml`, `./redline.toml`, and `../config.toml`
//!
//! ## Environment Variables
//! - `REDLINE_BASE_URL`: Server base URL (required for env loading)
//! - `REDLINE_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `REDLINE_TRANSPORT_ATTEMPTS`: Transport attempts (initial + retries)
//! - `REDLINE_RESOLVE_TIMEOUT_SECS`: Credential-resolution timeout in seconds
//! - `REDLINE_USER_AGENT`: User agent presented to the server

use std::path::Path;

use redline_domain::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RESOLVE_TIMEOUT_SECS, DEFAULT_TRANSPORT_ATTEMPTS,
    DEFAULT_USER_AGENT,
};
use redline_domain::{RedlineError, Result};
use serde::Deserialize;
use tracing::{debug, info};

const CONFIG_PROBE_PATHS: &[&str] = &["./config.toml", "./redline.toml", "../config.toml"];

/// Configuration for [`crate::RedlineClient`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server base URL, e.g. `https://review.example.com`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Transport attempts per dispatch (initial try + transient retries)
    pub transport_attempts: usize,
    /// Bound on a credential exchange, login prompt included, in seconds
    pub resolve_timeout_secs: u64,
    /// User agent presented to the server
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            transport_attempts: DEFAULT_TRANSPORT_ATTEMPTS,
            resolve_timeout_secs: DEFAULT_RESOLVE_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration with automatic fallback strategy
    ///
    /// Environment variables win; without `REDLINE_BASE_URL` the probe
    /// paths are tried in order.
    ///
    /// # Errors
    /// Returns [`RedlineError::Config`] if neither source yields a valid
    /// configuration.
    pub fn load() -> Result<Self> {
        match Self::load_from_env() {
            Ok(config) => {
                info!("configuration loaded from environment variables");
                Ok(config)
            }
            Err(e) => {
                debug!(error = ?e, "environment configuration incomplete; trying files");
                Self::load_from_probe_paths()
            }
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns [`RedlineError::Config`] if `REDLINE_BASE_URL` is missing or
    /// any present variable has an invalid value.
    pub fn load_from_env() -> Result<Self> {
        let base_url = std::env::var("REDLINE_BASE_URL")
            .map_err(|_| RedlineError::Config("REDLINE_BASE_URL not set".to_string()))?;

        let defaults = Self::default();
        let config = Self {
            base_url,
            request_timeout_secs: env_parsed(
                "REDLINE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            transport_attempts: env_parsed(
                "REDLINE_TRANSPORT_ATTEMPTS",
                defaults.transport_attempts,
            )?,
            resolve_timeout_secs: env_parsed(
                "REDLINE_RESOLVE_TIMEOUT_SECS",
                defaults.resolve_timeout_secs,
            )?,
            user_agent: std::env::var("REDLINE_USER_AGENT").unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns [`RedlineError::Config`] if the file cannot be read or
    /// parsed, or the result fails validation.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RedlineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            RedlineError::Config(format!("cannot parse {}: {e}", path.display()))
        })?;

        config.validate()?;
        info!(path = %path.display(), "configuration loaded from file");
        Ok(config)
    }

    fn load_from_probe_paths() -> Result<Self> {
        for candidate in CONFIG_PROBE_PATHS {
            if Path::new(candidate).exists() {
                return Self::load_from_file(candidate);
            }
        }
        Err(RedlineError::Config(format!(
            "no configuration found; set REDLINE_BASE_URL or provide one of {CONFIG_PROBE_PATHS:?}"
        )))
    }

    /// Check structural validity
    ///
    /// # Errors
    /// Returns [`RedlineError::Config`] for a malformed base URL, a zero
    /// timeout, or zero transport attempts.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| RedlineError::Config(format!("invalid base URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RedlineError::Config(format!(
                "base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(RedlineError::Config("request timeout must be non-zero".to_string()));
        }
        if self.transport_attempts == 0 {
            return Err(RedlineError::Config("transport attempts must be non-zero".to_string()));
        }
        if self.resolve_timeout_secs == 0 {
            return Err(RedlineError::Config("resolve timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| RedlineError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
