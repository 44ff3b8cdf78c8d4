//! Error types for the Define system
//!
//! This module defines all error types used throughout the crate.
//!
//! Startup failures (`Config`, `UnknownProvider`) are fatal to the daemon.
//! Everything a [`Source`](crate::Source) returns from a lookup is per-request
//! and recoverable.

use std::fmt;
use thiserror::Error;

/// Result type alias for Define operations
pub type Result<T> = std::result::Result<T, Error>;

/// Raw upstream reply attached to [`Error::InvalidResponse`]
///
/// Kept as plain status and body so the web adapter can render it without
/// knowing which HTTP client the provider uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code returned by the upstream service
    pub status: u16,
    /// Response body as received (possibly truncated by the provider)
    pub body: String,
}

impl UpstreamResponse {
    /// Create a new upstream response snapshot
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl fmt::Display for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.status, self.body)
    }
}

/// Core error type for the Define system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Preferred provider is not among the registered ones
    #[error("Unknown provider {requested:?} (known providers: {known:?})")]
    UnknownProvider {
        /// Requested provider key
        requested: String,
        /// Registered provider keys, sorted
        known: Vec<String>,
    },

    /// Upstream answered with something the provider cannot interpret
    #[error("Invalid upstream response ({0})")]
    InvalidResponse(UpstreamResponse),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// HTTP transport errors (connection, timeout, TLS)
    #[error("HTTP error ({provider}): {message}")]
    Http {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown provider error
    pub fn unknown_provider(requested: impl Into<String>, mut known: Vec<String>) -> Self {
        known.sort();
        Self::UnknownProvider {
            requested: requested.into(),
            known,
        }
    }

    /// Create an invalid upstream response error
    pub fn invalid_response(status: u16, body: impl Into<String>) -> Self {
        Self::InvalidResponse(UpstreamResponse::new(status, body))
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP transport error
    pub fn http(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Raw upstream response, if this is an [`Error::InvalidResponse`]
    pub fn upstream_response(&self) -> Option<&UpstreamResponse> {
        match self {
            Self::InvalidResponse(response) => Some(response),
            _ => None,
        }
    }

    /// Whether this error belongs to the startup (fatal) class
    pub fn is_startup(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnknownProvider { .. })
    }
}
