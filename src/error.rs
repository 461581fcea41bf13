//! Error types for the Helix API client.
//!
//! This module provides a single error type covering every failure mode of
//! the client and the follower monitor, from transport errors to rejected
//! credentials and rate limiting.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Seconds to wait when a 429 response carries no usable reset header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A specialized `Result` type for Helix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all Helix API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Upstream error: status={status}, message={message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Human-readable error message
        message: String,
        /// Raw response body for debugging
        body: Value,
    },

    /// Credentials were rejected (invalid or expired token, failed exchange)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The access token expired and the session holds nothing to refresh it with
    #[error("Session expired; refresh required")]
    SessionExpired,

    /// Invalid parameters were passed to a call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rate limited by the API
    #[error("Rate limited; retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Number of seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The operation was cancelled because its channel stopped being monitored
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    ///
    /// # Example
    ///
    /// ```
    /// use twitch_helix_rs::Error;
    ///
    /// fn handle_error(err: Error) {
    ///     if err.is_retryable() {
    ///         println!("Retrying on the next tick...");
    ///     }
    /// }
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } => true,
            Error::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::SessionExpired)
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Upstream { status, .. } => *status >= 400 && *status < 500,
            Error::InvalidArgument(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The wait suggested by the API when this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }

    /// Build a rate-limit error from the `Ratelimit-Reset` header, the epoch
    /// second at which the bucket refills. Falls back to 60 seconds.
    pub(crate) fn from_rate_limit_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after_secs = headers
            .get("ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .map(|reset| (reset - chrono::Utc::now().timestamp()).max(1) as u64)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        Error::RateLimited { retry_after_secs }
    }

    /// Create an upstream error from a Helix error body.
    ///
    /// Helix errors look like
    /// `{"error": "Bad Request", "status": 400, "message": "..."}`.
    pub(crate) fn from_upstream_response(status: u16, body: Value) -> Self {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .or_else(|| body.get("error").and_then(|e| e.as_str()))
            .unwrap_or("Unknown API error")
            .to_string();

        Error::Upstream {
            status,
            message,
            body,
        }
    }
}
