//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around string identifiers
//! so that user ids, logins and client ids cannot be mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Twitch user id (also used for broadcaster ids).
///
/// # Example
///
/// ```
/// use twitch_helix_rs::UserId;
///
/// let broadcaster = UserId::new("141981764");
/// println!("Broadcaster: {}", broadcaster);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user id from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the user id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A Twitch login name (the lowercase account name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserLogin(String);

impl UserLogin {
    /// Create a new login. Logins are case-insensitive, so the value is
    /// lowercased.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_lowercase())
    }

    /// Get the login as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserLogin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserLogin {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for UserLogin {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Environment configuration for the Helix API.
///
/// Determines which endpoints the client talks to. `Custom` points the
/// client at another host, such as the Twitch CLI mock API or a test server.
///
/// # Example
///
/// ```
/// use twitch_helix_rs::Environment;
///
/// let env = Environment::Production;
/// assert_eq!(env.api_base_url(), "https://api.twitch.tv/helix");
///
/// let mock = Environment::custom("http://localhost:8080/mock", "http://localhost:8080/auth");
/// assert_eq!(mock.auth_base_url(), "http://localhost:8080/auth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    /// The public Twitch endpoints.
    #[default]
    Production,
    /// Caller-supplied base URLs.
    Custom {
        /// Base URL for Helix requests (no trailing slash)
        api_base_url: String,
        /// Base URL for OAuth requests (no trailing slash)
        auth_base_url: String,
    },
}

impl Environment {
    /// Create a custom environment. Trailing slashes are stripped.
    pub fn custom(api_base_url: impl Into<String>, auth_base_url: impl Into<String>) -> Self {
        Environment::Custom {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL for Helix REST requests.
    pub fn api_base_url(&self) -> &str {
        match self {
            Environment::Production => "https://api.twitch.tv/helix",
            Environment::Custom { api_base_url, .. } => api_base_url,
        }
    }

    /// Get the base URL for OAuth requests (`/oauth2/...`).
    pub fn auth_base_url(&self) -> &str {
        match self {
            Environment::Production => "https://id.twitch.tv",
            Environment::Custom { auth_base_url, .. } => auth_base_url,
        }
    }

    /// Returns `true` if this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Custom { api_base_url, .. } => write!(f, "custom({})", api_base_url),
        }
    }
}
