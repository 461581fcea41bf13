//! Client configuration options.

use std::time::Duration;

/// Configuration for the Helix client.
///
/// # Example
///
/// ```
/// use twitch_helix_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-bot/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Whether to refresh expiring sessions before a request
    pub auto_refresh_session: bool,
    /// Buffer time (in seconds) before expiry to refresh
    pub refresh_buffer_secs: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("twitch-helix-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            auto_refresh_session: true,
            refresh_buffer_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable automatic session refresh.
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh_session = enabled;
        self
    }

    /// Set the buffer time before expiry to refresh.
    pub fn with_refresh_buffer(mut self, secs: i64) -> Self {
        self.refresh_buffer_secs = secs;
        self
    }
}
