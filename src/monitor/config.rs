//! Follower monitor configuration.

use std::time::Duration;

use crate::client::MAX_PAGE_SIZE;

/// Configuration for a [`FollowerMonitor`](super::FollowerMonitor).
///
/// The interval and page size here are used by
/// [`start_default`](super::FollowerMonitor::start_default); explicit
/// [`start`](super::FollowerMonitor::start) calls override them per channel.
///
/// # Example
///
/// ```
/// use twitch_helix_rs::monitor::MonitorConfig;
/// use std::time::Duration;
///
/// let config = MonitorConfig::default()
///     .with_poll_interval(Duration::from_secs(30))
///     .with_track_departures(false);
/// assert_eq!(config.page_size, 100);
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Default time between polls of one channel.
    pub poll_interval: Duration,

    /// Default number of followers requested per page (1-100).
    pub page_size: u32,

    /// Whether to report followers that disappeared since the last poll.
    pub track_departures: bool,

    /// Whether the first poll of a channel reports every current follower
    /// as added.
    ///
    /// Off by default: the first poll only records a baseline so that
    /// starting a monitor does not produce a burst of events.
    pub notify_on_first_poll: bool,

    /// Whether a rate-limited poll delays the next tick by the wait the API
    /// suggested.
    pub respect_rate_limit: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            page_size: MAX_PAGE_SIZE,
            track_departures: true,
            notify_on_first_poll: false,
            respect_rate_limit: true,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the default page size. Values are clamped to 1-100.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Enable or disable departure tracking.
    pub fn with_track_departures(mut self, enabled: bool) -> Self {
        self.track_departures = enabled;
        self
    }

    /// Enable or disable reporting the first snapshot as additions.
    pub fn with_notify_on_first_poll(mut self, enabled: bool) -> Self {
        self.notify_on_first_poll = enabled;
        self
    }

    /// Enable or disable delaying after rate-limit errors.
    pub fn with_respect_rate_limit(mut self, enabled: bool) -> Self {
        self.respect_rate_limit = enabled;
        self
    }
}
