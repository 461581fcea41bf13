//! Callbacks and events emitted by the follower monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::models::FollowerRecord;
use crate::Error;

/// Receives the results of poll cycles.
///
/// Every method has an empty default, so implementors only override what
/// they need. Methods run on the channel's poll task and should return
/// quickly; hand long work off to another task.
pub trait FollowerEventHandler: Send + Sync {
    /// Followers appeared since the previous poll.
    fn on_followers_added(&self, _channel_id: &str, _followers: &[FollowerRecord]) {}

    /// Followers disappeared since the previous poll. Only called when
    /// departure tracking is enabled.
    fn on_followers_removed(&self, _channel_id: &str, _followers: &[FollowerRecord]) {}

    /// A poll cycle failed. The previous snapshot is kept and the next tick
    /// tries again.
    fn on_poll_error(&self, _channel_id: &str, _error: &Error) {}
}

impl<T: FollowerEventHandler + ?Sized> FollowerEventHandler for Arc<T> {
    fn on_followers_added(&self, channel_id: &str, followers: &[FollowerRecord]) {
        (**self).on_followers_added(channel_id, followers)
    }

    fn on_followers_removed(&self, channel_id: &str, followers: &[FollowerRecord]) {
        (**self).on_followers_removed(channel_id, followers)
    }

    fn on_poll_error(&self, channel_id: &str, error: &Error) {
        (**self).on_poll_error(channel_id, error)
    }
}

/// A handler that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl FollowerEventHandler for NoopHandler {}

/// An owned monitor event, for consumers that prefer a channel over
/// callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowerEvent {
    /// Followers appeared.
    FollowersAdded {
        /// The monitored channel
        channel_id: String,
        /// New followers in fetch order
        followers: Vec<FollowerRecord>,
    },
    /// Followers disappeared.
    FollowersRemoved {
        /// The monitored channel
        channel_id: String,
        /// Departed followers
        followers: Vec<FollowerRecord>,
    },
    /// A poll cycle failed.
    PollFailed {
        /// The monitored channel
        channel_id: String,
        /// Rendered error
        message: String,
        /// Whether the error looked transient
        retryable: bool,
        /// Wait suggested by a rate-limit error
        retry_after: Option<Duration>,
    },
}

impl FollowerEvent {
    /// The channel this event belongs to.
    pub fn channel_id(&self) -> &str {
        match self {
            FollowerEvent::FollowersAdded { channel_id, .. }
            | FollowerEvent::FollowersRemoved { channel_id, .. }
            | FollowerEvent::PollFailed { channel_id, .. } => channel_id,
        }
    }
}

/// Forwards monitor callbacks into an unbounded channel.
///
/// # Example
///
/// ```
/// use twitch_helix_rs::monitor::ChannelEventHandler;
///
/// let (handler, mut events) = ChannelEventHandler::channel();
/// // pass `handler` to FollowerMonitor::new and read `events` elsewhere
/// # drop(handler);
/// # assert!(events.try_recv().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ChannelEventHandler {
    tx: mpsc::UnboundedSender<FollowerEvent>,
}

impl ChannelEventHandler {
    /// Create a handler and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FollowerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: FollowerEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.tx.send(event);
    }
}

impl FollowerEventHandler for ChannelEventHandler {
    fn on_followers_added(&self, channel_id: &str, followers: &[FollowerRecord]) {
        self.send(FollowerEvent::FollowersAdded {
            channel_id: channel_id.to_string(),
            followers: followers.to_vec(),
        });
    }

    fn on_followers_removed(&self, channel_id: &str, followers: &[FollowerRecord]) {
        self.send(FollowerEvent::FollowersRemoved {
            channel_id: channel_id.to_string(),
            followers: followers.to_vec(),
        });
    }

    fn on_poll_error(&self, channel_id: &str, error: &Error) {
        self.send(FollowerEvent::PollFailed {
            channel_id: channel_id.to_string(),
            message: error.to_string(),
            retryable: error.is_retryable(),
            retry_after: error.retry_after(),
        });
    }
}
