//! Follower change monitoring.
//!
//! Helix has no "new followers since" query, so the monitor polls the full
//! follower list of each channel on a timer and diffs it against the
//! previous snapshot.
//!
//! - Each channel gets its own poll task; its cycles never overlap.
//! - The first successful poll records a baseline and reports nothing
//!   (unless [`MonitorConfig::notify_on_first_poll`] is set).
//! - A failed poll leaves the previous snapshot untouched and is reported
//!   through [`FollowerEventHandler::on_poll_error`]; the next tick retries.
//! - After [`FollowerMonitor::stop`] returns, no further callback fires for
//!   that channel.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use twitch_helix_rs::{HelixClient, Environment};
//! use twitch_helix_rs::monitor::{
//!     ChannelEventHandler, ChannelLookup, FollowerEvent, FollowerMonitor, HelixFollowerSource,
//!     MonitorConfig,
//! };
//!
//! # async fn example() -> twitch_helix_rs::Result<()> {
//! let client = HelixClient::from_token("client-id", "access-token", Environment::Production)?;
//! let (handler, mut events) = ChannelEventHandler::channel();
//!
//! let monitor = FollowerMonitor::new(
//!     HelixFollowerSource::new(client, ChannelLookup::Login),
//!     handler,
//!     MonitorConfig::default(),
//! );
//! monitor.start("twitchdev", Duration::from_secs(60), 100).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let FollowerEvent::FollowersAdded { followers, .. } = event {
//!         for follower in followers {
//!             println!("New follower: {}", follower.user_name);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod source;
mod state;

pub use config::MonitorConfig;
pub use events::{ChannelEventHandler, FollowerEvent, FollowerEventHandler, NoopHandler};
pub use source::{ChannelLookup, FollowerPage, FollowerSource, HelixFollowerSource};
pub use state::{FollowerChanges, MonitorState};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::MAX_PAGE_SIZE;
use crate::models::{FollowerRecord, UserId};
use crate::{Error, Result};

use state::Snapshot;

/// Polls follower lists and reports changes.
///
/// The monitor owns one poll task per started channel. Dropping the monitor
/// cancels all of them.
pub struct FollowerMonitor {
    shared: Arc<Shared>,
    channels: Mutex<HashMap<String, ChannelEntry>>,
}

/// Collaborators shared by every channel's poll task.
struct Shared {
    source: Box<dyn FollowerSource>,
    handler: Box<dyn FollowerEventHandler>,
    config: MonitorConfig,
}

/// What a running channel's task and manual polls share.
struct ChannelHandle {
    state: tokio::sync::Mutex<MonitorState>,
    cancel: CancellationToken,
}

struct ChannelEntry {
    handle: Arc<ChannelHandle>,
    task: JoinHandle<()>,
}

impl ChannelEntry {
    /// Cancel the poll task and wait until nothing can emit for this channel.
    async fn shutdown(self) -> Arc<ChannelHandle> {
        self.handle.cancel.cancel();
        self.task.abort();
        if let Err(err) = self.task.await {
            if err.is_panic() {
                tracing::warn!("Follower poll task panicked before shutdown: {}", err);
            }
        }

        // A manual poll_once may still hold the state; it observes the
        // cancellation and releases without emitting.
        drop(self.handle.state.lock().await);
        self.handle
    }
}

impl FollowerMonitor {
    /// Create a monitor over a follower source and an event handler.
    pub fn new(
        source: impl FollowerSource + 'static,
        handler: impl FollowerEventHandler + 'static,
        config: MonitorConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source: Box::new(source),
                handler: Box::new(handler),
                config,
            }),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// The monitor's configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, ChannelEntry>> {
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start polling `channel_id` every `poll_interval`, fetching
    /// `page_size` followers per request.
    ///
    /// The first scheduled poll runs one interval after this call. Starting
    /// a channel that is already monitored replaces its schedule; the
    /// existing baseline is kept so the restart does not re-baseline.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `channel_id` is blank, `poll_interval`
    /// is zero, or `page_size` is outside 1-100.
    pub async fn start(
        &self,
        channel_id: &str,
        poll_interval: Duration,
        page_size: u32,
    ) -> Result<()> {
        if channel_id.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "channel_id must not be empty".to_string(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(Error::InvalidArgument(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidArgument(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        let previous = self.entries().remove(channel_id);
        let baseline = match previous {
            Some(entry) => {
                let handle = entry.shutdown().await;
                let mut state = handle.state.lock().await;
                state.take_baseline()
            }
            None => None,
        };

        let handle = Arc::new(ChannelHandle {
            state: tokio::sync::Mutex::new(
                MonitorState::new(channel_id, poll_interval, page_size).with_baseline(baseline),
            ),
            cancel: CancellationToken::new(),
        });

        let task = tokio::spawn(run_schedule(
            self.shared.clone(),
            handle.clone(),
            poll_interval,
        ));

        let displaced = self
            .entries()
            .insert(channel_id.to_string(), ChannelEntry { handle, task });
        if let Some(entry) = displaced {
            // A concurrent start for the same channel won the race for the slot
            entry.shutdown().await;
        }

        tracing::info!(
            channel = channel_id,
            interval_secs = poll_interval.as_secs_f64(),
            page_size,
            "Follower monitor started"
        );
        Ok(())
    }

    /// Start polling `channel_id` with the configured interval and page size.
    pub async fn start_default(&self, channel_id: &str) -> Result<()> {
        let config = &self.shared.config;
        self.start(channel_id, config.poll_interval, config.page_size)
            .await
    }

    /// Stop polling `channel_id` and discard its state.
    ///
    /// Any in-flight fetch is cancelled. Once this returns, no callback fires
    /// for the channel. Does nothing if the channel is not monitored.
    pub async fn stop(&self, channel_id: &str) {
        let entry = self.entries().remove(channel_id);
        if let Some(entry) = entry {
            entry.shutdown().await;
            tracing::info!(channel = channel_id, "Follower monitor stopped");
        }
    }

    /// Stop every monitored channel.
    pub async fn stop_all(&self) {
        let entries: Vec<(String, ChannelEntry)> = self.entries().drain().collect();
        for (channel_id, entry) in entries {
            entry.shutdown().await;
            tracing::info!(channel = %channel_id, "Follower monitor stopped");
        }
    }

    /// Run one fetch-and-diff cycle for a monitored channel now.
    ///
    /// The cycle queues behind a scheduled poll that is already running and
    /// fires the same callbacks a scheduled poll would.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the channel is not monitored,
    /// [`Error::Cancelled`] if it is stopped while the poll runs, or the
    /// fetch error that aborted the cycle (also passed to
    /// [`FollowerEventHandler::on_poll_error`]).
    pub async fn poll_once(&self, channel_id: &str) -> Result<FollowerChanges> {
        let handle = self.handle(channel_id).ok_or_else(|| {
            Error::InvalidArgument(format!("Channel '{}' is not monitored", channel_id))
        })?;
        run_poll_cycle(&self.shared, &handle).await
    }

    fn handle(&self, channel_id: &str) -> Option<Arc<ChannelHandle>> {
        self.entries()
            .get(channel_id)
            .map(|entry| entry.handle.clone())
    }

    /// Returns `true` if `channel_id` is being monitored.
    pub fn is_monitoring(&self, channel_id: &str) -> bool {
        self.entries().contains_key(channel_id)
    }

    /// All monitored channels.
    pub fn channels(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    /// A copy of a channel's state, waiting for a running poll to finish.
    pub async fn state(&self, channel_id: &str) -> Option<MonitorState> {
        let handle = self.handle(channel_id)?;
        let state = handle.state.lock().await;
        Some(state.clone())
    }

    /// A copy of the last known follower set of a channel.
    pub async fn followers(&self, channel_id: &str) -> Option<HashMap<UserId, FollowerRecord>> {
        self.state(channel_id).await?.followers().cloned()
    }

    /// Number of known followers of a channel, `None` before a baseline
    /// exists.
    pub async fn follower_count(&self, channel_id: &str) -> Option<usize> {
        let handle = self.handle(channel_id)?;
        let state = handle.state.lock().await;
        state.followers().map(HashMap::len)
    }

    /// Failed polls of a channel since its last successful one.
    pub async fn consecutive_failures(&self, channel_id: &str) -> Option<u32> {
        let handle = self.handle(channel_id)?;
        let state = handle.state.lock().await;
        Some(state.consecutive_failures())
    }
}

impl Drop for FollowerMonitor {
    fn drop(&mut self) {
        for entry in self.entries().values() {
            entry.handle.cancel.cancel();
            entry.task.abort();
        }
    }
}

impl std::fmt::Debug for FollowerMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowerMonitor")
            .field("config", &self.shared.config)
            .field("channels", &self.channels())
            .finish()
    }
}

/// Drive the scheduled polls of one channel until it is cancelled.
async fn run_schedule(shared: Arc<Shared>, handle: Arc<ChannelHandle>, poll_interval: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = handle.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match run_poll_cycle(&shared, &handle).await {
            Err(Error::Cancelled) => break,
            Err(Error::RateLimited { retry_after_secs }) if shared.config.respect_rate_limit => {
                let wait = Duration::from_secs(retry_after_secs);
                tokio::select! {
                    _ = handle.cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
                ticker.reset();
            }
            // Everything else was already reported by the cycle
            _ => {}
        }
    }

    tracing::debug!("Follower poll loop exited");
}

/// One fetch-and-diff cycle. Holds the channel state for the whole cycle,
/// which is what keeps cycles of one channel sequential.
async fn run_poll_cycle(shared: &Shared, handle: &ChannelHandle) -> Result<FollowerChanges> {
    let mut state = handle.state.lock().await;
    if handle.cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let channel_id = state.channel_id().to_string();
    let page_size = state.page_size();

    let fetched = tokio::select! {
        _ = handle.cancel.cancelled() => return Err(Error::Cancelled),
        result = fetch_snapshot(shared.source.as_ref(), &channel_id, page_size) => result,
    };

    match fetched {
        Ok(snapshot) => {
            let count = snapshot.len();
            let changes = state.apply(
                snapshot,
                shared.config.track_departures,
                shared.config.notify_on_first_poll,
            );

            tracing::debug!(
                channel = %channel_id,
                followers = count,
                added = changes.added.len(),
                removed = changes.removed.len(),
                "Follower poll completed"
            );

            if !changes.added.is_empty() {
                shared.handler.on_followers_added(&channel_id, &changes.added);
            }
            if !changes.removed.is_empty() {
                shared.handler.on_followers_removed(&channel_id, &changes.removed);
            }
            Ok(changes)
        }
        Err(err) => {
            state.record_failure();
            tracing::warn!(
                channel = %channel_id,
                consecutive_failures = state.consecutive_failures(),
                error = %err,
                "Follower poll failed"
            );
            shared.handler.on_poll_error(&channel_id, &err);
            Err(err)
        }
    }
}

/// Page through the source until the cursor runs out.
async fn fetch_snapshot(
    source: &dyn FollowerSource,
    channel_id: &str,
    page_size: u32,
) -> Result<Snapshot> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .fetch_followers(channel_id, page_size, cursor.as_deref())
            .await?;
        let page_was_empty = page.followers.is_empty();
        records.extend(page.followers);

        match page.cursor.filter(|c| !c.is_empty()) {
            // Helix can hand out a cursor alongside an empty last page
            Some(_) if page_was_empty => break,
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(Snapshot::from_records(records))
}
