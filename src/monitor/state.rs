//! Per-channel monitor state and snapshot diffing.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{FollowerRecord, UserId};

/// Followers that appeared or disappeared between two polls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowerChanges {
    /// Present in the new snapshot but not the previous one, in fetch order.
    pub added: Vec<FollowerRecord>,
    /// Present in the previous snapshot but not the new one, ordered by id.
    /// Always empty when departure tracking is off.
    pub removed: Vec<FollowerRecord>,
}

impl FollowerChanges {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The complete follower set captured by one successful paginated fetch.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    followers: HashMap<UserId, FollowerRecord>,
    /// Ids in order of first appearance.
    order: Vec<UserId>,
}

impl Snapshot {
    /// Build a snapshot; a repeated id keeps its first position and its
    /// last record.
    pub(crate) fn from_records(records: impl IntoIterator<Item = FollowerRecord>) -> Self {
        let mut followers = HashMap::new();
        let mut order = Vec::new();

        for record in records {
            let id = record.user_id.clone();
            if followers.insert(id.clone(), record).is_none() {
                order.push(id);
            }
        }

        Self { followers, order }
    }

    pub(crate) fn len(&self) -> usize {
        self.followers.len()
    }
}

/// State owned by the poll cycle of one monitored channel.
#[derive(Debug, Clone)]
pub struct MonitorState {
    channel_id: String,
    poll_interval: Duration,
    page_size: u32,
    followers: Option<HashMap<UserId, FollowerRecord>>,
    consecutive_failures: u32,
    last_success_at: Option<DateTime<Utc>>,
}

impl MonitorState {
    pub(crate) fn new(channel_id: impl Into<String>, poll_interval: Duration, page_size: u32) -> Self {
        Self {
            channel_id: channel_id.into(),
            poll_interval,
            page_size,
            followers: None,
            consecutive_failures: 0,
            last_success_at: None,
        }
    }

    /// Carry over the baseline of a replaced schedule.
    pub(crate) fn with_baseline(mut self, baseline: Option<HashMap<UserId, FollowerRecord>>) -> Self {
        self.followers = baseline;
        self
    }

    /// The monitored channel.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Time between scheduled polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Followers requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The last successfully fetched follower set, `None` before the first
    /// successful poll.
    pub fn followers(&self) -> Option<&HashMap<UserId, FollowerRecord>> {
        self.followers.as_ref()
    }

    /// Returns `true` once a baseline has been recorded.
    pub fn has_baseline(&self) -> bool {
        self.followers.is_some()
    }

    /// Failed polls since the last successful one.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// When the last successful poll completed.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.last_success_at
    }

    pub(crate) fn take_baseline(&mut self) -> Option<HashMap<UserId, FollowerRecord>> {
        self.followers.take()
    }

    /// Replace the follower set with `snapshot` and report the difference.
    pub(crate) fn apply(
        &mut self,
        snapshot: Snapshot,
        track_departures: bool,
        notify_on_first_poll: bool,
    ) -> FollowerChanges {
        let changes = match self.followers.as_ref() {
            None if !notify_on_first_poll => FollowerChanges::default(),
            previous => {
                let empty = HashMap::new();
                let previous = previous.unwrap_or(&empty);
                diff(previous, &snapshot, track_departures)
            }
        };

        self.followers = Some(snapshot.followers);
        self.consecutive_failures = 0;
        self.last_success_at = Some(Utc::now());
        changes
    }

    pub(crate) fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}

fn diff(
    previous: &HashMap<UserId, FollowerRecord>,
    current: &Snapshot,
    track_departures: bool,
) -> FollowerChanges {
    let added = current
        .order
        .iter()
        .filter(|id| !previous.contains_key(*id))
        .filter_map(|id| current.followers.get(id).cloned())
        .collect();

    let removed = if track_departures {
        let current_ids: HashSet<&UserId> = current.followers.keys().collect();
        let mut removed: Vec<FollowerRecord> = previous
            .values()
            .filter(|record| !current_ids.contains(&record.user_id))
            .cloned()
            .collect();
        removed.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        removed
    } else {
        Vec::new()
    };

    FollowerChanges { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, name: &str) -> FollowerRecord {
        FollowerRecord {
            user_id: UserId::new(id),
            user_login: name.to_lowercase(),
            user_name: name.to_string(),
            followed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(records: &[FollowerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.user_id.as_str()).collect()
    }

    fn state() -> MonitorState {
        MonitorState::new("abc", Duration::from_secs(60), 100)
    }

    #[test]
    fn test_first_poll_is_baseline() {
        let mut state = state();
        let changes = state.apply(
            Snapshot::from_records(vec![record("1", "A"), record("2", "B")]),
            true,
            false,
        );

        assert!(changes.is_empty());
        assert!(state.has_baseline());
        assert_eq!(state.followers().map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_first_poll_can_notify() {
        let mut state = state();
        let changes = state.apply(
            Snapshot::from_records(vec![record("1", "A"), record("2", "B")]),
            true,
            true,
        );

        assert_eq!(ids(&changes.added), vec!["1", "2"]);
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn test_added_and_removed() {
        let mut state = state();
        state.apply(Snapshot::from_records(vec![record("1", "A"), record("2", "B")]), true, false);

        let changes = state.apply(
            Snapshot::from_records(vec![record("3", "C"), record("1", "A")]),
            true,
            false,
        );

        assert_eq!(ids(&changes.added), vec!["3"]);
        assert_eq!(ids(&changes.removed), vec!["2"]);
    }

    #[test]
    fn test_departures_ignored_when_disabled() {
        let mut state = state();
        state.apply(Snapshot::from_records(vec![record("1", "A"), record("2", "B")]), false, false);

        let changes = state.apply(Snapshot::from_records(vec![record("1", "A")]), false, false);
        assert!(changes.is_empty());
        assert_eq!(state.followers().map(|f| f.len()), Some(1));
    }

    #[test]
    fn test_rename_is_not_a_change() {
        let mut state = state();
        state.apply(Snapshot::from_records(vec![record("1", "Alice")]), true, false);

        let changes = state.apply(Snapshot::from_records(vec![record("1", "Alicia")]), true, false);
        assert!(changes.is_empty());
        assert_eq!(
            state.followers().and_then(|f| f.get(&UserId::new("1"))).map(|r| r.user_name.as_str()),
            Some("Alicia")
        );
    }

    #[test]
    fn test_duplicates_last_write_wins() {
        let snapshot = Snapshot::from_records(vec![
            record("1", "First"),
            record("2", "B"),
            record("1", "Second"),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.order, vec![UserId::new("1"), UserId::new("2")]);
        assert_eq!(snapshot.followers[&UserId::new("1")].user_name, "Second");
    }

    #[test]
    fn test_empty_channel_is_steady_state() {
        let mut state = state();
        assert!(state.apply(Snapshot::default(), true, false).is_empty());
        assert!(state.apply(Snapshot::default(), true, false).is_empty());
        assert!(state.has_baseline());
    }

    #[test]
    fn test_failures_reset_on_success() {
        let mut state = state();
        state.record_failure();
        state.record_failure();
        assert_eq!(state.consecutive_failures(), 2);
        assert!(state.followers().is_none());

        state.apply(Snapshot::default(), true, false);
        assert_eq!(state.consecutive_failures(), 0);
        assert!(state.last_success_at().is_some());
    }
}
