//! Integration tests for the follower monitor.
//!
//! Most tests drive the monitor with an in-memory follower source and a
//! paused Tokio clock; the Helix-backed source is exercised against a
//! wiremock server.
//!
//! Run with: cargo test --test monitor_tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use twitch_helix_rs::monitor::{
    ChannelEventHandler, ChannelLookup, FollowerEvent, FollowerEventHandler, FollowerMonitor,
    FollowerPage, FollowerSource, HelixFollowerSource, MonitorConfig,
};
use twitch_helix_rs::{Environment, Error, FollowerRecord, HelixClient, Result, UserId};

static INIT: Once = Once::new();

const HOUR: Duration = Duration::from_secs(3600);

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn record(id: &str) -> FollowerRecord {
    FollowerRecord {
        user_id: UserId::new(id),
        user_login: id.to_lowercase(),
        user_name: id.to_string(),
        followed_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap(),
    }
}

/// In-memory follower source serving pre-split pages.
///
/// The cursor is the index of the next page. Scripted failures are queued
/// and each fires once, in order, when its page is requested.
#[derive(Default)]
struct ScriptedSource {
    pages: Mutex<Vec<Vec<FollowerRecord>>>,
    failures: Mutex<VecDeque<(usize, Error)>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(pages: &[&[&str]]) -> Arc<Self> {
        let source = Self::default();
        source.set_pages(pages);
        Arc::new(source)
    }

    fn with_delay(pages: &[&[&str]], delay: Duration) -> Arc<Self> {
        let source = Self {
            delay,
            ..Self::default()
        };
        source.set_pages(pages);
        Arc::new(source)
    }

    fn set_pages(&self, pages: &[&[&str]]) {
        *self.pages.lock().unwrap() = pages
            .iter()
            .map(|ids| ids.iter().map(|id| record(id)).collect())
            .collect();
    }

    fn fail_once_on_page(&self, page: usize, error: Error) {
        self.failures.lock().unwrap().push_back((page, error));
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FollowerSource for ScriptedSource {
    async fn fetch_followers(
        &self,
        _channel: &str,
        _page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FollowerPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);

        let failure = {
            let mut failures = self.failures.lock().unwrap();
            if failures.front().is_some_and(|(page, _)| *page == index) {
                failures.pop_front().map(|(_, err)| err)
            } else {
                None
            }
        };
        if let Some(err) = failure {
            return Err(err);
        }

        let pages = self.pages.lock().unwrap();
        Ok(FollowerPage {
            followers: pages.get(index).cloned().unwrap_or_default(),
            cursor: (index + 1 < pages.len()).then(|| (index + 1).to_string()),
        })
    }
}

fn drain(events: &mut UnboundedReceiver<FollowerEvent>) -> Vec<FollowerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn ids(records: &[FollowerRecord]) -> Vec<&str> {
    records.iter().map(|r| r.user_id.as_str()).collect()
}

fn monitor_with(
    source: Arc<ScriptedSource>,
    config: MonitorConfig,
) -> (FollowerMonitor, UnboundedReceiver<FollowerEvent>) {
    init_logging();
    let (handler, events) = ChannelEventHandler::channel();
    (FollowerMonitor::new(source, handler, config), events)
}

// =============================================================================
// Diffing
// =============================================================================

#[tokio::test]
async fn test_reports_new_and_departed_followers() {
    let source = ScriptedSource::new(&[&["A", "B"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor.start("abc", HOUR, 100).await.unwrap();

    let baseline = monitor.poll_once("abc").await.unwrap();
    assert!(baseline.is_empty());
    assert!(drain(&mut events).is_empty());

    source.set_pages(&[&["A", "C"]]);
    let changes = monitor.poll_once("abc").await.unwrap();
    assert_eq!(ids(&changes.added), vec!["C"]);
    assert_eq!(ids(&changes.removed), vec!["B"]);

    let events = drain(&mut events);
    assert_eq!(events.len(), 2);
    match &events[0] {
        FollowerEvent::FollowersAdded {
            channel_id,
            followers,
        } => {
            assert_eq!(channel_id, "abc");
            assert_eq!(ids(followers), vec!["C"]);
        }
        other => panic!("Expected FollowersAdded, got {:?}", other),
    }
    match &events[1] {
        FollowerEvent::FollowersRemoved { followers, .. } => {
            assert_eq!(ids(followers), vec!["B"]);
        }
        other => panic!("Expected FollowersRemoved, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unchanged_followers_emit_nothing() {
    let source = ScriptedSource::new(&[&["A", "B"], &["C"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor.start("abc", HOUR, 2).await.unwrap();

    monitor.poll_once("abc").await.unwrap();
    let changes = monitor.poll_once("abc").await.unwrap();

    assert!(changes.is_empty());
    assert!(drain(&mut events).is_empty());
    assert_eq!(monitor.follower_count("abc").await, Some(3));
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn test_first_poll_can_report_everyone() {
    let source = ScriptedSource::new(&[&["A", "B"]]);
    let config = MonitorConfig::default().with_notify_on_first_poll(true);
    let (monitor, mut events) = monitor_with(source, config);
    monitor.start("abc", HOUR, 100).await.unwrap();

    let changes = monitor.poll_once("abc").await.unwrap();
    assert_eq!(ids(&changes.added), vec!["A", "B"]);

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], FollowerEvent::FollowersAdded { .. }));
}

#[tokio::test]
async fn test_departures_can_be_ignored() {
    let source = ScriptedSource::new(&[&["A", "B"]]);
    let config = MonitorConfig::default().with_track_departures(false);
    let (monitor, mut events) = monitor_with(source.clone(), config);
    monitor.start("abc", HOUR, 100).await.unwrap();

    monitor.poll_once("abc").await.unwrap();
    source.set_pages(&[&["A"]]);
    let changes = monitor.poll_once("abc").await.unwrap();

    assert!(changes.is_empty());
    assert!(drain(&mut events).is_empty());
    assert_eq!(monitor.follower_count("abc").await, Some(1));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_page_keeps_previous_snapshot() {
    let source = ScriptedSource::new(&[&["A"], &["B"], &["C"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor.start("abc", HOUR, 1).await.unwrap();
    monitor.poll_once("abc").await.unwrap();

    source.set_pages(&[&["A"], &["B"], &["D"]]);
    source.fail_once_on_page(
        1,
        Error::Upstream {
            status: 503,
            message: "Service Unavailable".to_string(),
            body: json!({}),
        },
    );

    let err = monitor.poll_once("abc").await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 503, .. }));

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    match &events[0] {
        FollowerEvent::PollFailed {
            channel_id,
            retryable,
            retry_after,
            ..
        } => {
            assert_eq!(channel_id, "abc");
            assert!(*retryable);
            assert!(retry_after.is_none());
        }
        other => panic!("Expected PollFailed, got {:?}", other),
    }

    let followers = monitor.followers("abc").await.unwrap();
    assert!(followers.contains_key(&UserId::new("C")));
    assert!(!followers.contains_key(&UserId::new("D")));
    assert_eq!(monitor.consecutive_failures("abc").await, Some(1));

    // The next successful poll diffs against the last good snapshot
    let changes = monitor.poll_once("abc").await.unwrap();
    assert_eq!(ids(&changes.added), vec!["D"]);
    assert_eq!(ids(&changes.removed), vec!["C"]);
    assert_eq!(monitor.consecutive_failures("abc").await, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_delays_next_poll() {
    let source = ScriptedSource::new(&[&["A"]]);
    source.fail_once_on_page(0, Error::RateLimited { retry_after_secs: 30 });
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor
        .start("abc", Duration::from_secs(5), 100)
        .await
        .unwrap();

    // Tick at 5s is rate limited; the next poll waits until 35s + 5s
    tokio::time::sleep(Duration::from_secs(38)).await;
    assert_eq!(source.calls(), 1);

    let events = drain(&mut events);
    assert!(matches!(
        events.as_slice(),
        [FollowerEvent::PollFailed {
            retry_after: Some(wait),
            ..
        }] if *wait == Duration::from_secs(30)
    ));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(monitor.follower_count("abc").await, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_auth_failures_keep_schedule_running() {
    let source = ScriptedSource::new(&[&["A", "B"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor
        .start("abc", Duration::from_secs(5), 100)
        .await
        .unwrap();
    monitor.poll_once("abc").await.unwrap();

    for _ in 0..2 {
        source.fail_once_on_page(0, Error::Authentication("Invalid OAuth token".to_string()));
    }

    // Ticks at 5s and 10s are rejected
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(monitor.consecutive_failures("abc").await, Some(2));
    assert!(monitor.is_monitoring("abc"));
    assert_eq!(monitor.follower_count("abc").await, Some(2));

    let failures = drain(&mut events);
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .all(|e| matches!(e, FollowerEvent::PollFailed { retryable: false, .. })));

    // Tick at 15s succeeds against the unchanged follower set
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(monitor.consecutive_failures("abc").await, Some(0));
    assert!(drain(&mut events).is_empty());
    assert_eq!(source.calls(), 4);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduled_polls_start_after_one_interval() {
    let source = ScriptedSource::new(&[&["A"]]);
    let (monitor, _events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor
        .start("abc", Duration::from_secs(10), 100)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(source.calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(monitor.follower_count("abc").await, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_no_events_after_stop() {
    let source = ScriptedSource::new(&[&["A"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor
        .start("abc", Duration::from_secs(1), 100)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(source.calls(), 1);

    source.set_pages(&[&["A", "B"]]);
    monitor.stop("abc").await;
    assert!(!monitor.is_monitoring("abc"));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.calls(), 1);
    assert!(drain(&mut events).is_empty());
    assert!(matches!(
        monitor.poll_once("abc").await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_in_flight_poll() {
    let source = ScriptedSource::with_delay(&[&["A"]], Duration::from_secs(5));
    let config = MonitorConfig::default().with_notify_on_first_poll(true);
    let (monitor, mut events) = monitor_with(source.clone(), config);
    monitor
        .start("abc", Duration::from_secs(1), 100)
        .await
        .unwrap();

    // The tick at 1s is now waiting on the slow source
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 1);

    monitor.stop("abc").await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(drain(&mut events).is_empty());
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_schedule() {
    let source = ScriptedSource::new(&[&["A"]]);
    let (monitor, _events) = monitor_with(source.clone(), MonitorConfig::default());

    monitor
        .start("abc", Duration::from_secs(10), 100)
        .await
        .unwrap();
    monitor
        .start("abc", Duration::from_secs(3), 100)
        .await
        .unwrap();

    assert_eq!(monitor.channels(), vec!["abc".to_string()]);
    let state = monitor.state("abc").await.unwrap();
    assert_eq!(state.poll_interval(), Duration::from_secs(3));

    // 3s, 6s and 9s; the replaced 10s schedule never fires
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(source.calls(), 3);
}

struct PanickingHandler;

impl FollowerEventHandler for PanickingHandler {
    fn on_followers_added(&self, _channel_id: &str, _followers: &[FollowerRecord]) {
        panic!("handler failure");
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_after_handler_panic() {
    init_logging();
    let source = ScriptedSource::new(&[&["A"]]);
    let config = MonitorConfig::default().with_notify_on_first_poll(true);
    let monitor = FollowerMonitor::new(source.clone(), PanickingHandler, config);
    monitor
        .start("abc", Duration::from_secs(1), 100)
        .await
        .unwrap();

    // The first tick reports A and the handler takes the poll task down
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(source.calls(), 1);

    monitor.stop("abc").await;
    assert!(!monitor.is_monitoring("abc"));
}

#[tokio::test]
async fn test_restart_keeps_baseline() {
    let source = ScriptedSource::new(&[&["A", "B"]]);
    let (monitor, mut events) = monitor_with(source.clone(), MonitorConfig::default());
    monitor.start("abc", HOUR, 100).await.unwrap();
    monitor.poll_once("abc").await.unwrap();

    monitor.start("abc", HOUR, 50).await.unwrap();
    assert_eq!(monitor.follower_count("abc").await, Some(2));

    source.set_pages(&[&["A", "B", "C"]]);
    let changes = monitor.poll_once("abc").await.unwrap();
    assert_eq!(ids(&changes.added), vec!["C"]);
    assert_eq!(drain(&mut events).len(), 1);
}

#[tokio::test]
async fn test_channels_are_independent() {
    let source = ScriptedSource::new(&[&["A"]]);
    let (monitor, _events) = monitor_with(source, MonitorConfig::default());
    monitor.start("abc", HOUR, 100).await.unwrap();
    monitor.start("xyz", HOUR, 100).await.unwrap();

    monitor.poll_once("abc").await.unwrap();
    assert_eq!(monitor.follower_count("abc").await, Some(1));
    assert_eq!(monitor.follower_count("xyz").await, None);

    monitor.stop_all().await;
    assert!(monitor.channels().is_empty());
}

#[tokio::test]
async fn test_start_default_uses_config() {
    let source = ScriptedSource::new(&[&["A"]]);
    let config = MonitorConfig::default()
        .with_poll_interval(Duration::from_secs(120))
        .with_page_size(25);
    let (monitor, _events) = monitor_with(source, config);

    monitor.start_default("abc").await.unwrap();
    let state = monitor.state("abc").await.unwrap();
    assert_eq!(state.poll_interval(), Duration::from_secs(120));
    assert_eq!(state.page_size(), 25);
}

// =============================================================================
// Helix-backed source
// =============================================================================

fn follow_json(from_id: &str, from_name: &str) -> serde_json::Value {
    json!({
        "from_id": from_id,
        "from_login": from_name.to_lowercase(),
        "from_name": from_name,
        "to_id": "141981764",
        "to_login": "twitchdev",
        "to_name": "TwitchDev",
        "followed_at": "2021-03-10T15:04:21Z"
    })
}

async fn helix_source(server: &MockServer, lookup: ChannelLookup) -> HelixFollowerSource {
    let env = Environment::custom(server.uri(), server.uri());
    let client = HelixClient::from_token("client-id", "access-token", env).unwrap();
    HelixFollowerSource::new(client, lookup)
}

#[tokio::test]
async fn test_helix_source_resolves_login_and_pages() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("login", "twitchdev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "141981764",
                "login": "twitchdev",
                "display_name": "TwitchDev",
                "type": "",
                "broadcaster_type": "partner",
                "description": "",
                "profile_image_url": "",
                "offline_image_url": "",
                "created_at": "2016-12-14T20:32:28Z"
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/follows"))
        .and(query_param("to_id", "141981764"))
        .and(query_param("first", "2"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "data": [follow_json("1", "Alice"), follow_json("2", "Bob")],
            "pagination": { "cursor": "page2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/follows"))
        .and(query_param("to_id", "141981764"))
        .and(query_param("after", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "data": [follow_json("3", "Carol")],
            "pagination": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = helix_source(&server, ChannelLookup::Login).await;
    assert_eq!(source.lookup(), ChannelLookup::Login);

    let (handler, mut events) = ChannelEventHandler::channel();
    let monitor = FollowerMonitor::new(source, handler, MonitorConfig::default());
    monitor.start("twitchdev", HOUR, 2).await.unwrap();

    let changes = monitor.poll_once("twitchdev").await.unwrap();
    assert!(changes.is_empty());
    assert!(drain(&mut events).is_empty());

    let followers = monitor.followers("twitchdev").await.unwrap();
    assert_eq!(followers.len(), 3);
    assert_eq!(followers[&UserId::new("3")].user_name, "Carol");
}

#[tokio::test]
async fn test_helix_source_login_is_case_insensitive() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("login", "twitchdev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "141981764",
                "login": "twitchdev",
                "display_name": "TwitchDev",
                "type": "",
                "broadcaster_type": "partner",
                "created_at": "2016-12-14T20:32:28Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/follows"))
        .and(query_param("to_id", "141981764"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [follow_json("1", "Alice")],
            "pagination": {}
        })))
        .mount(&server)
        .await;

    let source = helix_source(&server, ChannelLookup::Login).await;
    let page = source.fetch_followers("TwitchDev", 100, None).await.unwrap();
    assert_eq!(ids(&page.followers), vec!["1"]);
}

#[tokio::test]
async fn test_helix_source_unknown_login() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let source = helix_source(&server, ChannelLookup::Login).await;
    let (handler, mut events) = ChannelEventHandler::channel();
    let monitor = FollowerMonitor::new(source, handler, MonitorConfig::default());
    monitor.start("ghost", HOUR, 100).await.unwrap();

    let err = monitor.poll_once("ghost").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let events = drain(&mut events);
    assert!(matches!(
        events.as_slice(),
        [FollowerEvent::PollFailed { retryable: false, .. }]
    ));
    assert_eq!(monitor.follower_count("ghost").await, None);
}

#[tokio::test]
async fn test_helix_source_by_id_skips_user_lookup() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/follows"))
        .and(query_param("to_id", "141981764"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [follow_json("1", "Alice")],
            "pagination": {}
        })))
        .mount(&server)
        .await;

    let source = helix_source(&server, ChannelLookup::Id).await;
    let page = source.fetch_followers("141981764", 100, None).await.unwrap();

    assert_eq!(ids(&page.followers), vec!["1"]);
    assert!(page.cursor.is_none());
}
