//! Follower monitor example.
//!
//! Polls one or more channels (by login) and prints followers as they come
//! and go. Press Ctrl+C to stop.
//!
//! Run with: cargo run --example follower_monitor -- twitchdev lirik

use std::time::Duration;

use twitch_helix_rs::monitor::{
    ChannelEventHandler, ChannelLookup, FollowerEvent, FollowerMonitor, HelixFollowerSource,
    MonitorConfig,
};
use twitch_helix_rs::{Environment, HelixClient};

#[tokio::main]
async fn main() -> twitch_helix_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Get credentials from environment variables
    let client_id = std::env::var("TWITCH_CLIENT_ID")
        .expect("TWITCH_CLIENT_ID environment variable required");
    let client_secret = std::env::var("TWITCH_CLIENT_SECRET")
        .expect("TWITCH_CLIENT_SECRET environment variable required");
    let refresh_token = std::env::var("TWITCH_REFRESH_TOKEN")
        .expect("TWITCH_REFRESH_TOKEN environment variable required");

    let mut channels: Vec<String> = std::env::args().skip(1).collect();
    if channels.is_empty() {
        channels.push("twitchdev".to_string());
    }

    let client = HelixClient::from_refresh_token(
        client_id,
        client_secret,
        refresh_token,
        Environment::Production,
    )
    .await?;

    let (handler, mut events) = ChannelEventHandler::channel();
    let config = MonitorConfig::default().with_poll_interval(Duration::from_secs(30));
    let monitor = FollowerMonitor::new(
        HelixFollowerSource::new(client, ChannelLookup::Login),
        handler,
        config,
    );

    for channel in &channels {
        monitor.start_default(channel).await?;
        // Record the baseline right away instead of waiting a full interval
        if let Err(e) = monitor.poll_once(channel).await {
            println!("{}: initial poll failed: {}", channel, e);
        }
        println!(
            "Watching {} ({} followers)",
            channel,
            monitor.follower_count(channel).await.unwrap_or(0)
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    FollowerEvent::FollowersAdded { channel_id, followers } => {
                        for follower in followers {
                            println!("[{}] + {}", channel_id, follower.user_name);
                        }
                    }
                    FollowerEvent::FollowersRemoved { channel_id, followers } => {
                        for follower in followers {
                            println!("[{}] - {}", channel_id, follower.user_name);
                        }
                    }
                    FollowerEvent::PollFailed { channel_id, message, .. } => {
                        println!("[{}] poll failed: {}", channel_id, message);
                    }
                }
            }
        }
    }

    monitor.stop_all().await;
    println!("\nStopped.");
    Ok(())
}
