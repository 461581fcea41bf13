//! # twitch-helix-rs
//!
//! An async Rust client for the Twitch Helix API.
//!
//! The crate covers the OAuth token endpoints, channel information,
//! subscriptions, users and follows, plus a [`FollowerMonitor`] that polls a
//! channel's follower list and reports who followed or unfollowed.
//!
//! ## Features
//!
//! - **Authentication**: token refresh, authorization code exchange, token
//!   validation and authorization URLs
//! - **Helix endpoints**: channels, subscriptions, users and follows
//! - **Pagination**: cursor-driven [`PaginatedStream`](client::PaginatedStream)s
//! - **Follower monitoring**: scheduled polling with per-channel state
//! - **Async-first**: built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twitch_helix_rs::{HelixClient, Environment};
//!
//! #[tokio::main]
//! async fn main() -> twitch_helix_rs::Result<()> {
//!     let client = HelixClient::from_token("client-id", "access-token", Environment::Production)?;
//!
//!     let users = client.users().get_by_logins(&["twitchdev"]).await?;
//!     for user in &users {
//!         if let Some(channel) = client.channels().get(&user.id).await? {
//!             println!("{} is playing {}", channel.broadcaster_name, channel.game_name);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Monitoring Followers
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use twitch_helix_rs::{HelixClient, Environment, FollowerMonitor};
//! use twitch_helix_rs::monitor::{ChannelEventHandler, ChannelLookup, HelixFollowerSource, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() -> twitch_helix_rs::Result<()> {
//!     let client = HelixClient::from_token("client-id", "access-token", Environment::Production)?;
//!     let (handler, mut events) = ChannelEventHandler::channel();
//!
//!     let monitor = FollowerMonitor::new(
//!         HelixFollowerSource::new(client, ChannelLookup::Id),
//!         handler,
//!         MonitorConfig::default(),
//!     );
//!     monitor.start("141981764", Duration::from_secs(60), 100).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod monitor;

// Re-export primary types at crate root for convenience
pub use auth::Session;
pub use client::{ClientConfig, HelixClient};
pub use error::{Error, Result};
pub use models::{Environment, FollowerRecord, UserId, UserLogin};
pub use monitor::FollowerMonitor;

/// Prelude module for convenient imports.
///
/// ```rust
/// use twitch_helix_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AuthScope, Session};
    pub use crate::client::{ClientConfig, HelixClient, PaginatedStream};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        Environment, UserId, UserLogin,
        // Enums
        BroadcasterType, SubscriptionTier, UserType,
        // Models
        ChannelInformation, Follow, FollowerRecord, Subscription, User, UserSubscription,
    };
    pub use crate::monitor::{
        FollowerChanges, FollowerEvent, FollowerEventHandler, FollowerMonitor, MonitorConfig,
    };
}
