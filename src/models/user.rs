//! User and follow models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{BroadcasterType, UserType};
use super::primitives::{UserId, UserLogin};

/// A Twitch user (`GET /users`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,
    /// Login name
    pub login: UserLogin,
    /// Display name
    pub display_name: String,
    /// Staff status
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    /// Broadcaster program status
    #[serde(default)]
    pub broadcaster_type: BroadcasterType,
    /// Channel description
    #[serde(default)]
    pub description: String,
    /// URL of the profile image
    #[serde(default)]
    pub profile_image_url: String,
    /// URL of the offline image
    #[serde(default)]
    pub offline_image_url: String,
    /// Email address, only with the `user:read:email` scope
    #[serde(default)]
    pub email: Option<String>,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

/// A follow relationship (`GET /users/follows`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    /// Id of the following user
    pub from_id: UserId,
    /// Login of the following user
    #[serde(default)]
    pub from_login: String,
    /// Display name of the following user
    pub from_name: String,
    /// Id of the followed user
    pub to_id: UserId,
    /// Login of the followed user
    #[serde(default)]
    pub to_login: String,
    /// Display name of the followed user
    pub to_name: String,
    /// When the follow was established
    pub followed_at: DateTime<Utc>,
}

/// One page of follow relationships.
#[derive(Debug, Clone)]
pub struct FollowsPage {
    /// Follows on this page
    pub follows: Vec<Follow>,
    /// Cursor for the next page, `None` on the last page
    pub cursor: Option<String>,
    /// Total number of follows matching the query
    pub total: Option<u64>,
}

/// A follower of a monitored channel.
///
/// Identity is the account id only; two records with the same `user_id` but
/// different display names describe the same follower.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowerRecord {
    /// Follower's account id
    pub user_id: UserId,
    /// Follower's login name
    pub user_login: String,
    /// Follower's display name
    pub user_name: String,
    /// When the follow was established
    pub followed_at: DateTime<Utc>,
}

impl From<Follow> for FollowerRecord {
    fn from(follow: Follow) -> Self {
        Self {
            user_id: follow.from_id,
            user_login: follow.from_login,
            user_name: follow.from_name,
            followed_at: follow.followed_at,
        }
    }
}
