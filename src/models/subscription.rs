//! Subscription models.

use serde::{Deserialize, Serialize};

use super::enums::SubscriptionTier;
use super::primitives::UserId;

/// A subscription to a broadcaster (`GET /subscriptions`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Broadcaster's user id
    pub broadcaster_id: UserId,
    /// Broadcaster's login name
    pub broadcaster_login: String,
    /// Broadcaster's display name
    pub broadcaster_name: String,
    /// Id of the user who gifted the subscription (empty when not a gift)
    #[serde(default)]
    pub gifter_id: String,
    /// Login of the gifting user
    #[serde(default)]
    pub gifter_login: String,
    /// Display name of the gifting user
    #[serde(default)]
    pub gifter_name: String,
    /// Whether the subscription was gifted
    pub is_gift: bool,
    /// Name of the subscription plan
    #[serde(default)]
    pub plan_name: String,
    /// Subscription tier
    pub tier: SubscriptionTier,
    /// Subscriber's user id
    pub user_id: UserId,
    /// Subscriber's login name
    pub user_login: String,
    /// Subscriber's display name
    pub user_name: String,
}

/// A user's subscription as seen by that user (`GET /subscriptions/user`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSubscription {
    /// Broadcaster's user id
    pub broadcaster_id: UserId,
    /// Broadcaster's login name
    pub broadcaster_login: String,
    /// Broadcaster's display name
    pub broadcaster_name: String,
    /// Whether the subscription was gifted
    pub is_gift: bool,
    /// Login of the gifting user, present only for gifts
    #[serde(default)]
    pub gifter_login: Option<String>,
    /// Display name of the gifting user, present only for gifts
    #[serde(default)]
    pub gifter_name: Option<String>,
    /// Subscription tier
    pub tier: SubscriptionTier,
}

/// One page of a broadcaster's subscriber list.
#[derive(Debug, Clone)]
pub struct BroadcasterSubscriptions {
    /// Subscriptions on this page
    pub subscriptions: Vec<Subscription>,
    /// Cursor for the next page, `None` on the last page
    pub cursor: Option<String>,
    /// Total number of subscriptions to the broadcaster
    pub total: Option<u64>,
    /// Sub points the broadcaster currently has
    pub points: Option<u64>,
}
