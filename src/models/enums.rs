//! Enumeration types for the Helix API.

use serde::{Deserialize, Serialize};

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionTier {
    /// Tier 1 (also covers Prime subscriptions)
    #[serde(rename = "1000")]
    Tier1,
    /// Tier 2
    #[serde(rename = "2000")]
    Tier2,
    /// Tier 3
    #[serde(rename = "3000")]
    Tier3,
    /// Unknown tier
    #[serde(other)]
    Unknown,
}

impl SubscriptionTier {
    /// Sub points this tier contributes to a broadcaster's total.
    pub fn points(&self) -> u32 {
        match self {
            SubscriptionTier::Tier1 => 1,
            SubscriptionTier::Tier2 => 2,
            SubscriptionTier::Tier3 => 6,
            SubscriptionTier::Unknown => 0,
        }
    }
}

/// Broadcaster program status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BroadcasterType {
    /// Twitch partner
    Partner,
    /// Twitch affiliate
    Affiliate,
    /// Neither partner nor affiliate (sent as an empty string)
    #[default]
    #[serde(rename = "")]
    Normal,
    /// Unknown value
    #[serde(other)]
    Unknown,
}

/// Staff status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Twitch administrator
    Admin,
    /// Global moderator
    GlobalMod,
    /// Twitch staff
    Staff,
    /// Regular user (sent as an empty string)
    #[default]
    #[serde(rename = "")]
    Normal,
    /// Unknown value
    #[serde(other)]
    Unknown,
}
