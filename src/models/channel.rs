//! Channel metadata models.

use serde::{Deserialize, Serialize};

use super::primitives::UserId;

/// Information about a broadcaster's channel (`GET /channels`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInformation {
    /// Broadcaster's user id
    pub broadcaster_id: UserId,
    /// Broadcaster's login name
    pub broadcaster_login: String,
    /// Broadcaster's display name
    pub broadcaster_name: String,
    /// ISO 639-1 language code of the channel, or "other"
    pub broadcaster_language: String,
    /// Id of the game being played (empty when unset)
    pub game_id: String,
    /// Name of the game being played (empty when unset)
    pub game_name: String,
    /// Stream title
    pub title: String,
    /// Stream delay in seconds (only visible to the broadcaster)
    #[serde(default)]
    pub delay: i32,
    /// Tags applied to the channel
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ChannelInformation {
    /// Returns `true` if a category is set on the channel.
    pub fn has_game(&self) -> bool {
        !self.game_id.is_empty()
    }
}
