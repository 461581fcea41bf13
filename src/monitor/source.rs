//! Where the monitor gets follower pages from.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::FollowsQuery;
use crate::models::{FollowerRecord, UserLogin};
use crate::{Error, HelixClient, Result};

/// One page of followers returned by a [`FollowerSource`].
#[derive(Debug, Clone, Default)]
pub struct FollowerPage {
    /// Followers on this page.
    pub followers: Vec<FollowerRecord>,
    /// Continuation token for the next page; `None` on the last page.
    pub cursor: Option<String>,
}

/// A paged "followers of channel X" query.
///
/// The monitor only needs this one capability from the API client, which
/// keeps it testable without a network.
#[async_trait]
pub trait FollowerSource: Send + Sync {
    /// Fetch one page of `channel`'s followers, starting at `cursor`.
    async fn fetch_followers(
        &self,
        channel: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FollowerPage>;
}

#[async_trait]
impl<T: FollowerSource + ?Sized> FollowerSource for Arc<T> {
    async fn fetch_followers(
        &self,
        channel: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FollowerPage> {
        (**self).fetch_followers(channel, page_size, cursor).await
    }
}

/// How a channel reference given to the monitor is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLookup {
    /// The reference is a broadcaster user id.
    #[default]
    Id,
    /// The reference is a login name, resolved to an id on every fetch.
    /// Matching is case-insensitive.
    Login,
}

/// [`FollowerSource`] backed by the Helix follows endpoint.
///
/// # Example
///
/// ```no_run
/// use twitch_helix_rs::monitor::{ChannelLookup, HelixFollowerSource};
///
/// # fn example(client: twitch_helix_rs::HelixClient) {
/// let by_login = HelixFollowerSource::new(client, ChannelLookup::Login);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HelixFollowerSource {
    client: HelixClient,
    lookup: ChannelLookup,
}

impl HelixFollowerSource {
    /// Create a source with the given lookup strategy.
    pub fn new(client: HelixClient, lookup: ChannelLookup) -> Self {
        Self { client, lookup }
    }

    /// The lookup strategy in use.
    pub fn lookup(&self) -> ChannelLookup {
        self.lookup
    }

    async fn resolve_channel_id(&self, channel: &str) -> Result<String> {
        match self.lookup {
            ChannelLookup::Id => Ok(channel.to_string()),
            ChannelLookup::Login => {
                let login = UserLogin::new(channel);
                let users = self.client.users().get_by_logins(&[&login]).await?;
                users
                    .into_iter()
                    .next()
                    .map(|user| user.id.as_str().to_string())
                    .ok_or_else(|| Error::NotFound(format!("No user with login '{}'", channel)))
            }
        }
    }
}

#[async_trait]
impl FollowerSource for HelixFollowerSource {
    async fn fetch_followers(
        &self,
        channel: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FollowerPage> {
        let to_id = self.resolve_channel_id(channel).await?;

        let mut query = FollowsQuery::to(to_id).first(page_size);
        if let Some(cursor) = cursor {
            query = query.after(cursor);
        }

        let page = self.client.users().get_follows(&query).await?;
        Ok(FollowerPage {
            followers: page.follows.into_iter().map(FollowerRecord::from).collect(),
            cursor: page.cursor,
        })
    }
}
