//! Subscriptions service.

use std::sync::Arc;

use crate::auth::require_non_blank;
use crate::client::paginated::PaginatedStreamBuilder;
use crate::client::{ClientInner, HelixPage, PaginatedStream};
use crate::models::{BroadcasterSubscriptions, Subscription, UserSubscription};
use crate::{Error, Result};

use super::{check_id_list, check_page_size};

/// Service for subscription queries.
///
/// Broadcaster-side queries need a token with `channel:read:subscriptions`;
/// [`check_user_subscription`](Self::check_user_subscription) needs a user
/// token with `user:read:subscriptions`.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: twitch_helix_rs::HelixClient) -> twitch_helix_rs::Result<()> {
/// let page = client
///     .subscriptions()
///     .get_broadcaster_subscriptions("141981764", 100, None)
///     .await?;
/// println!("{:?} subscribers, {:?} points", page.total, page.points);
/// # Ok(())
/// # }
/// ```
pub struct SubscriptionsService {
    inner: Arc<ClientInner>,
}

impl SubscriptionsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Check whether a user subscribes to a broadcaster.
    ///
    /// Returns `None` when the user is not subscribed.
    pub async fn check_user_subscription(
        &self,
        broadcaster_id: &str,
        user_id: &str,
    ) -> Result<Option<UserSubscription>> {
        require_non_blank(broadcaster_id, "broadcaster id")?;
        require_non_blank(user_id, "user id")?;

        let query = [("broadcaster_id", broadcaster_id), ("user_id", user_id)];
        let result: Result<HelixPage<UserSubscription>> = self
            .inner
            .get_with_query("/subscriptions/user", &query)
            .await;

        match result {
            Ok(page) => Ok(page.data.into_iter().next()),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the subscriptions of specific users to a broadcaster.
    ///
    /// Users who are not subscribed are left out of the result.
    pub async fn get_user_subscriptions<S: AsRef<str>>(
        &self,
        broadcaster_id: &str,
        user_ids: &[S],
    ) -> Result<Vec<Subscription>> {
        require_non_blank(broadcaster_id, "broadcaster id")?;
        check_id_list(user_ids, "user_ids")?;

        let mut query = vec![("broadcaster_id", broadcaster_id)];
        query.extend(user_ids.iter().map(|id| ("user_id", id.as_ref())));

        let page: HelixPage<Subscription> = self
            .inner
            .get_with_query("/subscriptions", query.as_slice())
            .await?;
        Ok(page.data)
    }

    /// Get one page of a broadcaster's subscribers.
    ///
    /// `first` must be between 1 and 100. Pass the previous page's cursor as
    /// `after` to continue.
    pub async fn get_broadcaster_subscriptions(
        &self,
        broadcaster_id: &str,
        first: u32,
        after: Option<&str>,
    ) -> Result<BroadcasterSubscriptions> {
        require_non_blank(broadcaster_id, "broadcaster id")?;
        check_page_size(first)?;

        let mut query = vec![
            ("broadcaster_id", broadcaster_id.to_string()),
            ("first", first.to_string()),
        ];
        if let Some(after) = after.filter(|a| !a.trim().is_empty()) {
            query.push(("after", after.to_string()));
        }

        let page: HelixPage<Subscription> = self
            .inner
            .get_with_query("/subscriptions", query.as_slice())
            .await?;

        let total = page.total;
        let points = page.points;
        let (subscriptions, cursor) = page.into_parts();

        Ok(BroadcasterSubscriptions {
            subscriptions,
            cursor,
            total,
            points,
        })
    }

    /// Stream all of a broadcaster's subscribers, fetching `first` per page.
    pub fn broadcaster_subscriptions_stream(
        &self,
        broadcaster_id: &str,
        first: u32,
    ) -> Result<PaginatedStream<Subscription>> {
        require_non_blank(broadcaster_id, "broadcaster id")?;
        check_page_size(first)?;

        Ok(PaginatedStreamBuilder::new(self.inner.clone(), "/subscriptions")
            .first(first)
            .build_with_query(vec![("broadcaster_id", broadcaster_id.to_string())]))
    }
}
