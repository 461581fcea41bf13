//! Users service for user lookups and follow relationships.

use std::sync::Arc;

use crate::auth::require_non_blank;
use crate::client::paginated::PaginatedStreamBuilder;
use crate::client::{ClientInner, HelixPage, PaginatedStream};
use crate::models::{Follow, FollowsPage, User};
use crate::{Error, Result};

use super::{check_id_list, check_page_size};

/// Service for users and follows.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: twitch_helix_rs::HelixClient) -> twitch_helix_rs::Result<()> {
/// use twitch_helix_rs::api::FollowsQuery;
///
/// let users = client.users().get_by_logins(&["twitchdev"]).await?;
/// let follows = client
///     .users()
///     .get_follows(&FollowsQuery::to(users[0].id.as_str()).first(100))
///     .await?;
/// println!("{:?} followers", follows.total);
/// # Ok(())
/// # }
/// ```
pub struct UsersService {
    inner: Arc<ClientInner>,
}

/// Query for `GET /users/follows`.
///
/// At least one of `from_id` or `to_id` is required.
#[derive(Debug, Clone, Default)]
pub struct FollowsQuery {
    /// Only follows made by this user
    pub from_id: Option<String>,
    /// Only follows of this user
    pub to_id: Option<String>,
    /// Page size (1-100)
    pub first: Option<u32>,
    /// Cursor of the page to fetch
    pub after: Option<String>,
}

impl FollowsQuery {
    /// Follows made by `from_id`.
    pub fn from(from_id: impl Into<String>) -> Self {
        Self {
            from_id: Some(from_id.into()),
            ..Default::default()
        }
    }

    /// Followers of `to_id`.
    pub fn to(to_id: impl Into<String>) -> Self {
        Self {
            to_id: Some(to_id.into()),
            ..Default::default()
        }
    }

    /// Set the page size.
    pub fn first(mut self, first: u32) -> Self {
        self.first = Some(first);
        self
    }

    /// Continue after the given cursor.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    fn validate(&self) -> Result<()> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.from_id) && !present(&self.to_id) {
            return Err(Error::InvalidArgument(
                "Either from_id or to_id must be set".to_string(),
            ));
        }
        if let Some(first) = self.first {
            check_page_size(first)?;
        }
        Ok(())
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref from_id) = self.from_id {
            pairs.push(("from_id", from_id.clone()));
        }
        if let Some(ref to_id) = self.to_id {
            pairs.push(("to_id", to_id.clone()));
        }
        if let Some(first) = self.first {
            pairs.push(("first", first.to_string()));
        }
        if let Some(ref after) = self.after {
            pairs.push(("after", after.clone()));
        }
        pairs
    }
}

impl UsersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Look up users by id (1-100 ids).
    pub async fn get_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<User>> {
        check_id_list(ids, "ids")?;
        self.get_users("id", ids).await
    }

    /// Look up users by login name (1-100 logins).
    pub async fn get_by_logins<S: AsRef<str>>(&self, logins: &[S]) -> Result<Vec<User>> {
        check_id_list(logins, "logins")?;
        self.get_users("login", logins).await
    }

    async fn get_users<S: AsRef<str>>(&self, key: &'static str, values: &[S]) -> Result<Vec<User>> {
        let query: Vec<(&str, &str)> = values.iter().map(|v| (key, v.as_ref())).collect();
        let page: HelixPage<User> = self.inner.get_with_query("/users", query.as_slice()).await?;
        Ok(page.data)
    }

    /// Get one page of follow relationships.
    pub async fn get_follows(&self, query: &FollowsQuery) -> Result<FollowsPage> {
        query.validate()?;

        let page: HelixPage<Follow> = self
            .inner
            .get_with_query("/users/follows", query.to_pairs().as_slice())
            .await?;

        let total = page.total;
        let (follows, cursor) = page.into_parts();
        Ok(FollowsPage {
            follows,
            cursor,
            total,
        })
    }

    /// Stream every follower of `to_id`, fetching `first` per page.
    pub fn followers_stream(&self, to_id: &str, first: u32) -> Result<PaginatedStream<Follow>> {
        require_non_blank(to_id, "to_id")?;
        check_page_size(first)?;

        Ok(PaginatedStreamBuilder::new(self.inner.clone(), "/users/follows")
            .first(first)
            .build_with_query(vec![("to_id", to_id.to_string())]))
    }
}
