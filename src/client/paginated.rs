//! Cursor pagination for Helix list endpoints.
//!
//! Helix list responses share one envelope, [`HelixPage`], whose
//! `pagination.cursor` points at the next page. [`PaginatedStream`] walks
//! those cursors lazily and yields individual items.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::de::DeserializeOwned;

use super::ClientInner;
use crate::Result;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size Helix accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// The Helix response envelope.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HelixPage<T> {
    /// The items in this page.
    pub data: Vec<T>,
    /// Pagination metadata, absent on non-paginated endpoints.
    #[serde(default)]
    pub pagination: Option<Pagination>,
    /// Total number of results, on endpoints that report it.
    #[serde(default)]
    pub total: Option<u64>,
    /// Sub points, only on the broadcaster subscriptions endpoint.
    #[serde(default)]
    pub points: Option<u64>,
}

impl<T> HelixPage<T> {
    /// Cursor of the next page, `None` when this is the last page.
    ///
    /// Helix signals the end with an empty object or an empty cursor.
    pub fn cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Split the page into its items and next cursor.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        let cursor = self.cursor().map(String::from);
        (self.data, cursor)
    }
}

/// Pagination metadata from an API response.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Pagination {
    /// Opaque cursor for the next page.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Type alias for a boxed future used internally.
type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

type FetchPage<T> = Box<dyn Fn(Option<String>) -> BoxFuture<'static, Result<HelixPage<T>>> + Send + Sync>;

/// A stream that lazily fetches pages from a paginated Helix endpoint.
///
/// Items are yielded one at a time; the next page is requested when the
/// current one is exhausted. The stream ends after the first error.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
///
/// # async fn example(client: twitch_helix_rs::HelixClient) -> twitch_helix_rs::Result<()> {
/// let mut stream = client.users().followers_stream("141981764", 100)?;
///
/// while let Some(result) = stream.next().await {
///     let follow = result?;
///     println!("{} follows since {}", follow.from_name, follow.followed_at);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PaginatedStream<T> {
    /// Function to fetch a page by cursor.
    fetch_page: FetchPage<T>,
    /// Current page of items being yielded.
    current_items: VecDeque<T>,
    /// Cursor to fetch next; `None` once exhausted.
    next_cursor: Option<Option<String>>,
    /// Current in-flight fetch future.
    pending_fetch: Option<BoxFuture<'static, Result<HelixPage<T>>>>,
}

impl<T> PaginatedStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a new paginated stream starting at the first page.
    pub fn new<F>(fetch_page: F) -> Self
    where
        F: Fn(Option<String>) -> BoxFuture<'static, Result<HelixPage<T>>> + Send + Sync + 'static,
    {
        Self {
            fetch_page: Box::new(fetch_page),
            current_items: VecDeque::new(),
            next_cursor: Some(None),
            pending_fetch: None,
        }
    }
}

impl<T> Stream for PaginatedStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(item) = this.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(ref mut fut) = this.pending_fetch {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.pending_fetch = None;
                        let (items, cursor) = page.into_parts();
                        this.current_items = items.into();
                        this.next_cursor = cursor.map(Some);

                        if !this.current_items.is_empty() {
                            continue;
                        }

                        // An empty page ends the stream even if a cursor came back
                        this.next_cursor = None;
                        return Poll::Ready(None);
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending_fetch = None;
                        this.next_cursor = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => {
                        return Poll::Pending;
                    }
                }
            }

            if let Some(cursor) = this.next_cursor.take() {
                this.pending_fetch = Some((this.fetch_page)(cursor));
                continue;
            }

            return Poll::Ready(None);
        }
    }
}

impl<T> Unpin for PaginatedStream<T> {}

/// Builder for creating paginated streams over a Helix path.
pub(crate) struct PaginatedStreamBuilder<T> {
    inner: Arc<ClientInner>,
    path: String,
    first: u32,
    _marker: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned + Send + 'static> PaginatedStreamBuilder<T> {
    /// Create a new builder.
    pub(crate) fn new(inner: Arc<ClientInner>, path: impl Into<String>) -> Self {
        Self {
            inner,
            path: path.into(),
            first: DEFAULT_PAGE_SIZE,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the number of items per page.
    pub(crate) fn first(mut self, first: u32) -> Self {
        self.first = first;
        self
    }

    /// Build the stream with the endpoint's own query parameters.
    pub(crate) fn build_with_query(self, query: Vec<(&'static str, String)>) -> PaginatedStream<T> {
        let inner = self.inner;
        let path = self.path;
        let first = self.first;

        PaginatedStream::new(move |cursor: Option<String>| {
            let inner = inner.clone();
            let path = path.clone();
            let mut query = query.clone();

            Box::pin(async move {
                query.push(("first", first.to_string()));
                if let Some(after) = cursor {
                    query.push(("after", after));
                }

                inner
                    .get_with_query::<HelixPage<T>, _>(&path, query.as_slice())
                    .await
            })
        })
    }
}
