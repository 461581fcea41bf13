//! HTTP client and service layer for the Helix API.
//!
//! This module provides the main entry point [`HelixClient`].
//!
//! # Example
//!
//! ```no_run
//! use twitch_helix_rs::{HelixClient, Environment};
//!
//! # async fn example() -> twitch_helix_rs::Result<()> {
//! let client = HelixClient::from_token(
//!     "your-client-id",
//!     "your-access-token",
//!     Environment::Production,
//! )?;
//!
//! let channels = client.channels().get_information(&["141981764"]).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
pub mod paginated;

pub use config::ClientConfig;
pub use http::HelixClient;
pub use paginated::{HelixPage, PaginatedStream, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub(crate) use http::ClientInner;
