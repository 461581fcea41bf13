//! Authentication and session management for the Helix API.
//!
//! Every Helix request carries a client id and an OAuth access token. A
//! [`Session`] holds both and, when created from a refresh token, renews the
//! access token before it expires.
//!
//! # Existing token
//!
//! ```
//! use twitch_helix_rs::{Session, Environment};
//!
//! let session = Session::new("your-client-id", "your-access-token", Environment::Production);
//! ```
//!
//! # Refresh token
//!
//! ```no_run
//! use twitch_helix_rs::{Session, Environment};
//!
//! # async fn example() -> twitch_helix_rs::Result<()> {
//! let session = Session::from_refresh_token(
//!     "your-client-id",
//!     "your-client-secret",
//!     "your-refresh-token",
//!     Environment::Production,
//! ).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The one-off OAuth calls (code exchange, validation, authorization URL)
//! live on [`OAuthService`](crate::api::OAuthService).

mod session;
mod token;

pub use session::Session;
pub use token::{AuthCodeResponse, AuthScope, RefreshResponse, ValidateAccessTokenResponse};
pub(crate) use token::{post_token, require_non_blank, validate};
