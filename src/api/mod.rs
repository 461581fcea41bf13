//! API service modules for Helix endpoints.
//!
//! Each service provides methods for interacting with a specific
//! subset of the Helix API.

mod channels;
mod oauth;
mod subscriptions;
mod users;

pub use channels::ChannelsService;
pub use oauth::OAuthService;
pub use subscriptions::SubscriptionsService;
pub use users::{FollowsQuery, UsersService};

use crate::client::MAX_PAGE_SIZE;
use crate::{Error, Result};

/// Validate a list parameter that Helix caps at 100 entries.
pub(crate) fn check_id_list<S: AsRef<str>>(values: &[S], name: &str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{} must contain at least one entry",
            name
        )));
    }
    if values.len() > MAX_PAGE_SIZE as usize {
        return Err(Error::InvalidArgument(format!(
            "{} may contain at most {} entries",
            name, MAX_PAGE_SIZE
        )));
    }
    if values.iter().any(|v| v.as_ref().trim().is_empty()) {
        return Err(Error::InvalidArgument(format!(
            "{} must not contain empty entries",
            name
        )));
    }
    Ok(())
}

/// Validate a `first` page-size parameter.
pub(crate) fn check_page_size(first: u32) -> Result<()> {
    if first == 0 || first > MAX_PAGE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "first must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, first
        )));
    }
    Ok(())
}
