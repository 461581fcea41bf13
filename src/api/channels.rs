//! Channels service for channel metadata.

use std::sync::Arc;

use crate::auth::require_non_blank;
use crate::client::{ClientInner, HelixPage};
use crate::models::ChannelInformation;
use crate::Result;

use super::check_id_list;

/// Service for channel metadata.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: twitch_helix_rs::HelixClient) -> twitch_helix_rs::Result<()> {
/// let channels = client.channels().get_information(&["141981764", "12826"]).await?;
/// for channel in channels {
///     println!("{}: {} ({})", channel.broadcaster_name, channel.title, channel.game_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChannelsService {
    inner: Arc<ClientInner>,
}

impl ChannelsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get information about one or more channels.
    ///
    /// Accepts between 1 and 100 broadcaster ids. Unknown ids are omitted
    /// from the result rather than reported as errors.
    pub async fn get_information<S: AsRef<str>>(
        &self,
        broadcaster_ids: &[S],
    ) -> Result<Vec<ChannelInformation>> {
        check_id_list(broadcaster_ids, "broadcaster_ids")?;

        let query: Vec<(&str, &str)> = broadcaster_ids
            .iter()
            .map(|id| ("broadcaster_id", id.as_ref()))
            .collect();

        let page: HelixPage<ChannelInformation> =
            self.inner.get_with_query("/channels", query.as_slice()).await?;
        Ok(page.data)
    }

    /// Get information about a single channel.
    pub async fn get(&self, broadcaster_id: impl AsRef<str>) -> Result<Option<ChannelInformation>> {
        let broadcaster_id = broadcaster_id.as_ref();
        require_non_blank(broadcaster_id, "broadcaster id")?;

        let mut channels = self.get_information(&[broadcaster_id]).await?;
        Ok(channels.pop())
    }
}
