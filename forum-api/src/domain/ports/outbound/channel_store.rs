use async_trait::async_trait;

use crate::domain::{
    models::{Channel, Viewer},
    DiscoveryError,
};

#[async_trait]
pub trait ChannelStore: Send + Sync + 'static {
    /// Every channel the viewer may see, ordered by left bound, with the
    /// viewer's unsubscribed flags attached. Guests are subscribed to all.
    async fn load_channels(&self, viewer: &Viewer) -> Result<Vec<Channel>, DiscoveryError>;
}
