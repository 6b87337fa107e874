use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{ConversationId, MemberId},
    DiscoveryError,
};

/// Records what a member has read.
#[async_trait]
pub trait ConversationMarker: Send + Sync + 'static {
    async fn mark_read(
        &self,
        ids: &[ConversationId],
        member: MemberId,
    ) -> Result<(), DiscoveryError>;

    /// Everything with no activity after `at` counts as read.
    async fn mark_all_read(&self, member: MemberId, at: OffsetDateTime)
        -> Result<(), DiscoveryError>;
}
