use async_trait::async_trait;

use crate::domain::{
    gambits::GambitMenuSection,
    models::{ConversationListing, ListRequest, PollOutcome, PollRequest, Viewer},
    DiscoveryError,
};

/// Inbound port for conversation discovery.
///
/// Session state the caller should keep is returned in the results, never
/// written here.
#[async_trait]
pub trait ConversationDiscovery: Send + Sync + 'static {
    /// Resolve the channel expression, run the search and load the rows.
    async fn list(
        &self,
        request: &ListRequest,
        viewer: &Viewer,
    ) -> Result<ConversationListing, DiscoveryError>;

    /// Re-run a search and report whether results the client has not seen
    /// appeared.
    async fn poll(&self, request: &PollRequest, viewer: &Viewer)
        -> Result<PollOutcome, DiscoveryError>;

    async fn mark_all_as_read(&self, viewer: &Viewer) -> Result<(), DiscoveryError>;

    fn gambit_menu(&self, current_search: &str, viewer: &Viewer) -> Vec<GambitMenuSection>;
}
