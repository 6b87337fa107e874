use async_trait::async_trait;

use crate::domain::{
    models::{ConversationId, ConversationSummary, SearchOutcome, Viewer},
    DiscoveryError, SearchQuery,
};

/// Runs compiled conversation queries against a store.
///
/// Implementations must return the same IDs for the same inputs at a given
/// instant, unless the query sorts randomly.
#[async_trait]
pub trait SearchExecutor: Send + Sync + 'static {
    /// Ordered conversation IDs matching the query, at most `limit` of them.
    ///
    /// Problems with the query itself (an author that does not exist, a
    /// gambit the store cannot evaluate) are reported as warnings.
    async fn find_conversation_ids(
        &self,
        query: &SearchQuery,
        viewer: &Viewer,
        limit: usize,
    ) -> Result<SearchOutcome, DiscoveryError>;

    /// Row data for the given IDs, in the same order. Unknown or invisible
    /// IDs are skipped.
    async fn load_summaries(
        &self,
        ids: &[ConversationId],
        viewer: &Viewer,
    ) -> Result<Vec<ConversationSummary>, DiscoveryError>;
}
