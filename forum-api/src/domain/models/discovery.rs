use super::{Channel, ChannelId, ConversationSummary, SessionUpdates};

/// A conversation list request, after URL decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Space-separated channel slugs; a leading space selects exactly.
    pub channels: String,
    pub search: String,
    pub mark_as_read: bool,
}

/// A poll for changes to a result list the client already shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollRequest {
    pub channels: String,
    pub search: String,
    /// Comma-separated conversation IDs, as sent by the client.
    pub known_ids: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationListing {
    pub conversations: Vec<ConversationSummary>,
    pub more_results: bool,
    pub channel_path: Vec<Channel>,
    pub channel_tabs: Vec<Channel>,
    pub current_channels: Vec<ChannelId>,
    pub include_descendants: bool,
    pub canonical_slug: String,
    pub search: String,
    pub fulltext: String,
    pub warnings: Vec<String>,
    pub session: SessionUpdates,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    pub new_results: bool,
    /// Fresh row data for the IDs the client already shows.
    pub conversations: Vec<ConversationSummary>,
    pub fulltext: String,
    pub session: SessionUpdates,
}
