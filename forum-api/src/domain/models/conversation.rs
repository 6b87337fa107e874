use time::OffsetDateTime;

use super::{ChannelId, ConversationId};

/// Window size used when polling for new results.
pub const POLL_WINDOW: usize = 20;

/// Row data for one conversation in a result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub channel_id: Option<ChannelId>,
    pub sticky: bool,
    pub locked: bool,
    pub private: bool,
    pub reply_count: i32,
    pub start_time: OffsetDateTime,
    pub last_post_time: Option<OffsetDateTime>,
    pub start_member_name: Option<String>,
    pub last_post_member_name: Option<String>,
    pub unread: bool,
}

/// What a search executor returns for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Ordered, bounded by the requested limit.
    pub ids: Vec<ConversationId>,
    pub more_results: bool,
    /// User-facing problems with the query. Never fatal.
    pub warnings: Vec<String>,
}
