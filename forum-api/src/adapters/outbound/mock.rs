//! In-memory outbound adapters for tests.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

use crate::domain::{
    gambits::{MemberRef, Predicate, SortKey},
    models::{
        Channel, ChannelId, ConversationId, ConversationSummary, MemberId, SearchOutcome, Viewer,
    },
    ports::outbound::{ChannelStore, ConversationMarker, SearchExecutor},
    DiscoveryError, SearchQuery,
};

/// Channel store backed by a fixed channel list.
#[derive(Clone, Default)]
pub struct MockChannelStore {
    channels: Arc<RwLock<Vec<Channel>>>,
    unsubscribed: Arc<RwLock<HashMap<MemberId, HashSet<ChannelId>>>>,
    fail: bool,
}

#[allow(dead_code)]
impl MockChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(self, channels: Vec<Channel>) -> Self {
        *self.channels.write().unwrap() = channels;
        self
    }

    pub fn with_unsubscribed(self, member: MemberId, ids: &[i32]) -> Self {
        self.unsubscribed
            .write()
            .unwrap()
            .insert(member, ids.iter().copied().map(ChannelId::new).collect());
        self
    }

    /// Every call fails with a storage error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ChannelStore for MockChannelStore {
    async fn load_channels(&self, viewer: &Viewer) -> Result<Vec<Channel>, DiscoveryError> {
        if self.fail {
            return Err(DiscoveryError::storage("channel store unavailable"));
        }

        let unsubscribed = viewer
            .member_id()
            .and_then(|member| self.unsubscribed.read().unwrap().get(&member).cloned())
            .unwrap_or_default();

        let mut channels = self.channels.read().unwrap().clone();
        for channel in &mut channels {
            channel.unsubscribed = unsubscribed.contains(&channel.id);
        }
        channels.sort_by_key(|channel| channel.bounds.lft);
        Ok(channels)
    }
}

/// Conversation store evaluating a subset of the filter in memory.
#[derive(Clone, Default)]
pub struct MockConversationStore {
    conversations: Arc<RwLock<Vec<ConversationSummary>>>,
    /// Returned by every search instead of evaluating the query.
    custom_ids: Arc<RwLock<Option<Vec<ConversationId>>>>,
    searches: Arc<AtomicUsize>,
    summary_loads: Arc<AtomicUsize>,
    last_query: Arc<RwLock<Option<SearchQuery>>>,
}

#[allow(dead_code)]
impl MockConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversations(self, conversations: Vec<ConversationSummary>) -> Self {
        self.conversations.write().unwrap().extend(conversations);
        self
    }

    pub fn with_search_results(self, ids: &[i32]) -> Self {
        *self.custom_ids.write().unwrap() =
            Some(ids.iter().copied().map(ConversationId::new).collect());
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn summary_load_count(&self) -> usize {
        self.summary_loads.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SearchQuery> {
        self.last_query.read().unwrap().clone()
    }

    fn matches(conversation: &ConversationSummary, query: &SearchQuery) -> Result<bool, String> {
        if !query.scope_ids.is_empty()
            && !conversation
                .channel_id
                .is_some_and(|id| query.scope_ids.contains(&id))
        {
            return Ok(false);
        }

        for condition in &query.filter.conditions {
            let holds = match &condition.predicate {
                Predicate::Sticky => conversation.sticky,
                Predicate::Locked => conversation.locked,
                Predicate::Private => conversation.private,
                Predicate::Unread => conversation.unread,
                Predicate::HasReplies => conversation.reply_count > 0,
                Predicate::Replies(comparison, count) => {
                    comparison.holds(conversation.reply_count, *count)
                }
                Predicate::TitleContains(text) => conversation
                    .title
                    .to_lowercase()
                    .contains(&text.to_lowercase()),
                Predicate::Author(MemberRef::Name(name)) => {
                    conversation.start_member_name.as_deref() == Some(name.as_str())
                }
                Predicate::Custom { name, .. } => {
                    return Err(format!("The gambit '{name}' is not supported"));
                }
                _ => true,
            };
            if holds == condition.negated {
                return Ok(false);
            }
        }

        let title = conversation.title.to_lowercase();
        Ok(query
            .filter
            .fulltext
            .iter()
            .filter(|term| term.text.chars().any(char::is_alphanumeric))
            .all(|term| title.contains(&term.text.to_lowercase()) != term.negated))
    }
}

#[async_trait]
impl SearchExecutor for MockConversationStore {
    async fn find_conversation_ids(
        &self,
        query: &SearchQuery,
        _viewer: &Viewer,
        limit: usize,
    ) -> Result<SearchOutcome, DiscoveryError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_query.write().unwrap() = Some(query.clone());

        if let Some(ids) = self.custom_ids.read().unwrap().as_ref() {
            return Ok(SearchOutcome {
                ids: ids.iter().copied().take(limit).collect(),
                more_results: ids.len() > limit,
                warnings: Vec::new(),
            });
        }

        let mut warnings = Vec::new();
        let mut found: Vec<ConversationSummary> = Vec::new();
        for conversation in self.conversations.read().unwrap().iter() {
            match Self::matches(conversation, query) {
                Ok(true) => found.push(conversation.clone()),
                Ok(false) => {}
                Err(warning) => {
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
            }
        }

        let activity = |c: &ConversationSummary| c.last_post_time.unwrap_or(c.start_time);
        match query.filter.order.key {
            SortKey::LastActivity => found.sort_by_key(|c| Reverse(activity(c))),
            SortKey::Newest => found.sort_by_key(|c| Reverse(c.start_time)),
            SortKey::Replies => found.sort_by_key(|c| Reverse(c.reply_count)),
            SortKey::Random => {}
        }
        if query.filter.order.reversed {
            found.reverse();
        }
        if query.sticky_first {
            found.sort_by_key(|c| !c.sticky);
        }

        Ok(SearchOutcome {
            more_results: found.len() > limit,
            ids: found.iter().take(limit).map(|c| c.id).collect(),
            warnings,
        })
    }

    async fn load_summaries(
        &self,
        ids: &[ConversationId],
        _viewer: &Viewer,
    ) -> Result<Vec<ConversationSummary>, DiscoveryError> {
        self.summary_loads.fetch_add(1, Ordering::SeqCst);
        let conversations = self.conversations.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| conversations.iter().find(|c| c.id == *id).cloned())
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockConversationMarker {
    read: Arc<RwLock<Vec<(MemberId, ConversationId)>>>,
    marked_all: Arc<RwLock<Vec<(MemberId, OffsetDateTime)>>>,
}

#[allow(dead_code)]
impl MockConversationMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_by(&self, member: MemberId) -> Vec<ConversationId> {
        self.read
            .read()
            .unwrap()
            .iter()
            .filter(|(reader, _)| *reader == member)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn marked_all(&self) -> Vec<MemberId> {
        self.marked_all
            .read()
            .unwrap()
            .iter()
            .map(|(member, _)| *member)
            .collect()
    }
}

#[async_trait]
impl ConversationMarker for MockConversationMarker {
    async fn mark_read(
        &self,
        ids: &[ConversationId],
        member: MemberId,
    ) -> Result<(), DiscoveryError> {
        self.read
            .write()
            .unwrap()
            .extend(ids.iter().map(|id| (member, *id)));
        Ok(())
    }

    async fn mark_all_read(
        &self,
        member: MemberId,
        at: OffsetDateTime,
    ) -> Result<(), DiscoveryError> {
        self.marked_all.write().unwrap().push((member, at));
        Ok(())
    }
}

/// A conversation row with sensible defaults.
pub fn conversation(id: i32, channel: i32, title: &str) -> ConversationSummary {
    let start = OffsetDateTime::UNIX_EPOCH + time::Duration::days(id.into());
    ConversationSummary {
        id: ConversationId::new(id),
        title: title.to_string(),
        channel_id: Some(ChannelId::new(channel)),
        sticky: false,
        locked: false,
        private: false,
        reply_count: 0,
        start_time: start,
        last_post_time: None,
        start_member_name: Some("alice".to_string()),
        last_post_member_name: None,
        unread: false,
    }
}
