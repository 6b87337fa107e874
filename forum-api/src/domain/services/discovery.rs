use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::instrument;

use crate::domain::{
    channels::{resolve_scope, ChannelTree, ResolvedScope},
    gambits::{
        fulltext_string, gambit_menu, highlight_terms, parse_query, GambitMenuSection,
        GambitRegistry, ParsedQuery,
    },
    has_new_results,
    models::{
        ConversationId, ConversationListing, ConversationSummary, ListRequest, PollOutcome,
        PollRequest, SessionUpdates, Viewer, POLL_WINDOW,
    },
    parse_known_ids,
    ports::{
        inbound::ConversationDiscovery,
        outbound::{ChannelStore, ConversationMarker, SearchExecutor},
    },
    DiscoveryError, SearchQuery,
};

pub const DEFAULT_PAGE_SIZE: usize = 50;

pub struct DiscoveryServiceImpl<C, S, M> {
    channels: Arc<C>,
    executor: Arc<S>,
    marker: Arc<M>,
    registry: Arc<GambitRegistry>,
    page_size: usize,
}

impl<C, S, M> DiscoveryServiceImpl<C, S, M> {
    pub fn new(
        channels: Arc<C>,
        executor: Arc<S>,
        marker: Arc<M>,
        registry: Arc<GambitRegistry>,
    ) -> Self {
        Self {
            channels,
            executor,
            marker,
            registry,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

impl<C: ChannelStore, S: SearchExecutor, M: ConversationMarker> DiscoveryServiceImpl<C, S, M> {
    async fn resolve(
        &self,
        expression: &str,
        viewer: &Viewer,
    ) -> Result<ResolvedScope, DiscoveryError> {
        let channels = self.channels.load_channels(viewer).await?;
        let tree = ChannelTree::new(channels);
        Ok(resolve_scope(&tree, expression))
    }

    fn build_query(
        &self,
        scope: &ResolvedScope,
        parsed: ParsedQuery,
        viewer: &Viewer,
    ) -> SearchQuery {
        // Sticky conversations float to the top inside a channel and for
        // guests; members browsing everything get pure activity order.
        let sticky_first = scope.has_selection() || !viewer.is_member();
        SearchQuery::new(scope.selection.scope_ids.clone(), parsed, viewer)
            .sticky_first(sticky_first)
    }

    async fn summaries(
        &self,
        ids: &[ConversationId],
        viewer: &Viewer,
    ) -> Result<Vec<ConversationSummary>, DiscoveryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.executor.load_summaries(ids, viewer).await
    }
}

#[async_trait]
impl<C: ChannelStore, S: SearchExecutor, M: ConversationMarker> ConversationDiscovery
    for DiscoveryServiceImpl<C, S, M>
{
    #[instrument(skip(self, viewer), fields(member = ?viewer.member_id()))]
    async fn list(
        &self,
        request: &ListRequest,
        viewer: &Viewer,
    ) -> Result<ConversationListing, DiscoveryError> {
        let scope = self.resolve(&request.channels, viewer).await?;
        let parsed = parse_query(&self.registry, &request.search);
        let query = self.build_query(&scope, parsed, viewer);

        let outcome = self
            .executor
            .find_conversation_ids(&query, viewer, self.page_size)
            .await?;

        if request.mark_as_read {
            if let Some(member) = viewer.member_id() {
                self.marker.mark_read(&outcome.ids, member).await?;
            }
        }

        let conversations = self.summaries(&outcome.ids, viewer).await?;

        let mut warnings = query.filter.warnings.clone();
        warnings.extend(outcome.warnings);

        let highlight = warnings.is_empty().then(|| highlight_terms(&query.tokens));

        tracing::debug!(
            results = outcome.ids.len(),
            more = outcome.more_results,
            warnings = warnings.len(),
            "listed conversations"
        );

        Ok(ConversationListing {
            conversations,
            more_results: outcome.more_results,
            channel_path: scope.path.clone(),
            channel_tabs: scope.tabs.clone(),
            current_channels: scope.selection.selected_ids.clone(),
            include_descendants: scope.selection.include_descendants,
            canonical_slug: scope.canonical_slug.clone(),
            search: request.search.clone(),
            fulltext: fulltext_string(&query.tokens),
            warnings,
            session: SessionUpdates {
                last_selected_channel: scope.first_selected(),
                highlight_terms: highlight,
            },
        })
    }

    #[instrument(skip(self, viewer), fields(member = ?viewer.member_id()))]
    async fn poll(
        &self,
        request: &PollRequest,
        viewer: &Viewer,
    ) -> Result<PollOutcome, DiscoveryError> {
        let known_ids = parse_known_ids(&request.known_ids);
        if known_ids.is_empty() {
            return Ok(PollOutcome::default());
        }

        let parsed = parse_query(&self.registry, &request.search);
        let nondeterministic = parsed.is_nondeterministic();
        let tokens = parsed.tokens.clone();

        let new_results = if nondeterministic {
            false
        } else {
            let scope = self.resolve(&request.channels, viewer).await?;
            let query = self.build_query(&scope, parsed, viewer);
            let outcome = self
                .executor
                .find_conversation_ids(&query, viewer, POLL_WINDOW)
                .await?;
            has_new_results(&known_ids, &outcome.ids, nondeterministic)
        };

        let conversations = self.summaries(&known_ids, viewer).await?;

        Ok(PollOutcome {
            new_results,
            conversations,
            fulltext: fulltext_string(&tokens),
            session: SessionUpdates {
                last_selected_channel: None,
                highlight_terms: Some(highlight_terms(&tokens)),
            },
        })
    }

    #[instrument(skip(self, viewer), fields(member = ?viewer.member_id()))]
    async fn mark_all_as_read(&self, viewer: &Viewer) -> Result<(), DiscoveryError> {
        let Some(member) = viewer.member_id() else {
            return Ok(());
        };
        self.marker
            .mark_all_read(member, OffsetDateTime::now_utc())
            .await
    }

    fn gambit_menu(&self, current_search: &str, viewer: &Viewer) -> Vec<GambitMenuSection> {
        gambit_menu(&self.registry, current_search, viewer)
    }
}
