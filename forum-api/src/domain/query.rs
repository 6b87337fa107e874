use crate::domain::{
    gambits::{compile_filter, ConversationFilter, GambitToken, ParsedQuery},
    models::{ChannelId, Viewer},
};

/// Everything a search executor needs to run one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub scope_ids: Vec<ChannelId>,
    pub tokens: Vec<GambitToken>,
    pub raw: String,
    /// Order sticky conversations first.
    pub sticky_first: bool,
    pub filter: ConversationFilter,
}

impl SearchQuery {
    pub fn new(scope_ids: Vec<ChannelId>, parsed: ParsedQuery, viewer: &Viewer) -> Self {
        let filter = compile_filter(&parsed.tokens, viewer);
        Self {
            scope_ids,
            tokens: parsed.tokens,
            raw: parsed.raw,
            sticky_first: false,
            filter,
        }
    }

    pub fn sticky_first(mut self, sticky_first: bool) -> Self {
        self.sticky_first = sticky_first;
        self
    }
}
