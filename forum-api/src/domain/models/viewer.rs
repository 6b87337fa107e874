use super::{ChannelId, MemberId};

/// The person a request is made on behalf of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    member_id: Option<MemberId>,
}

impl Viewer {
    pub fn guest() -> Self {
        Self { member_id: None }
    }

    pub fn member(id: MemberId) -> Self {
        Self {
            member_id: Some(id),
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        self.member_id
    }

    pub fn is_member(&self) -> bool {
        self.member_id.is_some()
    }
}

/// Per-user values a request produced that the caller should keep in its
/// session store.
///
/// Nothing in the domain writes session state directly; the HTTP layer
/// persists whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdates {
    /// Preselected by the "new conversation" flow.
    pub last_selected_channel: Option<ChannelId>,
    /// Terms renderers should highlight in snippets.
    pub highlight_terms: Option<Vec<String>>,
}
