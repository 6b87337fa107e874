use serde::Serialize;

use super::ChannelId;

/// Nested-set bounds of a node in the channel forest.
///
/// Every ancestor/descendant question about channels reduces to interval
/// containment on these bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NestedSet {
    pub lft: i64,
    pub rgt: i64,
    pub depth: i32,
}

impl NestedSet {
    /// Bounds of the virtual node that contains every channel.
    pub const SYNTHETIC_ROOT: NestedSet = NestedSet {
        lft: 0,
        rgt: i64::MAX,
        depth: -1,
    };

    pub fn new(lft: i64, rgt: i64, depth: i32) -> Self {
        Self { lft, rgt, depth }
    }

    /// Strictly inside `other`.
    pub fn is_descendant_of(&self, other: &NestedSet) -> bool {
        self.lft > other.lft && self.rgt < other.rgt
    }

    pub fn is_direct_child_of(&self, other: &NestedSet) -> bool {
        self.is_descendant_of(other) && self.depth == other.depth + 1
    }

    /// Inside `other` or equal to it.
    pub fn is_within(&self, other: &NestedSet) -> bool {
        self.lft >= other.lft && self.rgt <= other.rgt
    }

    pub fn is_leaf(&self) -> bool {
        self.lft >= self.rgt - 1
    }
}

/// A channel as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub parent_id: Option<ChannelId>,
    #[serde(flatten)]
    pub bounds: NestedSet,
    /// Per-viewer overlay, attached when the forest is loaded.
    pub unsubscribed: bool,
}

impl Channel {
    pub fn is_descendant_of(&self, other: &Channel) -> bool {
        self.bounds.is_descendant_of(&other.bounds)
    }

    pub fn is_direct_child_of(&self, other: &Channel) -> bool {
        self.bounds.is_direct_child_of(&other.bounds)
    }

    pub fn is_leaf(&self) -> bool {
        self.bounds.is_leaf()
    }
}
