//! Flat nested-set view over every channel a viewer can see.
//!
//! The tree is loaded once per request and never mutated. There are no
//! parent/child pointers: every query is an interval comparison over the
//! loaded slice.

use crate::domain::models::{Channel, ChannelId, NestedSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelTree {
    channels: Vec<Channel>,
}

impl ChannelTree {
    /// Build a tree from the store's channel list.
    ///
    /// Channels are kept in left-bound order so that scans yield roots before
    /// their descendants. The bounds are trusted as given.
    pub fn new(mut channels: Vec<Channel>) -> Self {
        channels.sort_by_key(|channel| channel.bounds.lft);
        Self { channels }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    /// First channel in left-bound order with exactly this slug.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.slug == slug)
    }

    pub fn parent_of(&self, channel: &Channel) -> Option<&Channel> {
        channel.parent_id.and_then(|id| self.get(id))
    }

    /// Channels containing `bounds` (inclusive), root first.
    pub fn ancestors_of(&self, bounds: &NestedSet) -> Vec<&Channel> {
        self.channels
            .iter()
            .filter(|channel| bounds.is_within(&channel.bounds))
            .collect()
    }

    pub fn direct_children_of(
        &self,
        bounds: &NestedSet,
        exclude_unsubscribed: bool,
    ) -> Vec<&Channel> {
        self.channels
            .iter()
            .filter(|channel| channel.bounds.is_direct_child_of(bounds))
            .filter(|channel| !(exclude_unsubscribed && channel.unsubscribed))
            .collect()
    }

    pub fn descendants_of(&self, bounds: &NestedSet) -> Vec<&Channel> {
        self.channels
            .iter()
            .filter(|channel| channel.bounds.is_descendant_of(bounds))
            .collect()
    }

    /// IDs of every channel the viewer has not unsubscribed from.
    pub fn subscribed_ids(&self) -> Vec<ChannelId> {
        self.channels
            .iter()
            .filter(|channel| !channel.unsubscribed)
            .map(|channel| channel.id)
            .collect()
    }

    pub fn is_descendant(&self, a: ChannelId, b: ChannelId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.is_descendant_of(b),
            _ => false,
        }
    }

    pub fn is_direct_child(&self, a: ChannelId, b: ChannelId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.is_direct_child_of(b),
            _ => false,
        }
    }
}
