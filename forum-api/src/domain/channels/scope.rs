//! Resolves a channel slug expression against a [`ChannelTree`].
//!
//! Expressions are space-separated slugs. A leading empty segment (the
//! `conversations/+slug` URL form once `+` is decoded) selects the listed
//! channels exactly, without their descendants.

use itertools::Itertools;

use super::ChannelTree;
use crate::domain::models::{Channel, ChannelId, NestedSet};

/// Which channels a request selected and which ones it filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    /// Explicitly selected channels, in expression order. Empty means "all".
    pub selected_ids: Vec<ChannelId>,
    pub include_descendants: bool,
    /// Channels conversations are filtered by.
    pub scope_ids: Vec<ChannelId>,
}

/// Outcome of resolving a slug expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub selection: ChannelSelection,
    /// The channel whose children are offered as tabs.
    pub pivot: NestedSet,
    /// Breadcrumb trail down to the pivot, root first.
    pub path: Vec<Channel>,
    /// Subscribed direct children of the pivot.
    pub tabs: Vec<Channel>,
    /// Selected slugs joined by a space, or `all`.
    pub canonical_slug: String,
}

impl ResolvedScope {
    pub fn first_selected(&self) -> Option<ChannelId> {
        self.selection.selected_ids.first().copied()
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.selected_ids.is_empty()
    }
}

pub fn resolve_scope(tree: &ChannelTree, expression: &str) -> ResolvedScope {
    let (selected, include_descendants) = select_channels(tree, expression);
    let pivot = pivot_bounds(tree, &selected, include_descendants);
    let (path, tabs) = navigation(tree, &pivot);
    let scope_ids = scope_ids(tree, &selected, include_descendants);

    let canonical_slug = if selected.is_empty() {
        "all".to_string()
    } else {
        selected.iter().map(|channel| channel.slug.as_str()).join(" ")
    };

    tracing::debug!(
        expression,
        selected = selected.len(),
        include_descendants,
        scope = scope_ids.len(),
        "resolved channel scope"
    );

    ResolvedScope {
        selection: ChannelSelection {
            selected_ids: selected.iter().map(|channel| channel.id).collect(),
            include_descendants,
            scope_ids,
        },
        pivot,
        path,
        tabs,
        canonical_slug,
    }
}

fn select_channels<'a>(tree: &'a ChannelTree, expression: &str) -> (Vec<&'a Channel>, bool) {
    if expression.is_empty() {
        return (Vec::new(), true);
    }

    let mut segments = expression.split(' ').peekable();
    let include_descendants = segments.next_if(|segment| segment.is_empty()).is_none();

    let selected = segments
        .filter_map(|slug| {
            let found = tree.find_by_slug(slug);
            if found.is_none() && !slug.is_empty() {
                tracing::debug!(slug, "dropping unknown channel slug");
            }
            found
        })
        .collect();

    (selected, include_descendants)
}

/// The first selected channel, stepping up to its parent when it is a leaf or
/// when descendants are excluded. Falls back to the synthetic root.
fn pivot_bounds(tree: &ChannelTree, selected: &[&Channel], include_descendants: bool) -> NestedSet {
    let pivot = match selected.first() {
        Some(first) if first.is_leaf() || !include_descendants => tree.parent_of(first),
        Some(first) => Some(*first),
        None => None,
    };

    pivot
        .map(|channel| channel.bounds)
        .unwrap_or(NestedSet::SYNTHETIC_ROOT)
}

fn navigation(tree: &ChannelTree, pivot: &NestedSet) -> (Vec<Channel>, Vec<Channel>) {
    let path = tree.ancestors_of(pivot).into_iter().cloned().collect();
    let tabs = tree
        .direct_children_of(pivot, true)
        .into_iter()
        .cloned()
        .collect();
    (path, tabs)
}

fn scope_ids(
    tree: &ChannelTree,
    selected: &[&Channel],
    include_descendants: bool,
) -> Vec<ChannelId> {
    let ids: Vec<ChannelId> = if include_descendants {
        selected
            .iter()
            .flat_map(|root| {
                // Selecting an unsubscribed channel explicitly brings back all
                // of its descendants, subscribed or not.
                let root_unsubscribed = root.unsubscribed;
                std::iter::once(root.id).chain(
                    tree.descendants_of(&root.bounds)
                        .into_iter()
                        .filter(move |child| !child.unsubscribed || root_unsubscribed)
                        .map(|child| child.id),
                )
            })
            .unique()
            .collect()
    } else {
        selected.iter().map(|channel| channel.id).unique().collect()
    };

    if ids.is_empty() {
        tree.subscribed_ids()
    } else {
        ids
    }
}
