//! Stateless comparison of result windows for incremental polling.
//!
//! The client echoes back the IDs it is showing; the server re-runs the query
//! and reports whether anything new appeared. Nothing is kept between polls.

use std::collections::HashSet;

use crate::domain::models::{ConversationId, POLL_WINDOW};

/// Parse a comma-separated list of conversation IDs sent by a client.
///
/// Invalid entries are discarded one by one and the list is cut to the
/// polling window.
pub fn parse_known_ids(raw: &str) -> Vec<ConversationId> {
    raw.split(',')
        .filter_map(|part| {
            let id = ConversationId::parse(part);
            if id.is_none() && !part.trim().is_empty() {
                tracing::debug!(part, "discarding invalid conversation id");
            }
            id
        })
        .take(POLL_WINDOW)
        .collect()
}

/// Whether `current` holds any ID the client has not seen.
///
/// Reordering or removals alone do not count. A nondeterministic query
/// would report changes on every poll, so it never does.
pub fn has_new_results(
    previous: &[ConversationId],
    current: &[ConversationId],
    nondeterministic: bool,
) -> bool {
    if nondeterministic {
        return false;
    }
    let seen: HashSet<&ConversationId> = previous.iter().collect();
    current.iter().any(|id| !seen.contains(id))
}
