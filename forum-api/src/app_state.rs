use std::sync::Arc;

use crate::domain::ports::inbound::ConversationDiscovery;

#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<dyn ConversationDiscovery>,
    /// Seconds clients should wait between polls.
    pub update_interval_secs: u64,
}

impl AppState {
    pub fn new(discovery: Arc<dyn ConversationDiscovery>, update_interval_secs: u64) -> Self {
        Self {
            discovery,
            update_interval_secs,
        }
    }
}
