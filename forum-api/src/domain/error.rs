use thiserror::Error;

/// Errors that can occur while discovering conversations.
///
/// User input never produces one of these; bad slugs, gambits and IDs are
/// dropped instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("storage error: {0}")]
    Storage(String),
}

impl DiscoveryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<sqlx::Error> for DiscoveryError {
    fn from(e: sqlx::Error) -> Self {
        DiscoveryError::Storage(e.to_string())
    }
}
