use serde::{Deserialize, Serialize};
use std::fmt;

/// A channel identifier.
///
/// Wraps i32 to match the database SERIAL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(i32);

impl ChannelId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ChannelId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ChannelId> for i32 {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

/// A conversation identifier.
///
/// Only positive values are valid; see [`ConversationId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i32);

impl ConversationId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Parse a client-supplied identifier, rejecting anything that is not a
    /// positive integer.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().parse::<i32>() {
            Ok(id) if id > 0 => Some(Self(id)),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ConversationId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ConversationId> for i32 {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

/// A member (registered user) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(i32);

impl MemberId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MemberId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_parse_accepts_positive_integers() {
        assert_eq!(ConversationId::parse("42"), Some(ConversationId::new(42)));
        assert_eq!(ConversationId::parse(" 7 "), Some(ConversationId::new(7)));
    }

    #[test]
    fn conversation_id_parse_rejects_garbage() {
        assert_eq!(ConversationId::parse("0"), None);
        assert_eq!(ConversationId::parse("-3"), None);
        assert_eq!(ConversationId::parse("abc"), None);
        assert_eq!(ConversationId::parse(""), None);
        assert_eq!(ConversationId::parse("1.5"), None);
    }
}
