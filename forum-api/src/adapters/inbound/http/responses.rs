//! HTTP response types for conversation discovery endpoints.
//!
//! These types serialize to the JSON format expected by the frontend.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::{
    gambits::GambitMenuSection,
    models::{Channel, ConversationListing, ConversationSummary, PollOutcome},
};

/// One row of a conversation list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: i32,
    pub title: String,
    pub channel_id: Option<i32>,
    pub sticky: bool,
    pub locked: bool,
    pub private: bool,
    pub reply_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_post_time: Option<OffsetDateTime>,
    pub start_member_name: Option<String>,
    pub last_post_member_name: Option<String>,
    pub unread: bool,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            id: summary.id.as_i32(),
            title: summary.title,
            channel_id: summary.channel_id.map(|id| id.as_i32()),
            sticky: summary.sticky,
            locked: summary.locked,
            private: summary.private,
            reply_count: summary.reply_count,
            start_time: summary.start_time,
            last_post_time: summary.last_post_time,
            start_member_name: summary.start_member_name,
            last_post_member_name: summary.last_post_member_name,
            unread: summary.unread,
        }
    }
}

/// A channel in the breadcrumb path or the tab bar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub depth: i32,
    pub unsubscribed: bool,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id.as_i32(),
            slug: channel.slug,
            title: channel.title,
            description: channel.description,
            depth: channel.bounds.depth,
            unsubscribed: channel.unsubscribed,
        }
    }
}

/// Response for the conversation list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
    pub more_results: bool,
    pub channel_path: Vec<ChannelResponse>,
    pub channel_tabs: Vec<ChannelResponse>,
    pub current_channels: Vec<i32>,
    pub include_descendants: bool,
    /// Slug the client should show in its address bar.
    pub canonical_slug: String,
    pub search: String,
    pub fulltext: String,
    pub warnings: Vec<String>,
    /// Seconds the client should wait between polls.
    pub update_interval_secs: u64,
}

impl ConversationListResponse {
    pub fn new(listing: ConversationListing, update_interval_secs: u64) -> Self {
        Self {
            conversations: listing
                .conversations
                .into_iter()
                .map(ConversationResponse::from)
                .collect(),
            more_results: listing.more_results,
            channel_path: listing
                .channel_path
                .into_iter()
                .map(ChannelResponse::from)
                .collect(),
            channel_tabs: listing
                .channel_tabs
                .into_iter()
                .map(ChannelResponse::from)
                .collect(),
            current_channels: listing
                .current_channels
                .into_iter()
                .map(|id| id.as_i32())
                .collect(),
            include_descendants: listing.include_descendants,
            canonical_slug: listing.canonical_slug,
            search: listing.search,
            fulltext: listing.fulltext,
            warnings: listing.warnings,
            update_interval_secs,
        }
    }
}

/// Response for the poll endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub new_results: bool,
    pub conversations: Vec<ConversationResponse>,
    pub fulltext: String,
    pub update_interval_secs: u64,
}

impl PollResponse {
    pub fn new(outcome: PollOutcome, update_interval_secs: u64) -> Self {
        Self {
            new_results: outcome.new_results,
            conversations: outcome
                .conversations
                .into_iter()
                .map(ConversationResponse::from)
                .collect(),
            fulltext: outcome.fulltext,
            update_interval_secs,
        }
    }
}

/// Response for the gambit menu endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GambitMenuResponse {
    pub sections: Vec<GambitMenuSection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChannelId, ConversationId};

    #[test]
    fn conversation_response_serializes_camel_case_rfc3339() {
        let summary = ConversationSummary {
            id: ConversationId::new(7),
            title: "Hello".to_string(),
            channel_id: Some(ChannelId::new(2)),
            sticky: false,
            locked: true,
            private: false,
            reply_count: 3,
            start_time: OffsetDateTime::UNIX_EPOCH,
            last_post_time: None,
            start_member_name: Some("alice".to_string()),
            last_post_member_name: None,
            unread: true,
        };

        let json = serde_json::to_value(ConversationResponse::from(summary)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["channelId"], 2);
        assert_eq!(json["replyCount"], 3);
        assert_eq!(json["startTime"], "1970-01-01T00:00:00Z");
        assert!(json["lastPostTime"].is_null());
        assert_eq!(json["startMemberName"], "alice");
    }
}
