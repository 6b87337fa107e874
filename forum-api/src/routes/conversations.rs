use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{ConversationListResponse, PollResponse},
    app_state::AppState,
    domain::models::{ListRequest, PollRequest},
    session::CurrentViewer,
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all))
        .route("/mark-all-as-read", post(mark_all_as_read))
        .route("/:channels", get(list_channels))
        .route("/:channels/poll", get(poll))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub mark_as_read: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub conversation_ids: String,
}

/// Channel slugs arrive `+`-joined in the path.
fn decode_channels(raw: &str) -> String {
    raw.replace('+', " ")
}

#[instrument(name = "GET /conversations", skip(app_state, current))]
async fn list_all(
    current: CurrentViewer,
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    list(current, app_state, String::new(), query).await
}

#[instrument(name = "GET /conversations/:channels", skip(app_state, current))]
async fn list_channels(
    current: CurrentViewer,
    State(app_state): State<AppState>,
    Path(channels): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    list(current, app_state, decode_channels(&channels), query).await
}

async fn list(
    current: CurrentViewer,
    app_state: AppState,
    channels: String,
    query: ListQuery,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let request = ListRequest {
        channels,
        search: query.search,
        mark_as_read: query.mark_as_read,
    };

    let listing = app_state.discovery.list(&request, &current.viewer).await?;
    current.persist(&listing.session).await?;

    Ok(Json(ConversationListResponse::new(
        listing,
        app_state.update_interval_secs,
    )))
}

#[instrument(name = "GET /conversations/:channels/poll", skip(app_state, current))]
async fn poll(
    current: CurrentViewer,
    State(app_state): State<AppState>,
    Path(channels): Path<String>,
    Query(query): Query<PollQuery>,
) -> Result<Json<PollResponse>, ApiError> {
    let request = PollRequest {
        channels: decode_channels(&channels),
        search: query.search,
        known_ids: query.conversation_ids,
    };

    let outcome = app_state.discovery.poll(&request, &current.viewer).await?;
    current.persist(&outcome.session).await?;

    Ok(Json(PollResponse::new(
        outcome,
        app_state.update_interval_secs,
    )))
}

#[instrument(name = "POST /conversations/mark-all-as-read", skip(app_state, current))]
async fn mark_all_as_read(
    current: CurrentViewer,
    State(app_state): State<AppState>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    app_state.discovery.mark_all_as_read(&current.viewer).await?;
    list(current, app_state, String::new(), ListQuery::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_separated_slugs_decode_to_spaces() {
        assert_eq!(decode_channels("general+off-topic"), "general off-topic");
        assert_eq!(decode_channels("+programming"), " programming");
        assert_eq!(decode_channels(""), "");
    }
}
