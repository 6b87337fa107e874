use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::GambitMenuResponse, app_state::AppState, session::CurrentViewer,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/gambits", get(gambit_menu))
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub search: String,
}

#[instrument(name = "GET /conversations/gambits", skip(app_state, current))]
async fn gambit_menu(
    current: CurrentViewer,
    State(app_state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Json<GambitMenuResponse> {
    let sections = app_state
        .discovery
        .gambit_menu(query.search.trim(), &current.viewer);
    Json(GambitMenuResponse { sections })
}
