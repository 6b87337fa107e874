use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tower_sessions::{
    cookie::SameSite, CachingSessionStore, ExpiredDeletion, Expiry, SessionManagerLayer,
    SessionStore,
};
use tower_sessions_moka_store::MokaStore;
use tower_sessions_sqlx_store::PostgresStore;

use crate::{app_state::AppState, routes};

pub type PersistentSessionStore = CachingSessionStore<MokaStore, PostgresStore>;

pub fn create<S>(
    app_state: AppState,
    session_layer: SessionManagerLayer<S>,
    app_url: String,
) -> Router<()>
where
    S: SessionStore + Clone,
{
    let conversations = routes::conversations::router().merge(routes::gambits::router());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    Router::new()
        .route("/", get(|| async { "Hello, little World!" }))
        .nest("/conversations", conversations)
        .with_state(app_state)
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

/// Sessions live in Postgres behind an in-memory cache.
///
/// Creates the session table if needed and starts the expired-session
/// cleanup task.
pub async fn session_layer(
    connection_pool: PgPool,
) -> Result<SessionManagerLayer<PersistentSessionStore>, sqlx::Error> {
    let db_store = PostgresStore::new(connection_pool);
    db_store.migrate().await?;

    let deletion_task = tokio::task::spawn(
        db_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
    );
    // Detach the task so it runs independently
    drop(deletion_task);

    let cache_store = MokaStore::new(Some(2_000));
    let session_store = CachingSessionStore::new(cache_store, db_store);

    Ok(SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7))))
}
