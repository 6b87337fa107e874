use std::net::SocketAddr;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod adapters;
mod app_state;
mod config;
mod domain;
mod factory;
mod router;
mod routes;
mod session;

use app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("forum_api=debug,tower_http=info")),
        )
        .with_target(true)
        .init();

    let settings = config::read_config().context("Failed to read configuration")?;

    let connection_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to Postgres")?;

    sqlx::migrate!()
        .run(&connection_pool)
        .await
        .context("Failed to run database migrations")?;

    let discovery = factory::discovery_service(connection_pool.clone(), &settings.discovery)
        .context("Invalid gambit configuration")?;
    let session_layer = router::session_layer(connection_pool)
        .await
        .context("Failed to set up the session store")?;

    let app_state = AppState::new(discovery, settings.discovery.update_interval_secs);
    let app = router::create(
        app_state,
        session_layer,
        settings.application.app_url.clone(),
    );

    let addr: SocketAddr = format!("{}:{}", settings.application.host, settings.application.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
