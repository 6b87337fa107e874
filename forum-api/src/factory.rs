//! Composition root: the only place that wires concrete outbound adapters
//! into domain services.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    adapters::outbound::postgres::{
        PostgresChannelStore, PostgresConversationMarker, PostgresConversationSearch,
    },
    config::DiscoverySettings,
    domain::{
        gambits::{GambitRegistry, GambitRegistryError},
        ports::inbound::ConversationDiscovery,
        services::DiscoveryServiceImpl,
    },
};

/// Built-in gambits followed by the configured extras, in that order.
pub fn gambit_registry(
    settings: &DiscoverySettings,
) -> Result<GambitRegistry, GambitRegistryError> {
    GambitRegistry::builtin().extend(settings.extra_gambits.iter().cloned())
}

pub fn discovery_service(
    pool: PgPool,
    settings: &DiscoverySettings,
) -> Result<Arc<dyn ConversationDiscovery>, GambitRegistryError> {
    let registry = gambit_registry(settings)?;
    tracing::debug!(
        "Gambit registry holds {} entries",
        registry.definitions().count()
    );

    let service = DiscoveryServiceImpl::new(
        Arc::new(PostgresChannelStore::new(pool.clone())),
        Arc::new(PostgresConversationSearch::new(pool.clone())),
        Arc::new(PostgresConversationMarker::new(pool)),
        Arc::new(registry),
    )
    .with_page_size(settings.page_size);

    Ok(Arc::new(service))
}
