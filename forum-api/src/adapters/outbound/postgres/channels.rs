//! PostgreSQL implementation of the ChannelStore port.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{
    models::{Channel, ChannelId, NestedSet, Viewer},
    ports::outbound::ChannelStore,
    DiscoveryError,
};

#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i32,
    slug: String,
    title: String,
    description: Option<String>,
    parent_id: Option<i32>,
    lft: i64,
    rgt: i64,
    depth: i32,
    unsubscribed: bool,
}

impl From<ChannelRow> for Channel {
    fn from(row: ChannelRow) -> Self {
        Channel {
            id: ChannelId::new(row.id),
            slug: row.slug,
            title: row.title,
            description: row.description,
            parent_id: row.parent_id.map(ChannelId::new),
            bounds: NestedSet::new(row.lft, row.rgt, row.depth),
            unsubscribed: row.unsubscribed,
        }
    }
}

#[derive(Clone)]
pub struct PostgresChannelStore {
    pool: PgPool,
}

impl PostgresChannelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelStore for PostgresChannelStore {
    async fn load_channels(&self, viewer: &Viewer) -> Result<Vec<Channel>, DiscoveryError> {
        let member_id = viewer.member_id().map(|id| id.as_i32());

        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT
                c.id,
                c.slug,
                c.title,
                c.description,
                c.parent_id,
                c.lft,
                c.rgt,
                c.depth,
                COALESCE(mc.unsubscribed, FALSE) AS unsubscribed
            FROM channels c
            LEFT JOIN member_channels mc
                ON mc.channel_id = c.id AND mc.member_id = $1
            ORDER BY c.lft
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to load channels: {}", err);
            DiscoveryError::from(err)
        })?;

        Ok(rows.into_iter().map(Channel::from).collect())
    }
}
