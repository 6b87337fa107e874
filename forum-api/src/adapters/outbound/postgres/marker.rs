//! PostgreSQL implementation of the ConversationMarker port.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{ConversationId, MemberId},
    ports::outbound::ConversationMarker,
    DiscoveryError,
};

#[derive(Clone)]
pub struct PostgresConversationMarker {
    pool: PgPool,
}

impl PostgresConversationMarker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationMarker for PostgresConversationMarker {
    async fn mark_read(
        &self,
        ids: &[ConversationId],
        member: MemberId,
    ) -> Result<(), DiscoveryError> {
        if ids.is_empty() {
            return Ok(());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        sqlx::query(
            r#"
            INSERT INTO member_conversations (member_id, conversation_id, last_read_at)
            SELECT $1, c.id, NOW()
            FROM conversations c
            WHERE c.id = ANY($2)
            ON CONFLICT (member_id, conversation_id)
            DO UPDATE SET last_read_at = EXCLUDED.last_read_at
            "#,
        )
        .bind(member.as_i32())
        .bind(&raw_ids)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to mark conversations as read: {}", err);
            DiscoveryError::from(err)
        })?;

        tracing::debug!(member = %member, count = raw_ids.len(), "marked conversations as read");
        Ok(())
    }

    async fn mark_all_read(
        &self,
        member: MemberId,
        at: OffsetDateTime,
    ) -> Result<(), DiscoveryError> {
        sqlx::query("UPDATE members SET marked_all_read_at = $1 WHERE id = $2")
            .bind(at)
            .bind(member.as_i32())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to mark all conversations as read: {}", err);
                DiscoveryError::from(err)
            })?;

        Ok(())
    }
}
