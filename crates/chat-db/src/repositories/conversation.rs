//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Conversation, ParticipantEdge};
use chat_core::error::DomainError;
use chat_core::traits::{ConversationRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::{ConversationModel, ParticipantModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, pair_key, created_at
            FROM conversations
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_pair_key(&self, pair_key: &str) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, pair_key, created_at
            FROM conversations
            WHERE pair_key = $1
            ",
        )
        .bind(pair_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_ids_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let edges = sqlx::query_as::<_, ParticipantModel>(
            r"
            SELECT conversation_id, user_id, created_at
            FROM conversation_participants
            WHERE user_id = $1
            ORDER BY created_at, conversation_id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(edges
            .into_iter()
            .map(|edge| Snowflake::new(edge.conversation_id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_participants(&self, conversation_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let edges = sqlx::query_as::<_, ParticipantModel>(
            r"
            SELECT conversation_id, user_id, created_at
            FROM conversation_participants
            WHERE conversation_id = $1
            ORDER BY created_at, user_id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(edges
            .into_iter()
            .map(|edge| ParticipantEdge::from(edge).user_id)
            .collect())
    }

    #[instrument(skip(self))]
    async fn is_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO conversations (id, pair_key, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(&conversation.pair_key)
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateConversation))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<()> {
        // clock_timestamp() so two edges inserted back to back keep their order
        sqlx::query(
            r"
            INSERT INTO conversation_participants (conversation_id, user_id, created_at)
            VALUES ($1, $2, clock_timestamp())
            ON CONFLICT (conversation_id, user_id) DO NOTHING
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
