//! PostgreSQL implementation of TypingIndicatorRepository
//!
//! Every statement touches one row, so Postgres row locking gives the
//! per-entry atomicity the typing protocol relies on.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::TypingIndicator;
use chat_core::traits::{RepoResult, TypingIndicatorRepository};
use chat_core::value_objects::Snowflake;

use crate::models::TypingIndicatorModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TypingIndicatorRepository
#[derive(Clone)]
pub struct PgTypingIndicatorRepository {
    pool: PgPool,
}

impl PgTypingIndicatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TypingIndicatorRepository for PgTypingIndicatorRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
    ) -> RepoResult<Option<TypingIndicator>> {
        let result = sqlx::query_as::<_, TypingIndicatorModel>(
            r"
            SELECT user_id, conversation_id, started_at, expires_at
            FROM typing_indicators
            WHERE user_id = $1 AND conversation_id = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(conversation_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(TypingIndicator::from))
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Vec<TypingIndicator>> {
        let results = sqlx::query_as::<_, TypingIndicatorModel>(
            r"
            SELECT user_id, conversation_id, started_at, expires_at
            FROM typing_indicators
            WHERE conversation_id = $1
            ORDER BY started_at, user_id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(TypingIndicator::from).collect())
    }

    #[instrument(skip(self, indicator), fields(user_id = %indicator.user_id, conversation_id = %indicator.conversation_id))]
    async fn upsert(&self, indicator: &TypingIndicator) -> RepoResult<bool> {
        // xmax is zero only for a freshly inserted tuple
        sqlx::query_scalar::<_, bool>(
            r"
            INSERT INTO typing_indicators (user_id, conversation_id, started_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, conversation_id)
            DO UPDATE SET expires_at = EXCLUDED.expires_at
            RETURNING (xmax = 0) AS created
            ",
        )
        .bind(indicator.user_id.into_inner())
        .bind(indicator.conversation_id.into_inner())
        .bind(indicator.started_at)
        .bind(indicator.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: Snowflake, conversation_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM typing_indicators
            WHERE user_id = $1 AND conversation_id = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(conversation_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_if_expires_at(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
        expected_expires_at: i64,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM typing_indicators
            WHERE user_id = $1 AND conversation_id = $2 AND expires_at = $3
            ",
        )
        .bind(user_id.into_inner())
        .bind(conversation_id.into_inner())
        .bind(expected_expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
