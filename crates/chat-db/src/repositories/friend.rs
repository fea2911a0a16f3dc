//! PostgreSQL implementation of FriendRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Friend, FriendStatus};
use chat_core::error::DomainError;
use chat_core::traits::{FriendRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::FriendModel;

use super::error::{friend_request_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of FriendRepository
#[derive(Clone)]
pub struct PgFriendRepository {
    pool: PgPool,
}

impl PgFriendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_friends(models: Vec<FriendModel>) -> RepoResult<Vec<Friend>> {
    models.into_iter().map(Friend::try_from).collect()
}

#[async_trait]
impl FriendRepository for PgFriendRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Friend>> {
        let result = sqlx::query_as::<_, FriendModel>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friends
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Friend::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Friend>> {
        let result = sqlx::query_as::<_, FriendModel>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friends
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Friend::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_requester(
        &self,
        user_id: Snowflake,
        status: FriendStatus,
    ) -> RepoResult<Vec<Friend>> {
        let results = sqlx::query_as::<_, FriendModel>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friends
            WHERE requester_id = $1 AND status = $2
            ORDER BY id
            ",
        )
        .bind(user_id.into_inner())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_friends(results)
    }

    #[instrument(skip(self))]
    async fn find_by_addressee(
        &self,
        user_id: Snowflake,
        status: FriendStatus,
    ) -> RepoResult<Vec<Friend>> {
        let results = sqlx::query_as::<_, FriendModel>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friends
            WHERE addressee_id = $1 AND status = $2
            ORDER BY id
            ",
        )
        .bind(user_id.into_inner())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_friends(results)
    }

    #[instrument(skip(self, friend), fields(friend_id = %friend.id))]
    async fn create(&self, friend: &Friend) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO friends (id, requester_id, addressee_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(friend.id.into_inner())
        .bind(friend.requester_id.into_inner())
        .bind(friend.addressee_id.into_inner())
        .bind(friend.status.as_str())
        .bind(friend.created_at)
        .bind(friend.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::FriendRequestExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Snowflake, status: FriendStatus) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE friends
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(friend_request_not_found(id));
        }

        Ok(())
    }
}
