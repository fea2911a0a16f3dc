//! User service
//!
//! Users are owned by the identity provider and mirrored here through the
//! sync webhook.

use chat_common::AppError;
use chat_core::entities::User;
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{UpsertUserRequest, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create the user for `external_id`, or refresh its profile
    #[instrument(skip(self, request), fields(external_id = %request.external_id))]
    pub async fn upsert(&self, request: UpsertUserRequest) -> ServiceResult<UserResponse> {
        let repo = self.ctx.user_repo();

        if let Some(mut user) = repo.find_by_external_id(&request.external_id).await? {
            user.apply_profile(request.username, request.image);
            repo.update(&user).await?;
            info!(user_id = %user.id, "User updated");
            return Ok(user.into());
        }

        let mut user = User::new(
            self.ctx.generate_id(),
            request.external_id,
            request.username,
        );
        user.image = request.image;
        repo.create(&user).await?;

        info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    /// Remove the user mirrored from `external_id`. Returns whether one existed.
    #[instrument(skip(self))]
    pub async fn remove_by_external_id(&self, external_id: &str) -> ServiceResult<bool> {
        let repo = self.ctx.user_repo();
        let Some(user) = repo.find_by_external_id(external_id).await? else {
            return Ok(false);
        };

        repo.delete(user.id).await?;
        info!(user_id = %user.id, "User removed");
        Ok(true)
    }

    /// Map a token subject to the local user id
    ///
    /// # Errors
    /// `AppError::Unauthenticated` when no user carries that subject
    pub async fn authenticate(&self, external_id: &str) -> ServiceResult<Snowflake> {
        self.ctx
            .user_repo()
            .find_by_external_id(external_id)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| AppError::Unauthenticated.into())
    }

    /// The caller's own profile
    #[instrument(skip(self))]
    pub async fn get_current(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UsernameNotFound(username.to_string()))?;
        Ok(user.into())
    }
}
