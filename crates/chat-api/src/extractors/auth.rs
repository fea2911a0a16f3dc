//! Authentication extractor
//!
//! Validates the bearer token and maps its subject to a local user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chat_common::AppError;
use chat_core::Snowflake;
use chat_service::UserService;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

impl AuthUser {
    pub fn new(user_id: Snowflake) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let claims = app_state
            .jwt_service()
            .validate_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected bearer token");
                e
            })?;

        // A valid token for a user that was never synced is still unauthenticated
        let user_id = UserService::new(app_state.service_context())
            .authenticate(&claims.sub)
            .await?;

        Ok(AuthUser::new(user_id))
    }
}
