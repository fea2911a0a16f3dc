//! User handlers

use axum::extract::{Path, State};
use chat_service::{UserResponse, UserService};

use crate::extractors::AuthUser;
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.get_current(auth.user_id).await?;
    Ok(ApiJson(user))
}

/// Look up a user by username
///
/// GET /users/by-username/{username}
pub async fn get_user_by_username(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<ApiJson<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.get_by_username(&username).await?;
    Ok(ApiJson(user))
}
