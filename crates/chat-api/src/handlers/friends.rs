//! Friend handlers

use axum::extract::State;
use chat_service::{CreateFriendRequest, FriendResponse, FriendService, UpdateFriendRequest};

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created};
use crate::state::AppState;

/// Accepted friends
///
/// GET /friends
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<Vec<FriendResponse>>> {
    let service = FriendService::new(state.service_context());
    Ok(ApiJson(service.list_accepted(auth.user_id).await?))
}

/// Incoming pending requests
///
/// GET /friends/pending
pub async fn list_pending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<Vec<FriendResponse>>> {
    let service = FriendService::new(state.service_context());
    Ok(ApiJson(service.list_pending(auth.user_id).await?))
}

/// Send a friend request
///
/// POST /friends
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateFriendRequest>,
) -> ApiResult<Created<ApiJson<FriendResponse>>> {
    let service = FriendService::new(state.service_context());
    let friend = service.send_request(auth.user_id, &request.username).await?;
    Ok(Created(ApiJson(friend)))
}

/// Accept or reject a request
///
/// PATCH /friends/{friend_id}
pub async fn update_request(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(friend_id): SnowflakePath,
    ValidatedJson(request): ValidatedJson<UpdateFriendRequest>,
) -> ApiResult<ApiJson<FriendResponse>> {
    let service = FriendService::new(state.service_context());
    let friend = service
        .update_status(auth.user_id, friend_id, request.status)
        .await?;
    Ok(ApiJson(friend))
}
