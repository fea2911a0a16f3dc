//! Typing indicator handlers
//!
//! Clients call the arm endpoint on every keystroke; the indicator disappears
//! one typing window after the last call or when the user sends a message.

use axum::extract::State;
use chat_service::{TypingResponse, TypingService, TypingUsersResponse};

use crate::extractors::{AuthUser, SnowflakePath};
use crate::response::{ApiJson, ApiResult, NoContent};
use crate::state::AppState;

/// POST /dms/{conversation_id}/typing
pub async fn start_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
) -> ApiResult<ApiJson<TypingResponse>> {
    let service = TypingService::new(state.service_context());
    Ok(ApiJson(service.arm(auth.user_id, conversation_id).await?))
}

/// DELETE /dms/{conversation_id}/typing
pub async fn stop_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
) -> ApiResult<NoContent> {
    let service = TypingService::new(state.service_context());
    service
        .clear_as_participant(auth.user_id, conversation_id)
        .await?;
    Ok(NoContent)
}

/// Who else is typing
///
/// GET /dms/{conversation_id}/typing
pub async fn list_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
) -> ApiResult<ApiJson<TypingUsersResponse>> {
    let service = TypingService::new(state.service_context());
    Ok(ApiJson(
        service
            .list_typing_users(auth.user_id, conversation_id)
            .await?,
    ))
}
