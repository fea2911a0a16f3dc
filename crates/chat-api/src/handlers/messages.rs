//! Message handlers

use axum::extract::State;
use chat_service::{MessageResponse, MessageService, SendMessageRequest};

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Messages of a conversation, oldest first
///
/// GET /dms/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
) -> ApiResult<ApiJson<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    Ok(ApiJson(service.list(auth.user_id, conversation_id).await?))
}

/// Send a message
///
/// POST /dms/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<ApiJson<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let message = service.send(auth.user_id, conversation_id, request).await?;
    Ok(Created(ApiJson(message)))
}

/// Delete one of the caller's messages
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.delete(auth.user_id, message_id).await?;
    Ok(NoContent)
}
