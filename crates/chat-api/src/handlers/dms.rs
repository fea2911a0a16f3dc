//! Direct-message conversation handlers

use axum::extract::State;
use chat_service::{
    ConversationCreatedResponse, ConversationResponse, ConversationService,
    CreateConversationRequest,
};

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// The caller's conversations
///
/// GET /dms
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<Vec<ConversationResponse>>> {
    let service = ConversationService::new(state.service_context());
    Ok(ApiJson(service.list(auth.user_id).await?))
}

/// Find or open the conversation with another user.
/// Answers 200 whether or not the conversation had to be created.
///
/// POST /dms
pub async fn open_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConversationRequest>,
) -> ApiResult<ApiJson<ConversationCreatedResponse>> {
    let service = ConversationService::new(state.service_context());
    let conversation_id = service
        .resolve_with_username(auth.user_id, &request.username)
        .await?;

    Ok(ApiJson(ConversationCreatedResponse {
        conversation_id: conversation_id.to_string(),
    }))
}

/// One conversation
///
/// GET /dms/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(conversation_id): SnowflakePath,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let service = ConversationService::new(state.service_context());
    Ok(ApiJson(service.get(auth.user_id, conversation_id).await?))
}
