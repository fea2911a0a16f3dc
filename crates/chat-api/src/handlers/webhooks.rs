//! Identity-provider sync handlers
//!
//! The identity provider owns accounts and pushes changes here.

use axum::extract::{Path, State};
use chat_service::{UpsertUserRequest, UserResponse, UserService};

use crate::extractors::{ValidatedJson, WebhookAuth};
use crate::response::{ApiJson, ApiResult, NoContent};
use crate::state::AppState;

/// Create or update a user
///
/// POST /webhooks/users
pub async fn upsert_user(
    State(state): State<AppState>,
    _webhook: WebhookAuth,
    ValidatedJson(request): ValidatedJson<UpsertUserRequest>,
) -> ApiResult<ApiJson<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.upsert(request).await?;
    Ok(ApiJson(user))
}

/// Remove a user; unknown ids are accepted
///
/// DELETE /webhooks/users/{external_id}
pub async fn remove_user(
    State(state): State<AppState>,
    _webhook: WebhookAuth,
    Path(external_id): Path<String>,
) -> ApiResult<NoContent> {
    let service = UserService::new(state.service_context());
    service.remove_by_external_id(&external_id).await?;
    Ok(NoContent)
}
