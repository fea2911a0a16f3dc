//! Identity-provider webhook verification

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chat_common::AppError;

use crate::response::ApiError;
use crate::state::AppState;

/// Header carrying the shared webhook secret
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Proof that the request came from the identity provider.
///
/// Requests are refused when no secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct WebhookAuth;

#[async_trait]
impl<S> FromRequestParts<S> for WebhookAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Some(expected) = app_state.config().webhook.secret.as_deref() else {
            tracing::warn!("Webhook called but WEBHOOK_SECRET is not configured");
            return Err(AppError::InvalidWebhookSecret.into());
        };

        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided == Some(expected) {
            Ok(WebhookAuth)
        } else {
            Err(AppError::InvalidWebhookSecret.into())
        }
    }
}
