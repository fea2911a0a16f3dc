//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{dms, friends, health, messages, typing, users, webhooks};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes, kept outside the rate limiter
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(webhook_routes())
        .merge(friend_routes())
        .merge(dm_routes())
        .merge(message_routes())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users/by-username/:username", get(users::get_user_by_username))
}

fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/users", post(webhooks::upsert_user))
        .route("/webhooks/users/:external_id", delete(webhooks::remove_user))
}

fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(friends::list_friends).post(friends::send_request))
        .route("/friends/pending", get(friends::list_pending))
        .route("/friends/:friend_id", patch(friends::update_request))
}

fn dm_routes() -> Router<AppState> {
    Router::new()
        .route("/dms", get(dms::list_conversations).post(dms::open_conversation))
        .route("/dms/:conversation_id", get(dms::get_conversation))
        // Messages
        .route(
            "/dms/:conversation_id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        // Typing indicator
        .route(
            "/dms/:conversation_id/typing",
            get(typing::list_typing)
                .post(typing::start_typing)
                .delete(typing::stop_typing),
        )
}

fn message_routes() -> Router<AppState> {
    Router::new().route("/messages/:message_id", delete(messages::delete_message))
}
