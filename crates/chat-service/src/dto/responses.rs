//! Response DTOs for API endpoints
//!
//! Ids are serialized as strings, timestamps as RFC 3339 except typing
//! deadlines, which stay in unix milliseconds.

use chat_core::FriendStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope for successful responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Conversation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// `None` when the other participant no longer exists
    pub other_user: Option<UserResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationCreatedResponse {
    pub conversation_id: String,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Friend Responses
// ============================================================================

/// A friend record seen from one side: `user` is the other party
#[derive(Debug, Clone, Serialize)]
pub struct FriendResponse {
    pub id: String,
    pub status: FriendStatus,
    /// Whether the viewer sent the request
    pub outgoing: bool,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Typing Responses
// ============================================================================

/// Result of a typing event
#[derive(Debug, Clone, Serialize)]
pub struct TypingResponse {
    pub conversation_id: String,
    /// Unix milliseconds
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypingUsersResponse {
    pub usernames: Vec<String>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub storage: String,
}

impl ReadinessResponse {
    pub fn ready(storage_healthy: bool) -> Self {
        Self {
            status: if storage_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                storage: if storage_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
