//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chat_core::FriendStatus;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Longest message body accepted, in characters
pub const MAX_MESSAGE_LENGTH: usize = 4000;

// ============================================================================
// User Requests
// ============================================================================

/// Identity-provider user sync payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertUserRequest {
    #[validate(length(min = 1, max = 255, message = "External id must be 1-255 characters"))]
    pub external_id: String,

    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,

    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

// ============================================================================
// Conversation Requests
// ============================================================================

/// Open (or find) the conversation with another user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
}

// ============================================================================
// Message Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message content must be 1-4000 characters"))]
    pub content: String,

    /// Opaque handle returned by attachment storage
    #[validate(length(min = 1, max = 512, message = "Attachment handle must be 1-512 characters"))]
    pub attachment: Option<String>,
}

// ============================================================================
// Friend Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFriendRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
}

/// Answer a friend request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFriendRequest {
    #[validate(custom(function = "validate_answer_status"))]
    pub status: FriendStatus,
}

fn validate_answer_status(status: &FriendStatus) -> Result<(), ValidationError> {
    match status {
        FriendStatus::Accepted | FriendStatus::Rejected => Ok(()),
        FriendStatus::Pending => Err(ValidationError::new("invalid_status")
            .with_message("Status must be accepted or rejected".into())),
    }
}
