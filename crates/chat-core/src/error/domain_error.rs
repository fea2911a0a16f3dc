//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("User not found: {0}")]
    UsernameNotFound(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Friend request not found: {0}")]
    FriendRequestNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("You cannot add yourself as a friend")]
    CannotBefriendSelf,

    #[error("You cannot open a conversation with yourself")]
    CannotMessageSelf,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of this conversation")]
    NotParticipant,

    #[error("Not the sender of this message")]
    NotMessageSender,

    #[error("Not a party to this friend request")]
    NotFriendRequestParty,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("A conversation between these users already exists")]
    DuplicateConversation,

    #[error("A friend request between these users already exists")]
    FriendRequestExists,

    #[error("Username already in use")]
    UsernameTaken,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) | Self::UsernameNotFound(_) => "UNKNOWN_USER",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::FriendRequestNotFound(_) => "UNKNOWN_FRIEND_REQUEST",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::CannotBefriendSelf => "CANNOT_BEFRIEND_SELF",
            Self::CannotMessageSelf => "CANNOT_MESSAGE_SELF",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",
            Self::NotFriendRequestParty => "NOT_FRIEND_REQUEST_PARTY",

            // Conflict
            Self::DuplicateConversation => "DUPLICATE_CONVERSATION",
            Self::FriendRequestExists => "FRIEND_REQUEST_EXISTS",
            Self::UsernameTaken => "USERNAME_TAKEN",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::SchedulerError(_) => "SCHEDULER_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::UsernameNotFound(_)
                | Self::ConversationNotFound(_)
                | Self::MessageNotFound(_)
                | Self::FriendRequestNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::CannotBefriendSelf
                | Self::CannotMessageSelf
                | Self::ContentTooLong { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotParticipant | Self::NotMessageSender | Self::NotFriendRequestParty
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateConversation | Self::FriendRequestExists | Self::UsernameTaken
        )
    }
}
