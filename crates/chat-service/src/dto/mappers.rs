//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chat_core::entities::{Conversation, Friend, Message, User};

use super::responses::{ConversationResponse, FriendResponse, MessageResponse, UserResponse};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            image: user.image.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Conversation Mappers
// ============================================================================

/// Conversation plus the participant who is not the viewer
pub struct ConversationWithPeer {
    pub conversation: Conversation,
    pub peer: Option<User>,
}

impl From<ConversationWithPeer> for ConversationResponse {
    fn from(c: ConversationWithPeer) -> Self {
        Self {
            id: c.conversation.id.to_string(),
            created_at: c.conversation.created_at,
            other_user: c.peer.as_ref().map(UserResponse::from),
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.clone(),
            attachment: message.attachment.clone(),
            created_at: message.created_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}

// ============================================================================
// Friend Mappers
// ============================================================================

/// Friend record, the other party, and whether the viewer sent it
pub struct FriendWithUser {
    pub friend: Friend,
    pub other: User,
    pub outgoing: bool,
}

impl From<FriendWithUser> for FriendResponse {
    fn from(f: FriendWithUser) -> Self {
        Self {
            id: f.friend.id.to_string(),
            status: f.friend.status,
            outgoing: f.outgoing,
            user: UserResponse::from(f.other),
            created_at: f.friend.created_at,
        }
    }
}
