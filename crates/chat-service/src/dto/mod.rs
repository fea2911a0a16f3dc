//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateConversationRequest, CreateFriendRequest, SendMessageRequest, UpdateFriendRequest,
    UpsertUserRequest, MAX_MESSAGE_LENGTH,
};

pub use responses::{
    ApiResponse, ConversationCreatedResponse, ConversationResponse, FriendResponse,
    HealthChecks, HealthResponse, MessageResponse, ReadinessResponse, TypingResponse,
    TypingUsersResponse, UserResponse,
};

pub use mappers::{ConversationWithPeer, FriendWithUser};
