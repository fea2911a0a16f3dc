//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every write here touches a single record (or
//! a single row of a join table) and is atomic on its own; nothing in this
//! file promises atomicity across calls.

use async_trait::async_trait;

use crate::entities::{Conversation, Friend, FriendStatus, Message, TypingIndicator, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by identity-provider subject
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Update username and image
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// IDs of every conversation the user participates in, in the order the
    /// user joined them
    async fn find_ids_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// User IDs with an edge to the conversation
    async fn find_participants(&self, conversation_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Find the conversation holding a pair key
    async fn find_by_pair_key(&self, pair_key: &str) -> RepoResult<Option<Conversation>>;

    /// Check for a (conversation, user) edge
    async fn is_participant(&self, conversation_id: Snowflake, user_id: Snowflake)
        -> RepoResult<bool>;

    /// Insert a conversation row.
    ///
    /// Fails with `DomainError::DuplicateConversation` when a conversation with
    /// the same `pair_key` already exists.
    async fn create(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Insert a participant edge (idempotent)
    async fn add_participant(&self, conversation_id: Snowflake, user_id: Snowflake)
        -> RepoResult<()>;
}

// ============================================================================
// Typing Indicator Repository
// ============================================================================

#[async_trait]
pub trait TypingIndicatorRepository: Send + Sync {
    /// Find the entry for (user, conversation)
    async fn find(&self, user_id: Snowflake, conversation_id: Snowflake)
        -> RepoResult<Option<TypingIndicator>>;

    /// All entries in a conversation, oldest `started_at` first
    async fn find_by_conversation(&self, conversation_id: Snowflake)
        -> RepoResult<Vec<TypingIndicator>>;

    /// Insert the entry, or move `expires_at` of the existing one forward.
    ///
    /// `started_at` of an existing entry is kept. Returns `true` when a new
    /// entry was created.
    async fn upsert(&self, indicator: &TypingIndicator) -> RepoResult<bool>;

    /// Delete unconditionally. Returns whether an entry was removed.
    async fn delete(&self, user_id: Snowflake, conversation_id: Snowflake) -> RepoResult<bool>;

    /// Delete only if the stored `expires_at` equals `expected_expires_at`.
    /// Returns whether an entry was removed.
    async fn delete_if_expires_at(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
        expected_expires_at: i64,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Friend Repository
// ============================================================================

#[async_trait]
pub trait FriendRepository: Send + Sync {
    /// Find friend record by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Friend>>;

    /// Find a record between two users in either direction
    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Friend>>;

    /// Records the user sent, filtered by status
    async fn find_by_requester(&self, user_id: Snowflake, status: FriendStatus)
        -> RepoResult<Vec<Friend>>;

    /// Records the user received, filtered by status
    async fn find_by_addressee(&self, user_id: Snowflake, status: FriendStatus)
        -> RepoResult<Vec<Friend>>;

    /// Create a friend record
    async fn create(&self, friend: &Friend) -> RepoResult<()>;

    /// Set the status of a friend record
    async fn update_status(&self, id: Snowflake, status: FriendStatus) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Messages of a conversation, oldest first
    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}
