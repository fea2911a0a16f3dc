//! # chat-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! scheduler port used for deferred work.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    pair_key, Conversation, Friend, FriendStatus, Message, ParticipantEdge, TypingIndicator, User,
};
pub use error::DomainError;
pub use traits::{
    ConversationRepository, FriendRepository, MessageRepository, RepoResult, ScheduledTask,
    TaskScheduler, TypingIndicatorRepository, UserRepository,
};
pub use value_objects::{
    Clock, ManualClock, Snowflake, SnowflakeGenerator, SnowflakeParseError, SystemClock,
};
