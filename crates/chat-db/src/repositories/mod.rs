//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.
//! Each repository handles database operations for a specific domain entity.

mod conversation;
mod error;
mod friend;
mod message;
mod typing;
mod user;

pub use conversation::PgConversationRepository;
pub use friend::PgFriendRepository;
pub use message::PgMessageRepository;
pub use typing::PgTypingIndicatorRepository;
pub use user::PgUserRepository;
