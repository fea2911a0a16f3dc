//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of a request.

pub mod context;
pub mod conversation;
pub mod error;
pub mod friend;
pub mod message;
pub mod typing;
pub mod user;

pub use context::{ServiceContext, ServiceContextBuilder, DEFAULT_TYPING_WINDOW_MS};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use friend::FriendService;
pub use message::MessageService;
pub use typing::TypingService;
pub use user::UserService;
