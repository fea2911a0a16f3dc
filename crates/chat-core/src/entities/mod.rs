//! Domain entities - core business objects

mod conversation;
mod friend;
mod message;
mod typing;
mod user;

pub use conversation::{pair_key, Conversation, ParticipantEdge};
pub use friend::{Friend, FriendStatus};
pub use message::Message;
pub use typing::TypingIndicator;
pub use user::User;
