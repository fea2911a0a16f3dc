//! Database models - SQLx-compatible structs for PostgreSQL tables

mod conversation;
mod friend;
mod message;
mod typing;
mod user;

pub use conversation::{ConversationModel, ParticipantModel};
pub use friend::FriendModel;
pub use message::MessageModel;
pub use typing::TypingIndicatorModel;
pub use user::UserModel;
