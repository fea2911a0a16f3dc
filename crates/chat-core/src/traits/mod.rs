//! Ports implemented by the infrastructure layer

mod repositories;
mod scheduler;

pub use repositories::{
    ConversationRepository, FriendRepository, MessageRepository, RepoResult,
    TypingIndicatorRepository, UserRepository,
};
pub use scheduler::{ScheduledTask, TaskScheduler};
