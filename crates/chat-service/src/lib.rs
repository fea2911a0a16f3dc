//! # chat-service
//!
//! Application layer: thread resolution, typing presence, friends, messages
//! and users, plus the schedulers that run deferred work.

pub mod dto;
pub mod scheduler;
pub mod services;

pub use dto::*;
pub use scheduler::{ManualScheduler, TaskQueue, TaskRunner, TokioScheduler};
pub use services::{
    ConversationService, FriendService, MessageService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, TypingService, UserService,
};
