//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod dms;
pub mod friends;
pub mod health;
pub mod messages;
pub mod typing;
pub mod users;
pub mod webhooks;
