//! Axum extractors for request handling
//!
//! Custom extractors for authentication, webhook verification, validation,
//! and path ids.

mod auth;
mod path;
mod validated;
mod webhook;

pub use auth::AuthUser;
pub use path::SnowflakePath;
pub use validated::ValidatedJson;
pub use webhook::{WebhookAuth, WEBHOOK_SECRET_HEADER};
