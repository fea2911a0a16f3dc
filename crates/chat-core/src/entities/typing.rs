//! Typing indicator entity - a short-lived "user is typing" marker

use crate::value_objects::Snowflake;

/// Presence entry for one user in one conversation.
///
/// Timestamps are unix milliseconds. `expires_at` is compared for exact
/// equality by the deferred removal, so it is never stored at a coarser or
/// finer precision than it was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingIndicator {
    pub user_id: Snowflake,
    pub conversation_id: Snowflake,
    pub started_at: i64,
    pub expires_at: i64,
}

impl TypingIndicator {
    pub fn new(user_id: Snowflake, conversation_id: Snowflake, now: i64, window_ms: i64) -> Self {
        Self {
            user_id,
            conversation_id,
            started_at: now,
            expires_at: now + window_ms,
        }
    }
}
