//! Typing indicator database model

use sqlx::FromRow;

/// Database model for typing_indicators table
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TypingIndicatorModel {
    pub user_id: i64,
    pub conversation_id: i64,
    /// Unix milliseconds
    pub started_at: i64,
    /// Unix milliseconds
    pub expires_at: i64,
}
