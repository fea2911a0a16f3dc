//! Conversation and participant database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub pair_key: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for conversation_participants table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub conversation_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
