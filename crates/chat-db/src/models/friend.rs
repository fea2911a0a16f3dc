//! Friend database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for friends table
#[derive(Debug, Clone, FromRow)]
pub struct FriendModel {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

