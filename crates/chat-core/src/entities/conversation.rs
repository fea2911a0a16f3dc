//! Conversation entity - a one-to-one direct message thread

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Direct message thread between exactly two users.
///
/// Conversations are immutable once created. `pair_key` identifies the
/// unordered pair of participants and is unique across all conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub pair_key: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation for the pair `{a, b}`
    pub fn new(id: Snowflake, a: Snowflake, b: Snowflake) -> Self {
        Self {
            id,
            pair_key: pair_key(a, b),
            created_at: Utc::now(),
        }
    }
}

/// Membership edge linking a user to a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantEdge {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl ParticipantEdge {
    pub fn new(conversation_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            conversation_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Order-independent key for a pair of users: `pair_key(a, b) == pair_key(b, a)`
pub fn pair_key(a: Snowflake, b: Snowflake) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}:{high}")
}
