//! Message entity - a message posted to a conversation

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    /// Opaque handle returned by attachment storage
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        attachment: Option<String>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            attachment,
            created_at: Utc::now(),
        }
    }

    /// Check if message carries an attachment
    #[inline]
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    /// Check if the given user sent this message
    #[inline]
    pub fn is_sent_by(&self, user_id: Snowflake) -> bool {
        self.sender_id == user_id
    }
}
