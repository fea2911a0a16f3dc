//! Typing indicator entity <-> model mapper

use chat_core::entities::TypingIndicator;
use chat_core::value_objects::Snowflake;

use crate::models::TypingIndicatorModel;

impl From<TypingIndicatorModel> for TypingIndicator {
    fn from(model: TypingIndicatorModel) -> Self {
        TypingIndicator {
            user_id: Snowflake::new(model.user_id),
            conversation_id: Snowflake::new(model.conversation_id),
            started_at: model.started_at,
            expires_at: model.expires_at,
        }
    }
}
