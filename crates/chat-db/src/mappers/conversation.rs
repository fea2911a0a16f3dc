//! Conversation entity <-> model mapper

use chat_core::entities::{Conversation, ParticipantEdge};
use chat_core::value_objects::Snowflake;

use crate::models::{ConversationModel, ParticipantModel};

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            pair_key: model.pair_key,
            created_at: model.created_at,
        }
    }
}

impl From<ParticipantModel> for ParticipantEdge {
    fn from(model: ParticipantModel) -> Self {
        ParticipantEdge {
            conversation_id: Snowflake::new(model.conversation_id),
            user_id: Snowflake::new(model.user_id),
            created_at: model.created_at,
        }
    }
}
