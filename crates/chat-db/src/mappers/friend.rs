//! Friend entity <-> model mapper

use chat_core::entities::{Friend, FriendStatus};
use chat_core::error::DomainError;
use chat_core::value_objects::Snowflake;

use crate::models::FriendModel;

impl TryFrom<FriendModel> for Friend {
    type Error = DomainError;

    fn try_from(model: FriendModel) -> Result<Self, Self::Error> {
        let status = FriendStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("Unknown friend status: {}", model.status))
        })?;

        Ok(Friend {
            id: Snowflake::new(model.id),
            requester_id: Snowflake::new(model.requester_id),
            addressee_id: Snowflake::new(model.addressee_id),
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
