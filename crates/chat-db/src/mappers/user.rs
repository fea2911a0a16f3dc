//! User entity <-> model mapper

use chat_core::entities::User;
use chat_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            external_id: model.external_id,
            username: model.username,
            image: model.image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
