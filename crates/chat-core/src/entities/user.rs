//! User entity - an account mirrored from the identity provider

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User entity
///
/// `external_id` is the subject assigned by the identity provider; `username`
/// is unique and is what other users type to find someone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub external_id: String,
    pub username: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, external_id: String, username: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            external_id,
            username,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a profile sync from the identity provider
    pub fn apply_profile(&mut self, username: String, image: Option<String>) {
        self.username = username;
        self.image = image;
        self.updated_at = Utc::now();
    }
}
