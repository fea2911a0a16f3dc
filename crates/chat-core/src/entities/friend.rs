//! Friend entity - a friend request and its outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Friend request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse from the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Friend relationship. `requester_id` sent the request to `addressee_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    pub id: Snowflake,
    pub requester_id: Snowflake,
    pub addressee_id: Snowflake,
    pub status: FriendStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friend {
    /// Create a new pending request
    pub fn new_request(id: Snowflake, requester_id: Snowflake, addressee_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            requester_id,
            addressee_id,
            status: FriendStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the user is one of the two parties
    #[inline]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }

    /// The party that is not `user_id`
    pub fn other_party(&self, user_id: Snowflake) -> Snowflake {
        if self.requester_id == user_id {
            self.addressee_id
        } else {
            self.requester_id
        }
    }
}
