//! Request bodies and response shapes used by the API tests

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique suffix for usernames and external ids
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// `{"data": ...}` envelope
#[derive(Debug, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

/// Identity-provider sync payload
#[derive(Debug, Serialize)]
pub struct SyncUser {
    pub external_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SyncUser {
    pub fn named(prefix: &str) -> Self {
        let suffix = unique_suffix();
        Self {
            external_id: format!("idp|{prefix}{suffix}"),
            username: format!("{prefix}{suffix}"),
            image: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserBody {
    pub id: String,
    pub username: String,
    pub image: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct OpenConversation<'a> {
    pub username: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ConversationCreated {
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationBody {
    pub id: String,
    pub created_at: String,
    pub other_user: Option<UserBody>,
}

#[derive(Debug, Serialize)]
pub struct NewMessage<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypingBody {
    pub conversation_id: String,
    pub expires_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct TypingUsersBody {
    pub usernames: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FriendRequestBody<'a> {
    pub username: &'a str,
}

#[derive(Debug, Serialize)]
pub struct FriendAnswer<'a> {
    pub status: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct FriendBody {
    pub id: String,
    pub status: String,
    pub outgoing: bool,
    pub user: UserBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
