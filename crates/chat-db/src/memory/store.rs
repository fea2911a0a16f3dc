//! `DashMap`-backed implementation of the repository traits

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use chat_core::entities::{
    Conversation, Friend, FriendStatus, Message, ParticipantEdge, TypingIndicator, User,
};
use chat_core::error::DomainError;
use chat_core::traits::{
    ConversationRepository, FriendRepository, MessageRepository, RepoResult,
    TypingIndicatorRepository, UserRepository,
};
use chat_core::value_objects::Snowflake;

type TypingKey = (Snowflake, Snowflake);

/// In-memory store for every record type
///
/// Locking rule: never hold an entry of one map while touching the same map
/// again. Holding an entry of one map while writing another is fine.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Snowflake, User>,
    usernames: DashMap<String, Snowflake>,
    external_ids: DashMap<String, Snowflake>,

    conversations: DashMap<Snowflake, Conversation>,
    pair_keys: DashMap<String, Snowflake>,
    /// conversation -> edges in insertion order
    members: DashMap<Snowflake, Vec<ParticipantEdge>>,
    /// user -> conversations in join order
    memberships: DashMap<Snowflake, Vec<Snowflake>>,

    typing: DashMap<TypingKey, TypingIndicator>,

    friends: DashMap<Snowflake, Friend>,
    friend_pairs: DashMap<TypingKey, Snowflake>,

    messages: DashMap<Snowflake, Message>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn unordered(a: Snowflake, b: Snowflake) -> TypingKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn sorted_by_id<T>(mut items: Vec<T>, id: impl Fn(&T) -> Snowflake) -> Vec<T> {
    items.sort_by_key(|item| id(item));
    items
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let Some(id) = self.usernames.get(username).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        let Some(id) = self.external_ids.get(external_id).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let Entry::Vacant(name_slot) = self.usernames.entry(user.username.clone()) else {
            return Err(DomainError::UsernameTaken);
        };
        let Entry::Vacant(external_slot) = self.external_ids.entry(user.external_id.clone())
        else {
            return Err(DomainError::UsernameTaken);
        };

        name_slot.insert(user.id);
        external_slot.insert(user.id);
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let Some(mut stored) = self.users.get_mut(&user.id) else {
            return Err(DomainError::UserNotFound(user.id));
        };

        if stored.username != user.username {
            match self.usernames.entry(user.username.clone()) {
                Entry::Occupied(owner) if *owner.get() != user.id => {
                    return Err(DomainError::UsernameTaken);
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
            self.usernames.remove(&stored.username);
            stored.username.clone_from(&user.username);
        }

        stored.image.clone_from(&user.image);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Err(DomainError::UserNotFound(id));
        };
        self.usernames.remove(&user.username);
        self.external_ids.remove(&user.external_id);

        // Same cascade as the relational schema; conversation rows stay
        if let Some((_, conversations)) = self.memberships.remove(&id) {
            for conversation_id in conversations {
                if let Some(mut edges) = self.members.get_mut(&conversation_id) {
                    edges.retain(|e| e.user_id != id);
                }
            }
        }
        self.typing.retain(|(user_id, _), _| *user_id != id);
        self.friends.retain(|_, f| !f.involves(id));
        self.friend_pairs.retain(|(a, b), _| *a != id && *b != id);
        self.messages.retain(|_, m| !m.is_sent_by(id));

        debug!(user_id = %id, "User removed with dependent records");
        Ok(())
    }
}

// ============================================================================
// Conversations
// ============================================================================

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.conversations.get(&id).map(|c| c.clone()))
    }

    async fn find_by_pair_key(&self, pair_key: &str) -> RepoResult<Option<Conversation>> {
        let Some(id) = self.pair_keys.get(pair_key).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.conversations.get(&id).map(|c| c.clone()))
    }

    async fn find_ids_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .memberships
            .get(&user_id)
            .map(|ids| ids.clone())
            .unwrap_or_default())
    }

    async fn find_participants(&self, conversation_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .members
            .get(&conversation_id)
            .map(|edges| edges.iter().map(|e| e.user_id).collect())
            .unwrap_or_default())
    }

    async fn is_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        Ok(self
            .members
            .get(&conversation_id)
            .is_some_and(|edges| edges.iter().any(|e| e.user_id == user_id)))
    }

    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        match self.pair_keys.entry(conversation.pair_key.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateConversation),
            Entry::Vacant(slot) => {
                // Row first, so a key lookup never misses the conversation
                self.conversations
                    .insert(conversation.id, conversation.clone());
                slot.insert(conversation.id);
                Ok(())
            }
        }
    }

    async fn add_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<()> {
        let added = {
            let mut edges = self.members.entry(conversation_id).or_default();
            if edges.iter().any(|e| e.user_id == user_id) {
                false
            } else {
                edges.push(ParticipantEdge::new(conversation_id, user_id));
                true
            }
        };

        if added {
            self.memberships
                .entry(user_id)
                .or_default()
                .push(conversation_id);
        }
        Ok(())
    }
}

// ============================================================================
// Typing indicators
// ============================================================================

#[async_trait]
impl TypingIndicatorRepository for MemoryStore {
    async fn find(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
    ) -> RepoResult<Option<TypingIndicator>> {
        Ok(self.typing.get(&(user_id, conversation_id)).map(|t| *t))
    }

    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Vec<TypingIndicator>> {
        let mut entries: Vec<TypingIndicator> = self
            .typing
            .iter()
            .filter(|t| t.conversation_id == conversation_id)
            .map(|t| *t)
            .collect();
        entries.sort_by_key(|t| (t.started_at, t.user_id));
        Ok(entries)
    }

    async fn upsert(&self, indicator: &TypingIndicator) -> RepoResult<bool> {
        match self
            .typing
            .entry((indicator.user_id, indicator.conversation_id))
        {
            Entry::Occupied(mut existing) => {
                existing.get_mut().expires_at = indicator.expires_at;
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(*indicator);
                Ok(true)
            }
        }
    }

    async fn delete(&self, user_id: Snowflake, conversation_id: Snowflake) -> RepoResult<bool> {
        Ok(self.typing.remove(&(user_id, conversation_id)).is_some())
    }

    async fn delete_if_expires_at(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
        expected_expires_at: i64,
    ) -> RepoResult<bool> {
        let removed = self
            .typing
            .remove_if(&(user_id, conversation_id), |_, t| {
                t.expires_at == expected_expires_at
            })
            .is_some();
        if !removed {
            debug!(%user_id, %conversation_id, expected_expires_at, "Typing entry not removed");
        }
        Ok(removed)
    }
}

// ============================================================================
// Friends
// ============================================================================

#[async_trait]
impl FriendRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Friend>> {
        Ok(self.friends.get(&id).map(|f| f.clone()))
    }

    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Friend>> {
        let Some(id) = self.friend_pairs.get(&unordered(a, b)).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.friends.get(&id).map(|f| f.clone()))
    }

    async fn find_by_requester(
        &self,
        user_id: Snowflake,
        status: FriendStatus,
    ) -> RepoResult<Vec<Friend>> {
        let found = self
            .friends
            .iter()
            .filter(|f| f.requester_id == user_id && f.status == status)
            .map(|f| f.clone())
            .collect();
        Ok(sorted_by_id(found, |f: &Friend| f.id))
    }

    async fn find_by_addressee(
        &self,
        user_id: Snowflake,
        status: FriendStatus,
    ) -> RepoResult<Vec<Friend>> {
        let found = self
            .friends
            .iter()
            .filter(|f| f.addressee_id == user_id && f.status == status)
            .map(|f| f.clone())
            .collect();
        Ok(sorted_by_id(found, |f: &Friend| f.id))
    }

    async fn create(&self, friend: &Friend) -> RepoResult<()> {
        match self
            .friend_pairs
            .entry(unordered(friend.requester_id, friend.addressee_id))
        {
            Entry::Occupied(_) => Err(DomainError::FriendRequestExists),
            Entry::Vacant(slot) => {
                slot.insert(friend.id);
                self.friends.insert(friend.id, friend.clone());
                Ok(())
            }
        }
    }

    async fn update_status(&self, id: Snowflake, status: FriendStatus) -> RepoResult<()> {
        let Some(mut friend) = self.friends.get_mut(&id) else {
            return Err(DomainError::FriendRequestNotFound(id));
        };
        friend.status = status;
        friend.updated_at = Utc::now();
        Ok(())
    }
}

// ============================================================================
// Messages
// ============================================================================

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let found = self
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| m.clone())
            .collect();
        Ok(sorted_by_id(found, |m: &Message| m.id))
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.messages
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::MessageNotFound(id))
    }
}
