//! Conversation service
//!
//! Finds or creates the single conversation between two users and serves
//! conversation listings.
//!
//! Resolution looks for a conversation both users already belong to. When
//! there is none it creates one; the conversation's `pair_key` is unique, so
//! of two concurrent creators exactly one succeeds and the other resolves
//! again to pick up the winner's conversation.
//!
//! A conversation row whose edges never landed (a failed insert, a racing
//! creator not done yet) still owns the pair key. Resolution after a
//! conflict loads that row by key and writes both edges, which are
//! idempotent, so the pair always converges on one usable conversation.

use std::collections::HashSet;

use chat_core::entities::{pair_key, Conversation};
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{ConversationResponse, ConversationWithPeer};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the conversation between `a` and `b`, creating it if needed.
    ///
    /// Zero writes when the conversation exists; otherwise one conversation
    /// row and two participant edges.
    #[instrument(skip(self))]
    pub async fn resolve(&self, a: Snowflake, b: Snowflake) -> ServiceResult<Snowflake> {
        if let Some(existing) = self.find_shared(a, b).await? {
            return Ok(existing);
        }

        match self.create_thread(a, b).await {
            Ok(id) => Ok(id),
            Err(DomainError::DuplicateConversation) => {
                warn!(%a, %b, "Conversation already exists for pair, resolving again");
                if let Some(existing) = self.find_shared(a, b).await? {
                    return Ok(existing);
                }
                self.complete_existing(a, b).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the conversation between the caller and `username`
    ///
    /// # Errors
    /// `UsernameNotFound` for an unknown user, `CannotMessageSelf` when the
    /// caller names themselves
    #[instrument(skip(self))]
    pub async fn resolve_with_username(
        &self,
        caller_id: Snowflake,
        username: &str,
    ) -> ServiceResult<Snowflake> {
        let other = self
            .ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UsernameNotFound(username.to_string()))?;

        if other.id == caller_id {
            return Err(DomainError::CannotMessageSelf.into());
        }

        self.resolve(caller_id, other.id).await
    }

    /// The caller's conversations in the order they joined them
    #[instrument(skip(self))]
    pub async fn list(&self, caller_id: Snowflake) -> ServiceResult<Vec<ConversationResponse>> {
        let ids = self.ctx.conversation_repo().find_ids_by_user(caller_id).await?;

        let mut conversations: Vec<ConversationResponse> = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(conversation) = self.ctx.conversation_repo().find_by_id(id).await? {
                conversations.push(self.with_peer(conversation, caller_id).await?.into());
            }
        }
        Ok(conversations)
    }

    /// One conversation, seen by a participant
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        caller_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let conversation = self.require_participant(conversation_id, caller_id).await?;
        Ok(self.with_peer(conversation, caller_id).await?.into())
    }

    /// Load a conversation and check that `user_id` belongs to it
    ///
    /// # Errors
    /// `ConversationNotFound` or `NotParticipant`
    pub async fn require_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;

        if !self
            .ctx
            .conversation_repo()
            .is_participant(conversation_id, user_id)
            .await?
        {
            return Err(DomainError::NotParticipant.into());
        }

        Ok(conversation)
    }

    /// First conversation of `a` (in `a`'s order) that `b` also belongs to
    async fn find_shared(&self, a: Snowflake, b: Snowflake) -> ServiceResult<Option<Snowflake>> {
        let repo = self.ctx.conversation_repo();
        let of_a = repo.find_ids_by_user(a).await?;
        if of_a.is_empty() {
            return Ok(None);
        }
        let of_b: HashSet<Snowflake> = repo.find_ids_by_user(b).await?.into_iter().collect();

        Ok(of_a.into_iter().find(|id| of_b.contains(id)))
    }

    /// Write the missing edges of the conversation owning the pair key
    async fn complete_existing(&self, a: Snowflake, b: Snowflake) -> ServiceResult<Snowflake> {
        let repo = self.ctx.conversation_repo();
        let conversation = repo
            .find_by_pair_key(&pair_key(a, b))
            .await?
            .ok_or(ServiceError::Domain(DomainError::DuplicateConversation))?;

        repo.add_participant(conversation.id, a).await?;
        repo.add_participant(conversation.id, b).await?;

        info!(conversation_id = %conversation.id, %a, %b, "Conversation edges completed");
        Ok(conversation.id)
    }

    async fn create_thread(&self, a: Snowflake, b: Snowflake) -> Result<Snowflake, DomainError> {
        let repo = self.ctx.conversation_repo();
        let conversation = Conversation::new(self.ctx.generate_id(), a, b);

        repo.create(&conversation).await?;
        repo.add_participant(conversation.id, a).await?;
        repo.add_participant(conversation.id, b).await?;

        info!(conversation_id = %conversation.id, %a, %b, "Conversation created");
        Ok(conversation.id)
    }

    async fn with_peer(
        &self,
        conversation: Conversation,
        viewer: Snowflake,
    ) -> ServiceResult<ConversationWithPeer> {
        let participants = self
            .ctx
            .conversation_repo()
            .find_participants(conversation.id)
            .await?;

        let peer = match participants.into_iter().find(|id| *id != viewer) {
            Some(id) => self.ctx.user_repo().find_by_id(id).await?,
            None => None,
        };

        Ok(ConversationWithPeer { conversation, peer })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chat_common::JwtService;
    use chat_core::traits::{ConversationRepository, RepoResult, UserRepository};
    use chat_core::User;
    use chat_db::MemoryStore;

    use super::*;
    use crate::scheduler::ManualScheduler;

    fn context_with(store: Arc<MemoryStore>) -> ServiceContext {
        ServiceContext::builder()
            .store(store)
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(Arc::new(JwtService::new("conversation-tests", None, 60)))
            .build()
            .unwrap()
    }

    async fn add_user(store: &MemoryStore, id: i64, name: &str) -> Snowflake {
        let user = User::new(Snowflake::new(id), format!("ext_{id}"), name.to_string());
        UserRepository::create(store, &user).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn test_resolve_is_symmetric_and_stable() {
        let store = MemoryStore::new_shared();
        let ctx = context_with(store.clone());
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;
        let service = ConversationService::new(&ctx);

        let first = service.resolve(alice, bob).await.unwrap();
        assert_eq!(service.resolve(bob, alice).await.unwrap(), first);
        assert_eq!(service.resolve(alice, bob).await.unwrap(), first);

        assert_eq!(store.find_ids_by_user(alice).await.unwrap(), vec![first]);
        assert_eq!(store.find_participants(first).await.unwrap(), vec![alice, bob]);
    }

    #[tokio::test]
    async fn test_distinct_pairs_get_distinct_conversations() {
        let store = MemoryStore::new_shared();
        let ctx = context_with(store.clone());
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;
        let carol = add_user(&store, 3, "carol").await;
        let service = ConversationService::new(&ctx);

        let ab = service.resolve(alice, bob).await.unwrap();
        let ac = service.resolve(alice, carol).await.unwrap();
        let bc = service.resolve(bob, carol).await.unwrap();
        assert_ne!(ab, ac);
        assert_ne!(ab, bc);
        assert_ne!(ac, bc);

        assert_eq!(service.resolve(carol, alice).await.unwrap(), ac);
        assert_eq!(store.find_ids_by_user(alice).await.unwrap(), vec![ab, ac]);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_conversation() {
        let store = MemoryStore::new_shared();
        let ctx = context_with(store.clone());
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ctx = ctx.clone();
                let (x, y) = if i % 2 == 0 { (alice, bob) } else { (bob, alice) };
                tokio::spawn(async move { ConversationService::new(&ctx).resolve(x, y).await })
            })
            .collect();

        let mut resolved = HashSet::new();
        for handle in handles {
            resolved.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(resolved.len(), 1);
        let stored = store.find_ids_by_user(alice).await.unwrap();
        assert_eq!(stored.len(), 1, "exactly one conversation per pair");
        assert!(resolved.contains(&stored[0]));
        assert_eq!(store.find_ids_by_user(bob).await.unwrap(), stored);
    }

    /// Hides existing conversations from the first lookup so resolution takes
    /// the creation path and hits the pair-key conflict
    struct StaleReads {
        inner: Arc<MemoryStore>,
        hide: AtomicUsize,
    }

    #[async_trait]
    impl ConversationRepository for StaleReads {
        async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
            ConversationRepository::find_by_id(self.inner.as_ref(), id).await
        }

        async fn find_ids_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
            if self
                .hide
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Ok(Vec::new());
            }
            self.inner.find_ids_by_user(user_id).await
        }

        async fn find_by_pair_key(&self, key: &str) -> RepoResult<Option<Conversation>> {
            self.inner.find_by_pair_key(key).await
        }

        async fn find_participants(&self, id: Snowflake) -> RepoResult<Vec<Snowflake>> {
            self.inner.find_participants(id).await
        }

        async fn is_participant(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
            self.inner.is_participant(id, user_id).await
        }

        async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
            ConversationRepository::create(self.inner.as_ref(), conversation).await
        }

        async fn add_participant(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
            self.inner.add_participant(id, user_id).await
        }
    }

    /// Fails the n-th edge insert once, leaving a conversation row without
    /// all of its edges
    struct FlakyEdges {
        inner: Arc<MemoryStore>,
        calls: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl ConversationRepository for FlakyEdges {
        async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
            ConversationRepository::find_by_id(self.inner.as_ref(), id).await
        }

        async fn find_ids_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
            self.inner.find_ids_by_user(user_id).await
        }

        async fn find_by_pair_key(&self, key: &str) -> RepoResult<Option<Conversation>> {
            self.inner.find_by_pair_key(key).await
        }

        async fn find_participants(&self, id: Snowflake) -> RepoResult<Vec<Snowflake>> {
            self.inner.find_participants(id).await
        }

        async fn is_participant(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
            self.inner.is_participant(id, user_id).await
        }

        async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
            ConversationRepository::create(self.inner.as_ref(), conversation).await
        }

        async fn add_participant(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(DomainError::DatabaseError("transient".into()));
            }
            self.inner.add_participant(id, user_id).await
        }
    }

    fn context_with_edges(store: Arc<MemoryStore>, fail_on: usize) -> ServiceContext {
        let flaky = Arc::new(FlakyEdges {
            inner: store.clone(),
            calls: AtomicUsize::new(0),
            fail_on,
        });
        ServiceContext::builder()
            .store(store)
            .conversation_repo(flaky)
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(Arc::new(JwtService::new("conversation-tests", None, 60)))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_edge_insert_recovers_on_next_resolve() {
        let store = MemoryStore::new_shared();
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;
        let ctx = context_with_edges(store.clone(), 2);
        let service = ConversationService::new(&ctx);

        let err = service.resolve(alice, bob).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::DatabaseError(_))));
        assert!(store.find_ids_by_user(bob).await.unwrap().is_empty());

        let recovered = service.resolve(alice, bob).await.unwrap();
        assert_eq!(service.resolve(bob, alice).await.unwrap(), recovered);
        assert_eq!(service.resolve(alice, bob).await.unwrap(), recovered);

        assert_eq!(store.find_ids_by_user(alice).await.unwrap(), vec![recovered]);
        assert_eq!(store.find_ids_by_user(bob).await.unwrap(), vec![recovered]);
        assert_eq!(
            store.find_participants(recovered).await.unwrap(),
            vec![alice, bob]
        );
    }

    #[tokio::test]
    async fn test_edgeless_conversation_recovered_from_either_side() {
        let store = MemoryStore::new_shared();
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;
        let ctx = context_with_edges(store.clone(), 1);
        let service = ConversationService::new(&ctx);

        service.resolve(alice, bob).await.unwrap_err();
        assert!(store.find_ids_by_user(alice).await.unwrap().is_empty());

        let recovered = service.resolve(bob, alice).await.unwrap();
        assert_eq!(service.resolve(alice, bob).await.unwrap(), recovered);
        assert_eq!(store.find_participants(recovered).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_creation_conflict_resolves_again() {
        let store = MemoryStore::new_shared();
        let alice = add_user(&store, 1, "alice").await;
        let bob = add_user(&store, 2, "bob").await;

        let existing = ConversationService::new(&context_with(store.clone()))
            .resolve(alice, bob)
            .await
            .unwrap();

        let stale = Arc::new(StaleReads {
            inner: store.clone(),
            hide: AtomicUsize::new(1),
        });
        let ctx = ServiceContext::builder()
            .store(store.clone())
            .conversation_repo(stale)
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(Arc::new(JwtService::new("conversation-tests", None, 60)))
            .build()
            .unwrap();

        let resolved = ConversationService::new(&ctx).resolve(alice, bob).await.unwrap();
        assert_eq!(resolved, existing);
        assert_eq!(store.find_ids_by_user(bob).await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn test_resolve_with_username_errors() {
        let store = MemoryStore::new_shared();
        let ctx = context_with(store.clone());
        let alice = add_user(&store, 1, "alice").await;
        let service = ConversationService::new(&ctx);

        let err = service.resolve_with_username(alice, "nobody").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::UsernameNotFound(_))));
        assert_eq!(err.status_code(), 404);

        let err = service.resolve_with_username(alice, "alice").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::CannotMessageSelf)));
        assert!(store.find_ids_by_user(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_get_show_peer() {
        let store = MemoryStore::new_shared();
        let ctx = context_with(store.clone());
        let alice = add_user(&store, 1, "alice").await;
        add_user(&store, 2, "bob").await;
        let carol = add_user(&store, 3, "carol").await;
        let service = ConversationService::new(&ctx);

        let id = service.resolve_with_username(alice, "bob").await.unwrap();

        let listed = service.list(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id.to_string());
        assert_eq!(listed[0].other_user.as_ref().unwrap().username, "bob");

        let seen_by_bob = service.get(Snowflake::new(2), id).await.unwrap();
        assert_eq!(seen_by_bob.other_user.unwrap().username, "alice");

        let err = service.get(carol, id).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotParticipant)));
        assert_eq!(err.status_code(), 403);

        let err = service.get(alice, Snowflake::new(404)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::ConversationNotFound(_))));
    }
}
