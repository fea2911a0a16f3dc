//! Friend service
//!
//! Friend requests between users: send, list, answer.

use chat_core::entities::{Friend, FriendStatus};
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{FriendResponse, FriendWithUser};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Friend service
pub struct FriendService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FriendService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a friend request to `username`
    ///
    /// # Errors
    /// `UsernameNotFound`, `CannotBefriendSelf`, or `FriendRequestExists` when
    /// a record between the two users already exists in either direction
    #[instrument(skip(self))]
    pub async fn send_request(
        &self,
        caller_id: Snowflake,
        username: &str,
    ) -> ServiceResult<FriendResponse> {
        let other = self
            .ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UsernameNotFound(username.to_string()))?;

        if other.id == caller_id {
            return Err(DomainError::CannotBefriendSelf.into());
        }

        if self
            .ctx
            .friend_repo()
            .find_between(caller_id, other.id)
            .await?
            .is_some()
        {
            return Err(DomainError::FriendRequestExists.into());
        }

        let friend = Friend::new_request(self.ctx.generate_id(), caller_id, other.id);
        self.ctx.friend_repo().create(&friend).await?;

        info!(friend_id = %friend.id, "Friend request sent");
        Ok(FriendWithUser {
            friend,
            other,
            outgoing: true,
        }
        .into())
    }

    /// Pending requests the caller received
    #[instrument(skip(self))]
    pub async fn list_pending(&self, caller_id: Snowflake) -> ServiceResult<Vec<FriendResponse>> {
        let incoming = self
            .ctx
            .friend_repo()
            .find_by_addressee(caller_id, FriendStatus::Pending)
            .await?;

        self.with_users(incoming, caller_id).await
    }

    /// Accepted friends in both directions, oldest first
    #[instrument(skip(self))]
    pub async fn list_accepted(&self, caller_id: Snowflake) -> ServiceResult<Vec<FriendResponse>> {
        let repo = self.ctx.friend_repo();
        let mut friends = repo
            .find_by_requester(caller_id, FriendStatus::Accepted)
            .await?;
        friends.extend(
            repo.find_by_addressee(caller_id, FriendStatus::Accepted)
                .await?,
        );
        friends.sort_by_key(|f| f.id);

        self.with_users(friends, caller_id).await
    }

    /// Accept or reject a request. Either party may answer.
    ///
    /// # Errors
    /// `FriendRequestNotFound`, `NotFriendRequestParty`, or a validation
    /// error for `Pending`
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        caller_id: Snowflake,
        friend_id: Snowflake,
        status: FriendStatus,
    ) -> ServiceResult<FriendResponse> {
        if status == FriendStatus::Pending {
            return Err(ServiceError::validation(
                "status must be accepted or rejected",
            ));
        }

        let mut friend = self
            .ctx
            .friend_repo()
            .find_by_id(friend_id)
            .await?
            .ok_or(DomainError::FriendRequestNotFound(friend_id))?;

        if !friend.involves(caller_id) {
            return Err(DomainError::NotFriendRequestParty.into());
        }

        self.ctx.friend_repo().update_status(friend_id, status).await?;
        friend.status = status;

        info!(%friend_id, %status, "Friend request answered");
        self.with_user(friend, caller_id).await
    }

    async fn with_user(&self, friend: Friend, viewer: Snowflake) -> ServiceResult<FriendResponse> {
        let other_id = friend.other_party(viewer);
        let other = self
            .ctx
            .user_repo()
            .find_by_id(other_id)
            .await?
            .ok_or(DomainError::UserNotFound(other_id))?;

        Ok(FriendWithUser {
            outgoing: friend.requester_id == viewer,
            friend,
            other,
        }
        .into())
    }

    async fn with_users(
        &self,
        friends: Vec<Friend>,
        viewer: Snowflake,
    ) -> ServiceResult<Vec<FriendResponse>> {
        let mut responses = Vec::with_capacity(friends.len());
        for friend in friends {
            match self.with_user(friend, viewer).await {
                Ok(response) => responses.push(response),
                // The other user was removed; their records go with them
                Err(ServiceError::Domain(DomainError::UserNotFound(_))) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chat_common::JwtService;
    use chat_core::traits::UserRepository;
    use chat_core::User;
    use chat_db::MemoryStore;

    use super::*;
    use crate::scheduler::ManualScheduler;

    async fn setup() -> (ServiceContext, Snowflake, Snowflake, Snowflake) {
        let store = MemoryStore::new_shared();
        let ctx = ServiceContext::builder()
            .store(store.clone())
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(Arc::new(JwtService::new("friend-tests", None, 60)))
            .build()
            .unwrap();

        let mut ids = Vec::new();
        for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
            let user = User::new(Snowflake::new(id), format!("ext_{id}"), name.to_string());
            UserRepository::create(store.as_ref(), &user).await.unwrap();
            ids.push(user.id);
        }
        (ctx, ids[0], ids[1], ids[2])
    }

    #[tokio::test]
    async fn test_request_accept_and_list() {
        let (ctx, alice, bob, _) = setup().await;
        let service = FriendService::new(&ctx);

        let sent = service.send_request(alice, "bob").await.unwrap();
        assert!(sent.outgoing);
        assert_eq!(sent.user.username, "bob");
        assert_eq!(sent.status, FriendStatus::Pending);

        let pending = service.list_pending(bob).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(!pending[0].outgoing);
        assert_eq!(pending[0].user.username, "alice");
        assert!(service.list_pending(alice).await.unwrap().is_empty());

        let friend_id: Snowflake = sent.id.parse().unwrap();
        let answered = service
            .update_status(bob, friend_id, FriendStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(answered.status, FriendStatus::Accepted);

        let of_alice = service.list_accepted(alice).await.unwrap();
        let of_bob = service.list_accepted(bob).await.unwrap();
        assert_eq!(of_alice[0].user.username, "bob");
        assert_eq!(of_bob[0].user.username, "alice");
        assert!(service.list_pending(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_errors() {
        let (ctx, alice, bob, _) = setup().await;
        let service = FriendService::new(&ctx);

        let err = service.send_request(alice, "ghost").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::UsernameNotFound(_))));

        let err = service.send_request(alice, "alice").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::CannotBefriendSelf)));

        service.send_request(alice, "bob").await.unwrap();
        let err = service.send_request(bob, "alice").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::FriendRequestExists)));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_only_parties_answer() {
        let (ctx, alice, _, carol) = setup().await;
        let service = FriendService::new(&ctx);

        let sent = service.send_request(alice, "bob").await.unwrap();
        let friend_id: Snowflake = sent.id.parse().unwrap();

        let err = service
            .update_status(carol, friend_id, FriendStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotFriendRequestParty)));

        let err = service
            .update_status(alice, friend_id, FriendStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = service
            .update_status(alice, Snowflake::new(77), FriendStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::FriendRequestNotFound(_))));

        let rejected = service
            .update_status(alice, friend_id, FriendStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, FriendStatus::Rejected);
        assert!(rejected.outgoing);
    }
}
