//! Typing service
//!
//! A typing indicator lives for one window after the latest keystroke. Every
//! arm moves `expires_at` forward and schedules a removal that carries the
//! `expires_at` it was scheduled for. The scheduler cannot cancel, so earlier
//! removals stay queued; when they fire they compare their snapshot with the
//! stored value and only the one matching the latest arm deletes.

use chat_core::entities::TypingIndicator;
use chat_core::traits::ScheduledTask;
use chat_core::Snowflake;
use tracing::{debug, instrument};

use crate::dto::{TypingResponse, TypingUsersResponse};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;

/// Typing service
pub struct TypingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TypingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark `user_id` as typing in the conversation for one window from now
    ///
    /// # Errors
    /// `ConversationNotFound` or `NotParticipant`; storage and scheduler
    /// failures
    #[instrument(skip(self))]
    pub async fn arm(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<TypingResponse> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        let indicator = TypingIndicator::new(
            user_id,
            conversation_id,
            self.ctx.now_millis(),
            self.ctx.typing_window_ms(),
        );

        // Removal goes in first: an entry is never stored without one. A
        // removal whose write never lands finds a different expires_at.
        self.ctx
            .scheduler()
            .schedule_at(
                indicator.expires_at,
                ScheduledTask::ExpireTyping {
                    user_id,
                    conversation_id,
                    expected_expires_at: Some(indicator.expires_at),
                },
            )
            .await?;

        let created = self.ctx.typing_repo().upsert(&indicator).await?;

        debug!(created, expires_at = indicator.expires_at, "Typing armed");

        Ok(TypingResponse {
            conversation_id: conversation_id.to_string(),
            expires_at: indicator.expires_at,
        })
    }

    /// Remove the indicator if it still expires at `expected_expires_at`.
    ///
    /// `None` removes whatever is there. Returns whether an entry was
    /// removed; a missing or re-armed entry is not an error.
    #[instrument(skip(self))]
    pub async fn conditional_expire(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
        expected_expires_at: Option<i64>,
    ) -> ServiceResult<bool> {
        let repo = self.ctx.typing_repo();
        let removed = match expected_expires_at {
            Some(expected) => {
                repo.delete_if_expires_at(user_id, conversation_id, expected)
                    .await?
            }
            None => repo.delete(user_id, conversation_id).await?,
        };
        Ok(removed)
    }

    /// Remove the indicator now, whatever removals are still queued
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Snowflake, conversation_id: Snowflake) -> ServiceResult<bool> {
        self.conditional_expire(user_id, conversation_id, None).await
    }

    /// Clear on behalf of a participant
    pub async fn clear_as_participant(
        &self,
        user_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<bool> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;
        self.clear(user_id, conversation_id).await
    }

    /// Usernames typing in the conversation, excluding the requester,
    /// earliest typist first
    #[instrument(skip(self))]
    pub async fn list_typing_users(
        &self,
        requester_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<TypingUsersResponse> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, requester_id)
            .await?;

        let indicators = self
            .ctx
            .typing_repo()
            .find_by_conversation(conversation_id)
            .await?;

        let mut usernames = Vec::with_capacity(indicators.len());
        for indicator in indicators.iter().filter(|i| i.user_id != requester_id) {
            // Removed between the two reads
            if let Some(user) = self.ctx.user_repo().find_by_id(indicator.user_id).await? {
                usernames.push(user.username);
            }
        }

        Ok(TypingUsersResponse { usernames })
    }
}
