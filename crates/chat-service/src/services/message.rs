//! Message service
//!
//! Sends, lists and deletes direct messages. Sending also clears the
//! sender's typing indicator.

use chat_core::entities::Message;
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{MessageResponse, SendMessageRequest, MAX_MESSAGE_LENGTH};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;
use super::typing::TypingService;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a message to a conversation the sender belongs to
    #[instrument(skip(self, request), fields(content_len = request.content.len()))]
    pub async fn send(
        &self,
        sender_id: Snowflake,
        conversation_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, sender_id)
            .await?;

        if request.content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LENGTH,
            }
            .into());
        }

        let message = Message::new(
            self.ctx.generate_id(),
            conversation_id,
            sender_id,
            request.content,
            request.attachment,
        );
        self.ctx.message_repo().create(&message).await?;

        // The message is stored; a stale indicator expires on its own
        if let Err(e) = TypingService::new(self.ctx)
            .clear(sender_id, conversation_id)
            .await
        {
            warn!(error = %e, "Failed to clear typing indicator after send");
        }

        info!(message_id = %message.id, "Message sent");
        Ok(message.into())
    }

    /// Messages of a conversation, oldest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        caller_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, caller_id)
            .await?;

        let messages = self
            .ctx
            .message_repo()
            .find_by_conversation(conversation_id)
            .await?;

        Ok(messages.iter().map(MessageResponse::from).collect())
    }

    /// Delete a message; only its sender may
    #[instrument(skip(self))]
    pub async fn delete(&self, caller_id: Snowflake, message_id: Snowflake) -> ServiceResult<()> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        if !message.is_sent_by(caller_id) {
            return Err(DomainError::NotMessageSender.into());
        }

        self.ctx.message_repo().delete(message_id).await?;

        info!(%message_id, "Message deleted");
        Ok(())
    }
}
