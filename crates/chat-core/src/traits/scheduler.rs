//! Delayed task scheduling port
//!
//! The scheduler runs each task once, no earlier than its due time, and may
//! deliver it more than once. There is no cancel: a task that is no longer
//! wanted has to turn itself into a no-op when it runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repositories::RepoResult;
use crate::value_objects::Snowflake;

/// Deferred work carrying the state it was scheduled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduledTask {
    /// Remove a typing indicator.
    ///
    /// With `expected_expires_at` set the removal only applies while the
    /// stored deadline is still exactly that value; without it the removal is
    /// unconditional.
    ExpireTyping {
        user_id: Snowflake,
        conversation_id: Snowflake,
        expected_expires_at: Option<i64>,
    },
}

impl ScheduledTask {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExpireTyping { .. } => "expire_typing",
        }
    }
}

#[async_trait]
pub trait TaskScheduler: Send + Sync {
    /// Run `task` no earlier than `run_at` (unix milliseconds)
    async fn schedule_at(&self, run_at: i64, task: ScheduledTask) -> RepoResult<()>;
}
