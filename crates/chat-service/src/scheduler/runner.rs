//! Executes due tasks against the services

use chat_core::traits::ScheduledTask;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::manual::ManualScheduler;
use super::timer::TaskQueue;
use crate::services::{ServiceContext, ServiceResult, TypingService};

/// Dispatches each task to the service that owns it
#[derive(Debug, Clone)]
pub struct TaskRunner {
    ctx: ServiceContext,
}

impl TaskRunner {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one task. Handlers re-check current state, so running a task
    /// twice or late is harmless.
    #[instrument(skip(self), fields(task = task.name()))]
    pub async fn dispatch(&self, task: ScheduledTask) -> ServiceResult<()> {
        match task {
            ScheduledTask::ExpireTyping {
                user_id,
                conversation_id,
                expected_expires_at,
            } => {
                let removed = TypingService::new(&self.ctx)
                    .conditional_expire(user_id, conversation_id, expected_expires_at)
                    .await?;
                debug!(removed, "Typing expiry handled");
            }
        }
        Ok(())
    }

    /// Drain the queue until every sender is gone
    pub async fn run(self, mut queue: TaskQueue) {
        info!("Task runner started");
        while let Some(task) = queue.recv().await {
            if let Err(e) = self.dispatch(task).await {
                warn!(task = task.name(), error = %e, "Scheduled task failed");
            }
        }
        info!("Task runner stopped");
    }

    pub fn spawn(self, queue: TaskQueue) -> JoinHandle<()> {
        tokio::spawn(self.run(queue))
    }

    /// Dispatch everything `scheduler` holds that is due at `now`.
    /// Returns how many tasks ran.
    pub async fn run_due(&self, scheduler: &ManualScheduler, now: i64) -> ServiceResult<usize> {
        let due = scheduler.take_due(now);
        let count = due.len();
        for task in due {
            self.dispatch(task).await?;
        }
        Ok(count)
    }
}
