//! Tokio-backed scheduler

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_core::traits::{RepoResult, ScheduledTask, TaskScheduler};
use chat_core::{Clock, DomainError};
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Buffered tasks between timers and the runner
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Receiving side handed to [`super::TaskRunner`]
pub type TaskQueue = mpsc::Receiver<ScheduledTask>;

/// One timer per task; due tasks are pushed onto the queue
///
/// Tasks live only in this process. A restart drops everything still
/// waiting, which for typing expiry leaves entries that the next arm or
/// message send cleans up.
#[derive(Clone)]
pub struct TokioScheduler {
    clock: Arc<dyn Clock>,
    sender: mpsc::Sender<ScheduledTask>,
}

impl TokioScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> (Self, TaskQueue) {
        Self::with_capacity(clock, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(clock: Arc<dyn Clock>, capacity: usize) -> (Self, TaskQueue) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { clock, sender }, receiver)
    }
}

#[async_trait]
impl TaskScheduler for TokioScheduler {
    async fn schedule_at(&self, run_at: i64, task: ScheduledTask) -> RepoResult<()> {
        if self.sender.is_closed() {
            return Err(DomainError::SchedulerError("task runner is not running".into()));
        }

        let delay = u64::try_from(run_at - self.clock.now_millis()).unwrap_or(0);
        let sender = self.sender.clone();
        trace!(task = task.name(), run_at, delay_ms = delay, "Task scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if sender.send(task).await.is_err() {
                warn!(task = task.name(), "Task runner gone, dropping task");
            }
        });

        Ok(())
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("closed", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}
