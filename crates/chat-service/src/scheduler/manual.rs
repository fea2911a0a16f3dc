//! Scheduler that only records tasks

use async_trait::async_trait;
use chat_core::traits::{RepoResult, ScheduledTask, TaskScheduler};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy)]
struct Pending {
    run_at: i64,
    seq: u64,
    task: ScheduledTask,
}

/// Records scheduled tasks until the caller asks for the due ones
#[derive(Debug, Default)]
pub struct ManualScheduler {
    inner: Mutex<Queue>,
}

#[derive(Debug, Default)]
struct Queue {
    next_seq: u64,
    pending: Vec<Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return tasks due at `now`, earliest first
    pub fn take_due(&self, now: i64) -> Vec<ScheduledTask> {
        let mut queue = self.inner.lock();
        let (mut due, rest): (Vec<_>, Vec<_>) =
            queue.pending.drain(..).partition(|p| p.run_at <= now);
        queue.pending = rest;
        due.sort_by_key(|p| (p.run_at, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Every task not yet taken, with its due time
    pub fn pending(&self) -> Vec<(i64, ScheduledTask)> {
        let queue = self.inner.lock();
        let mut pending: Vec<_> = queue.pending.clone();
        pending.sort_by_key(|p| (p.run_at, p.seq));
        pending.into_iter().map(|p| (p.run_at, p.task)).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaskScheduler for ManualScheduler {
    async fn schedule_at(&self, run_at: i64, task: ScheduledTask) -> RepoResult<()> {
        let mut queue = self.inner.lock();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.pending.push(Pending { run_at, seq, task });
        Ok(())
    }
}
