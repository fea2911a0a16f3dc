//! Delayed task execution
//!
//! [`TokioScheduler`] sleeps until a task is due and hands it to the
//! [`TaskRunner`] over a channel; the runner calls back into the services.
//! The channel keeps the scheduler free of any reference to the services
//! that schedule through it. [`ManualScheduler`] only records tasks, so tests
//! decide when time passes.

mod manual;
mod runner;
mod timer;

pub use manual::ManualScheduler;
pub use runner::TaskRunner;
pub use timer::{TaskQueue, TokioScheduler, DEFAULT_QUEUE_CAPACITY};
