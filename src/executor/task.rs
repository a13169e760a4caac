//! Task representation and execution.

use crate::error::TaskError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

type TaskFn = Box<dyn FnOnce(usize) -> Result<(), TaskError> + Send + 'static>;

/// Internal task representation.
///
/// The body receives the id of the worker running it so failures can be
/// attributed without touching thread-locals.
pub(crate) struct Task {
    pub(crate) id: TaskId,
    func: TaskFn,
    pub(crate) enqueued_at: Instant,
}

impl Task {
    /// Wrap an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::from_fn(move |_| {
            f();
            Ok(())
        })
    }

    /// Wrap a closure whose `Err` is reported as a task failure.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: std::fmt::Display,
    {
        Self::from_fn(move |worker| f().map_err(|e| TaskError::failed(worker, e)))
    }

    pub(crate) fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(usize) -> Result<(), TaskError> + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            func: Box::new(f),
            enqueued_at: Instant::now(),
        }
    }

    /// Execute the task on behalf of `worker`.
    pub fn execute(self, worker: usize) -> Result<(), TaskError> {
        (self.func)(worker)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}
