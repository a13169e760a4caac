use std::fmt;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Errors raised while building a pool.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("worker count too large: {0} (max {max})", max = crate::config::MAX_WORKERS)]
    TooManyWorkers(usize),

    #[error("stack_size must be > 0")]
    InvalidStackSize,

    #[error("thread_name_prefix must not be empty")]
    EmptyThreadName,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Returned by submission once the pool has stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pool is closed")]
pub struct PoolClosedError;

/// A failure surfaced by a task body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task panicked on worker {worker}: {message}")]
    Panicked { worker: usize, message: String },

    #[error("task failed on worker {worker}: {message}")]
    Failed { worker: usize, message: String },
}

impl TaskError {
    pub(crate) fn failed<E: fmt::Display>(worker: usize, err: E) -> Self {
        TaskError::Failed {
            worker,
            message: err.to_string(),
        }
    }

    /// Id of the worker that ran the failing task.
    pub fn worker(&self) -> usize {
        match self {
            TaskError::Panicked { worker, .. } | TaskError::Failed { worker, .. } => *worker,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TaskError::Panicked { message, .. } | TaskError::Failed { message, .. } => message,
        }
    }
}

/// Errors observed through a [`TaskHandle`](crate::executor::TaskHandle).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskHandleError {
    #[error(transparent)]
    Failed(#[from] TaskError),

    #[error("task was dropped before producing a result")]
    Dropped,
}
