//! One-shot result delivery for tasks submitted with
//! [`Pool::submit_with_result`](super::Pool::submit_with_result).

use crate::error::{TaskError, TaskHandleError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

pub(crate) type ResultSender<T> = Sender<Result<T, TaskError>>;

pub(crate) fn result_channel<T>() -> (ResultSender<T>, TaskHandle<T>) {
    let (tx, rx) = bounded(1);
    (tx, TaskHandle { rx })
}

/// Receives the value produced by a pooled task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task has finished.
    pub fn wait(self) -> Result<T, TaskHandleError> {
        match self.rx.recv() {
            Ok(result) => result.map_err(TaskHandleError::Failed),
            Err(_) => Err(TaskHandleError::Dropped),
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`, returning `None`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, TaskHandleError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result.map_err(TaskHandleError::Failed)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(TaskHandleError::Dropped)),
        }
    }

    /// Non-blocking poll.
    pub fn try_get(&self) -> Option<Result<T, TaskHandleError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result.map_err(TaskHandleError::Failed)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TaskHandleError::Dropped)),
        }
    }
}
