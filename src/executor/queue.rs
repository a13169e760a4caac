//! Shared queue state: a FIFO of tasks plus the stop flag, behind one
//! mutex and one condition variable.

use super::task::Task;
use crate::error::PoolClosedError;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// What a worker gets back from [`SharedQueue::wait_for_work`].
#[derive(Debug)]
pub(crate) enum Work {
    Task(Task),
    Shutdown,
}

#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    stopped: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SharedQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl SharedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until a task is available or the queue is stopped and drained.
    ///
    /// The guard never escapes this function, so the returned task is always
    /// run with the lock released.
    pub fn wait_for_work(&self) -> Work {
        let mut state = self.state.lock();
        while !state.stopped && state.tasks.is_empty() {
            self.available.wait(&mut state);
        }

        match state.tasks.pop_front() {
            Some(task) => Work::Task(task),
            None => Work::Shutdown,
        }
    }

    pub fn push(&self, task: Task) -> Result<(), PoolClosedError> {
        {
            let mut state = self.state.lock();
            if state.stopped {
                return Err(PoolClosedError);
            }
            state.tasks.push_back(task);
        }

        // one item, one waiter
        self.available.notify_one();
        Ok(())
    }

    /// Set the stop flag and wake every waiter. Returns `true` only for the
    /// call that flipped the flag.
    pub fn request_stop(&self) -> bool {
        let first = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.stopped, true)
        };

        self.available.notify_all();
        first
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }
}
