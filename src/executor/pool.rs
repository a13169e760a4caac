use super::failure::{panic_message, ErrorSink, FailureBoundary};
use super::handle::{result_channel, TaskHandle};
use super::queue::SharedQueue;
use super::task::Task;
use super::worker::{Worker, WorkerId, WorkerState, WorkerStats};
use crate::config::PoolConfig;
use crate::error::{ConfigError, PoolClosedError, Result, TaskError};
use crate::telemetry::{MetricsSnapshot, PoolMetrics};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// A fixed set of worker threads consuming one shared FIFO queue.
///
/// Dropping the pool shuts it down: queued tasks are drained and every
/// worker is joined before `drop` returns.
#[derive(Debug)]
pub struct Pool {
    queue: Arc<SharedQueue>,
    // fixed at construction, never locked
    workers: Vec<WorkerInfo>,
    joins: Mutex<JoinState>,
    joined: Condvar,
    boundary: Arc<FailureBoundary>,
    metrics: Arc<PoolMetrics>,
    num_threads: usize,
}

#[derive(Debug)]
struct WorkerInfo {
    id: WorkerId,
    thread: ThreadId,
    state: Arc<WorkerState>,
}

/// Join handles are moved out of the lock before joining, so the lock is
/// only ever held for a state flip.
#[derive(Debug)]
enum JoinState {
    Pending(Vec<(WorkerId, JoinHandle<()>)>),
    Joining,
    Joined,
}

impl Pool {
    /// Spawn `worker_count` workers. Task failures go to `error_sink`, or are
    /// only counted when it is `None`.
    ///
    /// Any count of at least one is accepted; the upper bound only applies
    /// to configs built through [`PoolConfig::builder`].
    pub fn new(worker_count: usize, error_sink: Option<ErrorSink>) -> Result<Self> {
        if worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(worker_count));
        }

        let config = PoolConfig {
            num_threads: Some(worker_count),
            ..PoolConfig::default()
        };
        Self::spawn(&config, error_sink)
    }

    pub fn with_config(config: &PoolConfig, error_sink: Option<ErrorSink>) -> Result<Self> {
        config.validate()?;
        Self::spawn(config, error_sink)
    }

    fn spawn(config: &PoolConfig, error_sink: Option<ErrorSink>) -> Result<Self> {
        let num_threads = config.worker_threads();
        if num_threads == 0 {
            return Err(ConfigError::InvalidWorkerCount(num_threads));
        }

        let queue = Arc::new(SharedQueue::new());
        let boundary = Arc::new(FailureBoundary::new(error_sink));
        let metrics = Arc::new(PoolMetrics::new());

        let mut workers = Vec::with_capacity(num_threads);
        let mut handles = Vec::with_capacity(num_threads);

        for id in 0..num_threads {
            let worker = Worker::new(id, queue.clone(), boundary.clone(), metrics.clone());
            let state = worker.state.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || worker.run()) {
                Ok(handle) => {
                    workers.push(WorkerInfo {
                        id,
                        thread: handle.thread().id(),
                        state,
                    });
                    handles.push((id, handle));
                }
                Err(e) => {
                    tracing::error!(worker = id, error = %e, "spawn failed");
                    // no partial pool: stop and reap what was already started
                    queue.request_stop();
                    for (_, handle) in handles {
                        let _ = handle.join();
                    }
                    return Err(ConfigError::Spawn(e));
                }
            }
        }

        tracing::info!(workers = num_threads, "pool started");

        Ok(Self {
            queue,
            workers,
            joins: Mutex::new(JoinState::Pending(handles)),
            joined: Condvar::new(),
            boundary,
            metrics,
            num_threads,
        })
    }

    /// Queue `f` for execution. Never blocks on capacity.
    pub fn submit<F>(&self, f: F) -> Result<(), PoolClosedError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task::new(f))
    }

    /// Queue a task whose `Err` is reported to the error sink like a panic.
    pub fn submit_fallible<F, E>(&self, f: F) -> Result<(), PoolClosedError>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: std::fmt::Display,
    {
        self.push(Task::fallible(f))
    }

    /// Queue a task and get a handle to its return value.
    pub fn submit_with_result<F, T>(&self, f: F) -> Result<TaskHandle<T>, PoolClosedError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, handle) = result_channel();

        let task = Task::from_fn(move |worker| match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                // receiver may be gone; the value is simply discarded then
                let _ = tx.send(Ok(value));
                Ok(())
            }
            Err(payload) => {
                let err = TaskError::Panicked {
                    worker,
                    message: panic_message(payload.as_ref()),
                };
                let _ = tx.send(Err(err.clone()));
                Err(err)
            }
        });

        self.push(task)?;
        Ok(handle)
    }

    fn push(&self, task: Task) -> Result<(), PoolClosedError> {
        match self.queue.push(task) {
            Ok(()) => {
                self.metrics.record_submitted();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_rejected();
                Err(e)
            }
        }
    }

    /// Stop accepting tasks, drain the queue and join every worker.
    ///
    /// Idempotent. A concurrent second call from outside the pool blocks
    /// until the first one has joined all workers. Called from inside a
    /// task, it never waits on its own worker: that worker is detached if
    /// this is the first call, and the call returns at once if another
    /// caller is already joining.
    pub fn shutdown(&self) {
        if self.queue.request_stop() {
            tracing::info!(
                workers = self.num_threads,
                queued = self.queue.len(),
                "pool shutting down"
            );
        }

        let current = thread::current().id();

        let handles = {
            let mut joins = self.joins.lock();
            match std::mem::replace(&mut *joins, JoinState::Joining) {
                JoinState::Pending(handles) => handles,
                JoinState::Joining => {
                    // the joiner may be waiting on this very worker
                    if !self.is_worker_thread(current) {
                        while matches!(*joins, JoinState::Joining) {
                            self.joined.wait(&mut joins);
                        }
                    }
                    return;
                }
                JoinState::Joined => {
                    *joins = JoinState::Joined;
                    return;
                }
            }
        };

        for (id, handle) in handles {
            if handle.thread().id() == current {
                tracing::warn!(worker = id, "shutdown called from a pool task");
                continue;
            }

            if handle.join().is_err() {
                tracing::error!(worker = id, "worker thread panicked");
            }
        }

        *self.joins.lock() = JoinState::Joined;
        self.joined.notify_all();
    }

    fn is_worker_thread(&self, thread: ThreadId) -> bool {
        self.workers.iter().any(|w| w.thread == thread)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Tasks waiting in the queue, not counting ones currently running.
    pub fn queued_tasks(&self) -> usize {
        self.queue.len()
    }

    /// `true` once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.queue.is_stopped()
    }

    pub fn failed_tasks(&self) -> u64 {
        self.boundary.failure_count()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn worker_stats(&self) -> Vec<WorkerStats> {
        self.workers
            .iter()
            .map(|w| w.state.snapshot(w.id))
            .collect()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
