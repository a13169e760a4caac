// worker thread loop
use super::failure::FailureBoundary;
use super::queue::{SharedQueue, Work};
use crate::telemetry::PoolMetrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

// stats for each worker
#[derive(Debug)]
pub struct WorkerState {
    pub tasks_executed: AtomicU64,
    pub tasks_failed: AtomicU64,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            tasks_executed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self, id: WorkerId) -> WorkerStats {
        WorkerStats {
            id,
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: WorkerId,
    pub tasks_executed: u64,
    pub tasks_failed: u64,
}

/// Everything a worker thread needs, moved into the thread at spawn.
#[derive(Debug)]
pub(crate) struct Worker {
    pub id: WorkerId,
    pub state: Arc<WorkerState>,
    queue: Arc<SharedQueue>,
    boundary: Arc<FailureBoundary>,
    metrics: Arc<PoolMetrics>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        queue: Arc<SharedQueue>,
        boundary: Arc<FailureBoundary>,
        metrics: Arc<PoolMetrics>,
    ) -> Self {
        Self {
            id,
            state: Arc::new(WorkerState::new()),
            queue,
            boundary,
            metrics,
        }
    }

    // main loop: idle in wait_for_work, active while running a task,
    // terminated once the queue reports shutdown
    pub fn run(self) {
        tracing::debug!(worker = self.id, "worker started");

        while let Work::Task(task) = self.queue.wait_for_work() {
            self.metrics.record_queue_wait(task.enqueued_at.elapsed());

            let start = Instant::now();
            let failed = self.boundary.run(task, self.id).is_err();

            self.metrics.record_execution(start.elapsed(), failed);
            self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
            if failed {
                self.state.tasks_failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        tracing::debug!(worker = self.id, "worker terminated");
    }
}
