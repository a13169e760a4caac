//! Pool-wide counters, queue wait and task duration histogram.

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Runtime metrics collector shared by the pool and its workers.
#[derive(Debug)]
pub struct PoolMetrics {
    tasks_submitted: AtomicU64,
    tasks_rejected: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_failed: AtomicU64,

    busy_time_ns: AtomicU64,

    // time between enqueue and a worker picking the task up
    queue_wait_ns: AtomicU64,
    queue_waits: AtomicU64,

    // None if the histogram could not be allocated; counters still work
    duration_histogram: Option<Mutex<Histogram<u64>>>,

    start_time: Instant,
}

impl PoolMetrics {
    pub fn new() -> Self {
        // 3 significant figures, max 1 hour in nanoseconds
        let histogram = Histogram::new_with_max(3_600_000_000_000, 3)
            .map(Mutex::new)
            .ok();

        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_rejected: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
            queue_wait_ns: AtomicU64::new(0),
            queue_waits: AtomicU64::new(0),
            duration_histogram: histogram,
            start_time: Instant::now(),
        }
    }

    pub fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.tasks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_wait(&self, wait: Duration) {
        let wait_ns = u64::try_from(wait.as_nanos()).unwrap_or(u64::MAX);
        self.queue_wait_ns.fetch_add(wait_ns, Ordering::Relaxed);
        self.queue_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished task, successful or not.
    pub fn record_execution(&self, duration: Duration, failed: bool) {
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.busy_time_ns.fetch_add(duration_ns, Ordering::Relaxed);

        if let Some(hist) = &self.duration_histogram {
            // saturating: values above max are clamped instead of dropped
            hist.lock().saturating_record(duration_ns);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let (avg, p50, p99, max) = match &self.duration_histogram {
            Some(hist) => {
                let hist = hist.lock();
                if hist.is_empty() {
                    (0, 0, 0, 0)
                } else {
                    (
                        hist.mean() as u64,
                        hist.value_at_quantile(0.50),
                        hist.value_at_quantile(0.99),
                        hist.max(),
                    )
                }
            }
            None => (0, 0, 0, 0),
        };

        let waits = self.queue_waits.load(Ordering::Relaxed);
        let avg_queue_wait_ns = match waits {
            0 => 0,
            n => self.queue_wait_ns.load(Ordering::Relaxed) / n,
        };

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_rejected: self.tasks_rejected.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            busy_time_ns: self.busy_time_ns.load(Ordering::Relaxed),
            avg_queue_wait_ns,
            avg_duration_ns: avg,
            p50_duration_ns: p50,
            p99_duration_ns: p99,
            max_duration_ns: max,
        }
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_submitted: u64,
    pub tasks_rejected: u64,
    pub tasks_executed: u64,
    pub tasks_failed: u64,
    pub busy_time_ns: u64,
    pub avg_queue_wait_ns: u64,
    pub avg_duration_ns: u64,
    pub p50_duration_ns: u64,
    pub p99_duration_ns: u64,
    pub max_duration_ns: u64,
}

impl MetricsSnapshot {
    /// Tasks accepted but not yet finished.
    pub fn in_flight(&self) -> u64 {
        self.tasks_submitted.saturating_sub(self.tasks_executed)
    }

    pub fn tasks_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tasks_executed as f64 / seconds
    }
}
