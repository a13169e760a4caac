use super::task::Task;
use crate::error::TaskError;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback receiving every task failure. Invoked concurrently from all
/// workers.
pub type ErrorSink = Arc<dyn Fn(TaskError) + Send + Sync + 'static>;

/// Runs tasks so that a panic or returned error never escapes into the
/// worker loop.
pub(crate) struct FailureBoundary {
    sink: Option<ErrorSink>,
    failures: AtomicU64,
}

impl FailureBoundary {
    pub fn new(sink: Option<ErrorSink>) -> Self {
        Self {
            sink,
            failures: AtomicU64::new(0),
        }
    }

    /// Execute `task` for `worker`. Returns the failure after it has been
    /// counted and handed to the sink.
    pub fn run(&self, task: Task, worker: usize) -> Result<(), TaskError> {
        let tid = task.id;
        let outcome = match catch_unwind(AssertUnwindSafe(|| task.execute(worker))) {
            Ok(result) => result,
            Err(payload) => Err(TaskError::Panicked {
                worker,
                message: panic_message(payload.as_ref()),
            }),
        };

        if let Err(err) = &outcome {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(task = tid.as_u64(), worker, error = %err, "task failed");
            self.report(err.clone());
        }

        outcome
    }

    fn report(&self, err: TaskError) {
        let Some(sink) = &self.sink else { return };

        // a panicking sink must not take the worker down either
        if catch_unwind(AssertUnwindSafe(|| sink(err))).is_err() {
            tracing::error!("error sink panicked");
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for FailureBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureBoundary")
            .field("has_sink", &self.sink.is_some())
            .field("failures", &self.failure_count())
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collecting_sink() -> (ErrorSink, Arc<Mutex<Vec<TaskError>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ErrorSink = Arc::new(move |err: TaskError| sink_seen.lock().push(err));
        (sink, seen)
    }

    #[test]
    fn test_success_not_counted() {
        let (sink, seen) = collecting_sink();
        let boundary = FailureBoundary::new(Some(sink));

        assert!(boundary.run(Task::new(|| {}), 0).is_ok());
        assert_eq!(boundary.failure_count(), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_panic_is_caught_and_reported() {
        let (sink, seen) = collecting_sink();
        let boundary = FailureBoundary::new(Some(sink));

        let err = boundary
            .run(Task::new(|| panic!("test panic")), 2)
            .unwrap_err();

        assert_eq!(
            err,
            TaskError::Panicked {
                worker: 2,
                message: "test panic".to_string()
            }
        );
        assert_eq!(boundary.failure_count(), 1);
        assert_eq!(seen.lock().as_slice(), &[err]);
    }

    #[test]
    fn test_formatted_panic_message() {
        let boundary = FailureBoundary::new(None);
        let err = boundary
            .run(Task::new(|| panic!("bad value {}", 42)), 0)
            .unwrap_err();
        assert_eq!(err.message(), "bad value 42");
    }

    #[test]
    fn test_default_sink_only_counts() {
        let boundary = FailureBoundary::new(None);

        for _ in 0..5 {
            let _ = boundary.run(Task::fallible(|| Err::<(), _>("boom")), 0);
        }

        assert_eq!(boundary.failure_count(), 5);
    }

    #[test]
    fn test_panicking_sink_is_contained() {
        let sink: ErrorSink = Arc::new(|_: TaskError| panic!("sink exploded"));
        let boundary = FailureBoundary::new(Some(sink));

        let result = boundary.run(Task::fallible(|| Err::<(), _>("boom")), 0);
        assert!(result.is_err());
        assert_eq!(boundary.failure_count(), 1);
    }
}
