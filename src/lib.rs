//! fixed-pool - a fixed-size worker pool
//!
//! N long-lived worker threads consume one shared FIFO queue guarded by a
//! single mutex/condition-variable pair. Shutdown is cooperative: the pool
//! stops accepting work, workers drain whatever is queued, then exit and are
//! joined.
//!
//! # Quick Start
//!
//! ```
//! use fixed_pool::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let pool = Pool::new(4, None).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..100 {
//!     let counter = counter.clone();
//!     pool.submit(move || {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!     })
//!     .unwrap();
//! }
//!
//! // blocks until every queued task has run
//! pool.shutdown();
//! assert_eq!(counter.load(Ordering::Relaxed), 100);
//! assert!(pool.submit(|| {}).is_err());
//! ```
//!
//! # Features
//!
//! - **Drain on shutdown**: every accepted task runs before `shutdown` returns
//! - **Failure isolation**: panicking or failing tasks are reported to an
//!   error sink and never take a worker down
//! - **Result handles**: `submit_with_result` returns a one-shot [`TaskHandle`]
//! - **Metrics**: task counters and a duration histogram per pool

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod telemetry;

// Re-export key types at crate root
pub use config::{PoolConfig, PoolConfigBuilder};
pub use error::{ConfigError, PoolClosedError, Result, TaskError, TaskHandleError};
pub use executor::{ErrorSink, Pool, TaskHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_drop_drains() {
        let counter = Arc::new(Mutex::new(0));

        {
            let pool = Pool::new(2, None).unwrap();
            for _ in 0..10 {
                let counter = counter.clone();
                pool.submit(move || {
                    *counter.lock() += 1;
                })
                .unwrap();
            }
        }

        assert_eq!(*counter.lock(), 10);
    }

    #[test]
    fn test_default_config_pool() {
        let pool = Pool::with_config(&PoolConfig::default(), None).unwrap();
        assert_eq!(pool.num_threads(), num_cpus::get());
        pool.shutdown();
    }
}
