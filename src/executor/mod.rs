//! Task execution infrastructure.
//!
//! The shared queue, the worker loop that drains it, the failure boundary
//! every task runs inside, and the [`Pool`] that owns them all.

pub mod failure;
pub mod handle;
pub mod pool;
pub(crate) mod queue;
pub(crate) mod task;
pub mod worker;

pub use failure::ErrorSink;
pub use handle::TaskHandle;
pub use pool::Pool;
pub use worker::{WorkerId, WorkerStats};
