pub use crate::config::{PoolConfig, PoolConfigBuilder};
pub use crate::error::{ConfigError, PoolClosedError, TaskError, TaskHandleError};
pub use crate::executor::{ErrorSink, Pool, TaskHandle, WorkerStats};
pub use crate::telemetry::MetricsSnapshot;
