//! Observability for the pool.

pub mod metrics;

pub use metrics::{MetricsSnapshot, PoolMetrics};
