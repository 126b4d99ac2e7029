//! Workload driver.
//!
//! This module provides:
//! - [`WorkloadDriver`] for running scenarios across virtual users
//! - [`IterationContext`] handed to each iteration
//! - [`Metrics`] registry and its aggregated [`MetricsSnapshot`]
//! - [`Summary`] with threshold evaluation
//! - [`CancellationToken`] for interrupting a run

mod cancellation;
mod context;
mod metrics;
mod runner;
mod summary;

pub use cancellation::CancellationToken;
pub use context::IterationContext;
pub use metrics::{
    names as metric_names, CheckResult, CounterStats, MetricValue, Metrics, MetricsSnapshot,
    RateStats, TrendStats,
};
pub use runner::{WorkloadDriver, DEFAULT_GRACEFUL_STOP, DEFAULT_TICK};
pub use summary::{Summary, ThresholdResult};
