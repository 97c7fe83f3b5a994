//! Telemetry
//!
//! Metrics for grant store operations. Log events are emitted through `tracing`.

pub mod metrics;

pub use metrics::{
    create_in_memory_metrics, no_op_metrics, GrantStoreMetrics, InMemoryMetrics, MetricEntry,
    MetricLabels, NoOpMetrics,
};
