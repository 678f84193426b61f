//! Metrics hooks for bus operations.
//!
//! The bus keeps its own atomic counters; a [`BusMetricsRecorder`] lets an
//! external metrics system observe the same events as they happen.

/// Trait for exporting bus activity to an external metrics system.
pub trait BusMetricsRecorder: Send + Sync {
    /// A message was published and delivered to `receivers` queues.
    fn record_publish(&self, topic: &str, receivers: usize);

    /// A full subscriber queue dropped its oldest message.
    fn record_eviction(&self, topic: &str);
}

/// No-op recorder for when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpBusMetrics;

impl BusMetricsRecorder for NoOpBusMetrics {
    fn record_publish(&self, _topic: &str, _receivers: usize) {}

    fn record_eviction(&self, _topic: &str) {}
}
