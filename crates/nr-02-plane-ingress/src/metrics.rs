//! Counters and recorder hook for boundary activity

use shared_types::Plane;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ingress counters
#[derive(Debug, Default)]
pub struct IngressStats {
    /// Messages handed to the dispatch hook
    pub dispatched: AtomicU64,
    /// Messages turned into reject events
    pub rejected: AtomicU64,
    /// Dispatch hook failures
    pub dispatch_failures: AtomicU64,
}

impl IngressStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self, ok: bool) {
        if ok {
            self.dispatched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_reject(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngressStatsSnapshot {
        IngressStatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time ingress counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngressStatsSnapshot {
    pub dispatched: u64,
    pub rejected: u64,
    pub dispatch_failures: u64,
}

/// Trait for exporting boundary activity
pub trait IngressMetricsRecorder: Send + Sync {
    fn record_reject(&self, plane: Plane);

    fn record_dispatch(&self, plane: Plane, ok: bool);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpIngressMetrics;

impl IngressMetricsRecorder for NoOpIngressMetrics {
    fn record_reject(&self, _plane: Plane) {}

    fn record_dispatch(&self, _plane: Plane, _ok: bool) {}
}
