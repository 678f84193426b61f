//! Metrics and tracing hooks for router operations
//!
//! [`RouterStats`] keeps in-process counters; a [`RouterMetricsRecorder`]
//! forwards the same events to an external metrics system.
//!
//! ## Usage
//!
//! ```ignore
//! use nr_01_gate_router::metrics::RouterStats;
//!
//! let stats = RouterStats::new();
//! stats.record_decision(true);
//! assert_eq!(stats.snapshot().relayed, 1);
//! ```

use shared_types::Lane;
use std::sync::atomic::{AtomicU64, Ordering};

/// Router counters
#[derive(Debug, Default)]
pub struct RouterStats {
    /// Driver envelopes evaluated
    pub received: AtomicU64,
    /// Driver envelopes admitted
    pub relayed: AtomicU64,
    /// Driver envelopes blocked by their gate
    pub blocked: AtomicU64,
    /// Gate states written from modulator, gate or control traffic
    pub gate_updates: AtomicU64,
    /// Envelopes on lanes the router does not handle
    pub ignored: AtomicU64,
    /// Envelopes refused for contract violations
    pub contract_violations: AtomicU64,
}

impl RouterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&self, allowed: bool) {
        self.received.fetch_add(1, Ordering::Relaxed);
        if allowed {
            self.relayed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.blocked.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_gate_update(&self) {
        self.gate_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_contract_violation(&self) {
        self.contract_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current counters snapshot
    pub fn snapshot(&self) -> RouterStatsSnapshot {
        RouterStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            relayed: self.relayed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            gate_updates: self.gate_updates.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            contract_violations: self.contract_violations.load(Ordering::Relaxed),
        }
    }

    /// Fraction of evaluated drivers that were blocked
    pub fn block_rate(&self) -> f64 {
        let received = self.received.load(Ordering::Relaxed);
        if received == 0 {
            return 0.0;
        }
        self.blocked.load(Ordering::Relaxed) as f64 / received as f64
    }
}

/// Point-in-time router counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterStatsSnapshot {
    pub received: u64,
    pub relayed: u64,
    pub blocked: u64,
    pub gate_updates: u64,
    pub ignored: u64,
    pub contract_violations: u64,
}

/// Trait for exporting router activity
///
/// Implement this trait to integrate with external metrics systems.
pub trait RouterMetricsRecorder: Send + Sync {
    /// A driver envelope was evaluated
    fn record_decision(&self, allowed: bool, applied_inhibition: f64, threshold: f64);

    /// A gate state was written; `lane` is `None` for direct control calls
    fn record_gate_update(&self, lane: Option<Lane>);

    /// An envelope broke its contract
    fn record_contract_violation(&self, lane: Lane);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRouterMetrics;

impl RouterMetricsRecorder for NoOpRouterMetrics {
    fn record_decision(&self, _allowed: bool, _applied_inhibition: f64, _threshold: f64) {}

    fn record_gate_update(&self, _lane: Option<Lane>) {}

    fn record_contract_violation(&self, _lane: Lane) {}
}
