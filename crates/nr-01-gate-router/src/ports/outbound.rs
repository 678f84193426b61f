//! Outbound Ports (Driven Ports)
//!
//! Dependencies the gate router needs from its environment: durable state,
//! injected policies and the sinks decisions and gate changes flow into.

use async_trait::async_trait;
use shared_types::{Envelope, GateState, RelayDecision, RelayTarget, ScopeLevel};

use crate::domain::GlobalModes;
use crate::error::PortError;

/// Per-key inhibition store with time-boxed validity.
#[async_trait]
pub trait GateStore: Send + Sync {
    /// Most recent state for the key unless it has expired at `now_ms`.
    async fn get(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        now_ms: u64,
    ) -> Result<Option<GateState>, PortError>;

    /// Install or overwrite the state for its key. Last write wins.
    async fn put(&self, state: GateState) -> Result<(), PortError>;

    /// All states of one scope still valid at `now_ms`, ordered by nucleus.
    async fn list_scope(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        now_ms: u64,
    ) -> Result<Vec<GateState>, PortError>;

    /// Physically remove states expired at `now_ms`. Returns how many.
    async fn purge_expired(&self, now_ms: u64) -> Result<usize, PortError>;
}

/// Named per-scope mode flags.
#[async_trait]
pub trait GlobalModeStore: Send + Sync {
    async fn get_modes(&self, scope_level: ScopeLevel, scope: &str) -> Result<GlobalModes, PortError>;

    async fn put_modes(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        modes: GlobalModes,
    ) -> Result<(), PortError>;
}

/// Chooses where an admitted driver signal is relayed.
pub trait RoutingPolicy: Send + Sync {
    /// Relay targets for an envelope. May be empty.
    fn targets_for(&self, envelope: &Envelope) -> Vec<RelayTarget>;
}

/// Chooses the admission threshold for a driver signal.
pub trait ThresholdPolicy: Send + Sync {
    /// Threshold in `[0, 1]`.
    fn threshold_for(&self, envelope: &Envelope, modes: &GlobalModes) -> f64;
}

/// Sink for relay decisions.
#[async_trait]
pub trait CortexPort: Send + Sync {
    async fn publish_decision(&self, decision: &RelayDecision) -> Result<(), PortError>;
}

/// Observer sink for gate state changes.
#[async_trait]
pub trait GatePort: Send + Sync {
    async fn publish_gate(&self, state: &GateState) -> Result<(), PortError>;
}
