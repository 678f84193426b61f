//! Output ports that keep everything they receive.
//!
//! Used by demos and tests to observe router output without a bus.

use crate::error::PortError;
use crate::ports::outbound::{CortexPort, GatePort};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{GateState, RelayDecision};

/// Cortex port that records every decision in arrival order.
#[derive(Debug, Default)]
pub struct RecordingCortexPort {
    decisions: Mutex<Vec<RelayDecision>>,
}

impl RecordingCortexPort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn decisions(&self) -> Vec<RelayDecision> {
        self.decisions.lock().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<RelayDecision> {
        self.decisions.lock().last().cloned()
    }
}

#[async_trait]
impl CortexPort for RecordingCortexPort {
    async fn publish_decision(&self, decision: &RelayDecision) -> Result<(), PortError> {
        self.decisions.lock().push(decision.clone());
        Ok(())
    }
}

/// Gate port that records every announced state.
#[derive(Debug, Default)]
pub struct RecordingGatePort {
    states: Mutex<Vec<GateState>>,
}

impl RecordingGatePort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn states(&self) -> Vec<GateState> {
        self.states.lock().clone()
    }
}

#[async_trait]
impl GatePort for RecordingGatePort {
    async fn publish_gate(&self, state: &GateState) -> Result<(), PortError> {
        self.states.lock().push(state.clone());
        Ok(())
    }
}
