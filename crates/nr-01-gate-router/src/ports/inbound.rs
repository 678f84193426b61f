//! Inbound Ports (Driving Ports)
//!
//! API offered by the gate router to the boundaries that feed it and to the
//! control processes that steer its gates.

use async_trait::async_trait;
use shared_types::{Envelope, GateMode, GateState, RelayDecision, ScopeLevel};

use crate::domain::GlobalModes;
use crate::error::RouterError;
use crate::metrics::RouterStatsSnapshot;

/// Inhibition settings for one nucleus in an attention profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NucleusInhibition {
    pub nucleus: String,
    pub inhibition: f64,
}

impl NucleusInhibition {
    #[must_use]
    pub fn new(nucleus: impl Into<String>, inhibition: f64) -> Self {
        Self {
            nucleus: nucleus.into(),
            inhibition,
        }
    }
}

/// Current gating picture of one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSummary {
    pub scope_level: ScopeLevel,
    pub scope: String,
    /// Gates valid at the summary time, ordered by nucleus.
    pub gates: Vec<GateState>,
    pub modes: GlobalModes,
}

/// Gate Router API (Driving Port)
#[async_trait]
pub trait GateRouterApi: Send + Sync {
    /// Route one envelope by lane.
    ///
    /// Driver envelopes yield a decision; modulator and gate envelopes
    /// update gate state and yield `None`; other lanes are ignored.
    async fn ingest(&self, envelope: Envelope) -> Result<Option<RelayDecision>, RouterError>;

    /// Gate state valid at `now_ms`, if any.
    async fn get_gate_state(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        now_ms: u64,
    ) -> Result<Option<GateState>, RouterError>;

    /// Install an inhibition without expiry.
    async fn set_inhibition(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        inhibition: f64,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError>;

    /// Fully open a gate (inhibition 0.0).
    async fn open_gate(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError>;

    /// Fully close a gate (inhibition 1.0).
    async fn close_gate(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError>;

    /// Install a batch of gates for one scope under a shared mode.
    ///
    /// `allow` entries are installed first, then `suppress`, so a nucleus
    /// listed in both ends up suppressed.
    #[allow(clippy::too_many_arguments)]
    async fn apply_attention_profile(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        timestamp_ms: u64,
        allow: &[NucleusInhibition],
        suppress: &[NucleusInhibition],
        mode: GateMode,
        reason: Option<&str>,
    ) -> Result<Vec<GateState>, RouterError>;

    /// Gates and modes of one scope at `now_ms`.
    async fn summarize_scope(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        now_ms: u64,
    ) -> Result<ScopeSummary, RouterError>;

    /// Counters since startup.
    fn stats(&self) -> RouterStatsSnapshot;
}
