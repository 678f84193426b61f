//! Gate Router Service
//!
//! Lane-dispatched gating state machine. The router holds no state of its
//! own; gate and mode state live behind the injected stores.
//!
//! ```text
//!   A driver ──► threshold(modes) ─┐
//!                gate.inhibition ──┴─► inhibition < threshold ? relay : block ──► CortexPort
//!   B modulator ─► GateState(ts, ts + window) ─┐
//!   G gate ──────► GateState(payload) ─────────┴─► GateStore.put ──► GatePort
//! ```

use async_trait::async_trait;
use shared_types::topics::validate_path_component;
use shared_types::{ContractError, Envelope, GateMode, GateState, Lane, RelayDecision, ScopeLevel};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{GateInstall, ModulatorRequest, RouterConfig};
use crate::error::RouterError;
use crate::metrics::{NoOpRouterMetrics, RouterMetricsRecorder, RouterStats, RouterStatsSnapshot};
use crate::ports::{
    CortexPort, GatePort, GateRouterApi, GateStore, GlobalModeStore, NucleusInhibition,
    RoutingPolicy, ScopeSummary, ThresholdPolicy,
};

/// Gate Router implementation
///
/// Implements the `GateRouterApi` port using injected stores, policies and
/// output ports.
pub struct GateRouter {
    gate_store: Arc<dyn GateStore>,
    mode_store: Arc<dyn GlobalModeStore>,
    routing: Arc<dyn RoutingPolicy>,
    thresholds: Arc<dyn ThresholdPolicy>,
    cortex: Arc<dyn CortexPort>,
    /// Optional observer for gate changes
    gate_port: Option<Arc<dyn GatePort>>,
    config: RouterConfig,
    stats: RouterStats,
    recorder: Arc<dyn RouterMetricsRecorder>,
}

impl GateRouter {
    /// Create a router with default configuration and no gate observer.
    pub fn new(
        gate_store: Arc<dyn GateStore>,
        mode_store: Arc<dyn GlobalModeStore>,
        routing: Arc<dyn RoutingPolicy>,
        thresholds: Arc<dyn ThresholdPolicy>,
        cortex: Arc<dyn CortexPort>,
    ) -> Self {
        Self {
            gate_store,
            mode_store,
            routing,
            thresholds,
            cortex,
            gate_port: None,
            config: RouterConfig::default(),
            stats: RouterStats::new(),
            recorder: Arc::new(NoOpRouterMetrics),
        }
    }

    /// Republish every installed gate state to `port`.
    #[must_use]
    pub fn with_gate_port(mut self, port: Arc<dyn GatePort>) -> Self {
        self.gate_port = Some(port);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, recorder: Arc<dyn RouterMetricsRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: RouterConfig) -> Result<Self, RouterError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Nucleus of an address-sensitive envelope, with its path segments checked.
    fn address_of(envelope: &Envelope) -> Result<&str, ContractError> {
        let nucleus = envelope.required_nucleus()?;
        validate_path_component("scope", &envelope.scope)?;
        validate_path_component("nucleus", nucleus)
    }

    async fn route_driver(&self, envelope: Envelope) -> Result<RelayDecision, RouterError> {
        let nucleus = Self::address_of(&envelope)?;

        let modes = self
            .mode_store
            .get_modes(envelope.scope_level, &envelope.scope)
            .await?;
        let threshold = self.thresholds.threshold_for(&envelope, &modes);

        // Absent or expired gates fail open.
        let inhibition = self
            .gate_store
            .get(envelope.scope_level, &envelope.scope, nucleus, envelope.timestamp_ms)
            .await?
            .map_or(0.0, |gate| gate.inhibition);

        let allowed = inhibition < threshold;
        let targets = if allowed {
            self.routing.targets_for(&envelope)
        } else {
            Vec::new()
        };

        debug!(
            scope = %envelope.scope,
            nucleus = %nucleus,
            inhibition,
            threshold,
            allowed,
            targets = targets.len(),
            "Driver evaluated"
        );

        let decision = RelayDecision {
            envelope,
            allowed,
            applied_inhibition: inhibition,
            targets,
            rationale: format!("inhibition={inhibition:.2} threshold={threshold:.2}"),
        };

        self.stats.record_decision(allowed);
        self.recorder.record_decision(allowed, inhibition, threshold);
        self.cortex.publish_decision(&decision).await?;
        Ok(decision)
    }

    async fn apply_modulator(&self, envelope: Envelope) -> Result<(), RouterError> {
        let nucleus = Self::address_of(&envelope)?;

        let Some(request) = ModulatorRequest::from_payload(&envelope.payload)? else {
            debug!(nucleus = %nucleus, "Modulator without requested_inhibition ignored");
            return Ok(());
        };

        let window_ms = request.window_ms.unwrap_or(self.config.default_window_ms);
        let reason = request
            .reason
            .unwrap_or_else(|| self.config.modulator_reason.clone());

        let state = GateState::new(
            envelope.scope_level,
            envelope.scope.clone(),
            nucleus,
            request.inhibition,
            envelope.timestamp_ms,
        )?
        .with_reason(reason)
        .with_expiry(Some(envelope.timestamp_ms.saturating_add(window_ms)));

        self.install(state, Some(Lane::Modulator)).await?;
        Ok(())
    }

    async fn apply_gate(&self, envelope: Envelope) -> Result<(), RouterError> {
        let nucleus = Self::address_of(&envelope)?;
        let Some(install) = GateInstall::from_payload(&envelope.payload)? else {
            debug!(nucleus = %nucleus, "Gate envelope without fields ignored");
            return Ok(());
        };

        let mut state = GateState::new(
            envelope.scope_level,
            envelope.scope.clone(),
            nucleus,
            install.inhibition,
            envelope.timestamp_ms,
        )?
        .with_mode(install.mode)
        .with_expiry(install.expires_at_ms);
        state.reason = install.reason;

        self.install(state, Some(Lane::Gate)).await?;
        Ok(())
    }

    /// Write a gate state and announce it.
    async fn install(&self, state: GateState, lane: Option<Lane>) -> Result<GateState, RouterError> {
        self.gate_store.put(state.clone()).await?;
        self.stats.record_gate_update();
        self.recorder.record_gate_update(lane);

        debug!(
            scope = %state.scope,
            nucleus = %state.nucleus,
            inhibition = state.inhibition,
            expires_at_ms = ?state.expires_at_ms,
            "Gate state installed"
        );

        if let Some(port) = &self.gate_port {
            port.publish_gate(&state).await?;
        }
        Ok(state)
    }

    /// Build and install a control-plane gate without expiry.
    #[allow(clippy::too_many_arguments)]
    async fn control(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        inhibition: f64,
        timestamp_ms: u64,
        mode: Option<GateMode>,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError> {
        validate_path_component("scope", scope)?;
        validate_path_component("nucleus", nucleus)?;

        let mut state = GateState::new(scope_level, scope, nucleus, inhibition, timestamp_ms)?
            .with_mode(mode);
        state.reason = reason.map(str::to_string);

        self.install(state, None).await
    }
}

#[async_trait]
impl GateRouterApi for GateRouter {
    async fn ingest(&self, envelope: Envelope) -> Result<Option<RelayDecision>, RouterError> {
        let lane = envelope.lane;
        let result = match lane {
            Lane::Driver => self.route_driver(envelope).await.map(Some),
            Lane::Modulator => self.apply_modulator(envelope).await.map(|()| None),
            Lane::Gate => self.apply_gate(envelope).await.map(|()| None),
            _ => {
                self.stats.record_ignored();
                debug!(lane = %lane, "Lane not handled by router");
                Ok(None)
            }
        };

        if let Err(RouterError::Contract(err)) = &result {
            self.stats.record_contract_violation();
            self.recorder.record_contract_violation(lane);
            warn!(lane = %lane, error = %err, "Envelope violates contract");
        }
        result
    }

    async fn get_gate_state(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        now_ms: u64,
    ) -> Result<Option<GateState>, RouterError> {
        Ok(self.gate_store.get(scope_level, scope, nucleus, now_ms).await?)
    }

    async fn set_inhibition(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        inhibition: f64,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError> {
        self.control(scope_level, scope, nucleus, inhibition, timestamp_ms, None, reason)
            .await
    }

    async fn open_gate(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError> {
        self.control(scope_level, scope, nucleus, 0.0, timestamp_ms, None, reason)
            .await
    }

    async fn close_gate(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        timestamp_ms: u64,
        reason: Option<&str>,
    ) -> Result<GateState, RouterError> {
        self.control(scope_level, scope, nucleus, 1.0, timestamp_ms, None, reason)
            .await
    }

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
    ) -> Result<Vec<GateState>, RouterError> {
        let mut installed = Vec::with_capacity(allow.len() + suppress.len());
        for entry in allow.iter().chain(suppress) {
            let state = self
                .control(
                    scope_level,
                    scope,
                    &entry.nucleus,
                    entry.inhibition,
                    timestamp_ms,
                    Some(mode),
                    reason,
                )
                .await?;
            installed.push(state);
        }
        Ok(installed)
    }

    async fn summarize_scope(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        now_ms: u64,
    ) -> Result<ScopeSummary, RouterError> {
        let gates = self.gate_store.list_scope(scope_level, scope, now_ms).await?;
        let modes = self.mode_store.get_modes(scope_level, scope).await?;
        Ok(ScopeSummary {
            scope_level,
            scope: scope.to_string(),
            gates,
            modes,
        })
    }

    fn stats(&self) -> RouterStatsSnapshot {
        self.stats.snapshot()
    }
}
