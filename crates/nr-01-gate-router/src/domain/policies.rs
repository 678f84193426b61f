//! Routing and threshold policies.
//!
//! Both are pure functions of their inputs and are injected into the router
//! through [`RoutingPolicy`] and [`ThresholdPolicy`].

use crate::domain::modes::{GlobalModes, HIGH_ALERT, QUIET_HOURS};
use crate::error::RouterError;
use crate::ports::outbound::{RoutingPolicy, ThresholdPolicy};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::topics::validate_path_component;
use shared_types::{CortexLayer, Envelope, RelayTarget};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// ROUTING
// =============================================================================

/// Cortical destination registered for a nucleus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CortexRoute {
    pub cortex_area: String,
    pub layer: Option<CortexLayer>,
}

impl CortexRoute {
    #[must_use]
    pub fn new(cortex_area: impl Into<String>) -> Self {
        Self {
            cortex_area: cortex_area.into(),
            layer: None,
        }
    }

    #[must_use]
    pub fn layer(mut self, layer: CortexLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    fn target(&self, envelope: &Envelope) -> RelayTarget {
        RelayTarget {
            cortex_area: self.cortex_area.clone(),
            layer: self.layer,
            scope_level: envelope.scope_level,
            scope: envelope.scope.clone(),
        }
    }
}

/// Table-driven routing: nucleus → cortical routes, with an optional
/// fallback route for unmapped nuclei.
///
/// Targets always inherit the envelope's scope.
#[derive(Debug, Default)]
pub struct StaticRoutingPolicy {
    mappings: RwLock<HashMap<String, Vec<CortexRoute>>>,
    fallback: Option<CortexRoute>,
}

impl StaticRoutingPolicy {
    /// Policy with no mappings and no fallback. Routes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every unmapped nucleus along `route`.
    #[must_use]
    pub fn with_fallback(mut self, route: CortexRoute) -> Self {
        self.fallback = Some(route);
        self
    }

    /// First-order sensory and motor relays into layer 4.
    #[must_use]
    pub fn sensory_defaults() -> Self {
        let policy = Self::new();
        for (nucleus, area) in [
            ("lgn", "V1"),
            ("mgn", "A1"),
            ("vpl", "S1"),
            ("vpm", "S1"),
            ("vl", "M1"),
            ("va", "M1"),
            ("pulvinar", "PPC"),
            ("md", "PFC"),
        ] {
            policy
                .mappings
                .write()
                .insert(nucleus.to_string(), vec![CortexRoute::new(area).layer(CortexLayer::L4)]);
        }
        policy
    }

    /// Register (or replace) the routes for a nucleus.
    pub fn register_mapping(&self, nucleus: &str, routes: Vec<CortexRoute>) -> Result<(), RouterError> {
        validate_path_component("nucleus", nucleus)?;
        for route in &routes {
            validate_path_component("cortex_area", &route.cortex_area)?;
        }
        self.mappings.write().insert(nucleus.to_string(), routes);
        Ok(())
    }

    /// Remove the routes for a nucleus. Returns true if one was registered.
    pub fn unregister_mapping(&self, nucleus: &str) -> bool {
        self.mappings.write().remove(nucleus).is_some()
    }

    /// Nuclei with explicit mappings, sorted.
    #[must_use]
    pub fn nuclei(&self) -> Vec<String> {
        let mut nuclei: Vec<String> = self.mappings.read().keys().cloned().collect();
        nuclei.sort();
        nuclei
    }
}

impl RoutingPolicy for StaticRoutingPolicy {
    fn targets_for(&self, envelope: &Envelope) -> Vec<RelayTarget> {
        let mapped = envelope
            .nucleus
            .as_deref()
            .and_then(|nucleus| self.mappings.read().get(nucleus).cloned());

        match (mapped, &self.fallback) {
            (Some(routes), _) => routes.iter().map(|r| r.target(envelope)).collect(),
            (None, Some(fallback)) => vec![fallback.target(envelope)],
            (None, None) => Vec::new(),
        }
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Default admission threshold.
pub const DEFAULT_BASE_THRESHOLD: f64 = 0.5;

/// Default magnitude of the built-in mode biases.
pub const DEFAULT_MODE_BIAS: f64 = 0.2;

/// Base threshold biased additively by active mode flags, clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeBiasedThresholdPolicy {
    base: f64,
    biases: BTreeMap<String, f64>,
}

impl Default for ModeBiasedThresholdPolicy {
    fn default() -> Self {
        let mut biases = BTreeMap::new();
        biases.insert(HIGH_ALERT.to_string(), DEFAULT_MODE_BIAS);
        biases.insert(QUIET_HOURS.to_string(), -DEFAULT_MODE_BIAS);
        Self {
            base: DEFAULT_BASE_THRESHOLD,
            biases,
        }
    }
}

impl ModeBiasedThresholdPolicy {
    /// Policy with base 0.5, `high_alert` +0.2 and `quiet_hours` -0.2.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    /// Add or replace the bias applied while `mode` is active.
    #[must_use]
    pub fn with_bias(mut self, mode: impl Into<String>, bias: f64) -> Self {
        self.biases.insert(mode.into(), bias);
        self
    }

    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if !(0.0..=1.0).contains(&self.base) {
            return Err(RouterError::InvalidConfig(format!(
                "base threshold {} not in [0, 1]",
                self.base
            )));
        }
        if let Some((mode, bias)) = self.biases.iter().find(|(_, b)| !b.is_finite()) {
            return Err(RouterError::InvalidConfig(format!(
                "bias for mode {mode} is not finite: {bias}"
            )));
        }
        Ok(())
    }
}

impl ThresholdPolicy for ModeBiasedThresholdPolicy {
    fn threshold_for(&self, _envelope: &Envelope, modes: &GlobalModes) -> f64 {
        let bias: f64 = modes
            .active()
            .filter_map(|mode| self.biases.get(mode))
            .sum();
        (self.base + bias).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ScopeLevel;

    fn driver(nucleus: &str) -> Envelope {
        Envelope::driver(ScopeLevel::Room, "kitchen", nucleus, 0)
    }

    #[test]
    fn test_unmapped_without_fallback_routes_nothing() {
        let policy = StaticRoutingPolicy::new();
        assert!(policy.targets_for(&driver("lgn")).is_empty());
    }

    #[test]
    fn test_fallback_route() {
        let policy = StaticRoutingPolicy::new().with_fallback(CortexRoute::new("V1"));
        let targets = policy.targets_for(&driver("anything"));

        assert_eq!(targets, vec![RelayTarget::new("V1", ScopeLevel::Room, "kitchen")]);
    }

    #[test]
    fn test_sensory_defaults() {
        let policy = StaticRoutingPolicy::sensory_defaults();
        let targets = policy.targets_for(&driver("mgn"));

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].cortex_area, "A1");
        assert_eq!(targets[0].layer, Some(CortexLayer::L4));
        assert_eq!(targets[0].scope, "kitchen");
        assert!(policy.nuclei().contains(&"pulvinar".to_string()));
    }

    #[test]
    fn test_register_and_unregister_mapping() {
        let policy = StaticRoutingPolicy::new();
        policy
            .register_mapping(
                "md",
                vec![
                    CortexRoute::new("PFC").layer(CortexLayer::L4),
                    CortexRoute::new("ACC").layer(CortexLayer::L6),
                ],
            )
            .unwrap();

        assert_eq!(policy.targets_for(&driver("md")).len(), 2);
        assert!(policy.unregister_mapping("md"));
        assert!(!policy.unregister_mapping("md"));
        assert!(policy.targets_for(&driver("md")).is_empty());
    }

    #[test]
    fn test_register_rejects_invalid_names() {
        let policy = StaticRoutingPolicy::new();
        assert!(policy.register_mapping("../x", vec![]).is_err());
        assert!(policy
            .register_mapping("md", vec![CortexRoute::new("P/FC")])
            .is_err());
    }

    #[test]
    fn test_threshold_biases() {
        let policy = ModeBiasedThresholdPolicy::new();
        let env = driver("lgn");

        let none = GlobalModes::new();
        let alert = GlobalModes::new().with(HIGH_ALERT, true);
        let quiet = GlobalModes::new().with(QUIET_HOURS, true);
        let both = alert.clone().with(QUIET_HOURS, true);

        assert!((policy.threshold_for(&env, &none) - 0.5).abs() < 1e-9);
        assert!((policy.threshold_for(&env, &alert) - 0.7).abs() < 1e-9);
        assert!((policy.threshold_for(&env, &quiet) - 0.3).abs() < 1e-9);
        assert!((policy.threshold_for(&env, &both) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_clamped() {
        let env = driver("lgn");
        let modes = GlobalModes::new().with("panic", true);

        let high = ModeBiasedThresholdPolicy::new().with_base(0.9).with_bias("panic", 0.5);
        assert_eq!(high.threshold_for(&env, &modes), 1.0);

        let low = ModeBiasedThresholdPolicy::new().with_base(0.1).with_bias("panic", -0.5);
        assert_eq!(low.threshold_for(&env, &modes), 0.0);
    }

    #[test]
    fn test_unknown_modes_ignored() {
        let policy = ModeBiasedThresholdPolicy::new();
        let modes = GlobalModes::new().with("holiday", true);
        assert!((policy.threshold_for(&driver("lgn"), &modes) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(ModeBiasedThresholdPolicy::new().validate().is_ok());
        assert!(ModeBiasedThresholdPolicy::new().with_base(1.5).validate().is_err());
        assert!(ModeBiasedThresholdPolicy::new()
            .with_bias("x", f64::INFINITY)
            .validate()
            .is_err());
    }
}
