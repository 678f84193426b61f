//! # Runtime Configuration
//!
//! Unified configuration for the bus, the gate router and the scopes the
//! thalamus boundary listens on.
//!
//! Every value has a default; `NR_*` environment variables override them.
//! Malformed overrides are configuration errors, never silently ignored.

use nr_01_gate_router::{ModeBiasedThresholdPolicy, RouterConfig};
use shared_bus::DEFAULT_QUEUE_CAPACITY;
use shared_types::topics::validate_path_component;
use shared_types::ScopeLevel;
use std::env;
use thiserror::Error;

/// Default interval between expired-gate sweeps.
pub const DEFAULT_GATE_GC_INTERVAL_MS: u64 = 60_000;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    /// The assembled configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Topic bus configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Messages buffered per subscription before the oldest is evicted.
    pub queue_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be positive".into()));
        }
        Ok(())
    }
}

/// A scope the thalamus boundary subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedScope {
    pub scope_level: ScopeLevel,
    pub scope: String,
}

impl WatchedScope {
    #[must_use]
    pub fn new(scope_level: ScopeLevel, scope: impl Into<String>) -> Self {
        Self {
            scope_level,
            scope: scope.into(),
        }
    }

    /// Parse `level:scope`, e.g. `room:living_room`.
    fn parse(value: &str) -> Option<Self> {
        let (level, scope) = value.split_once(':')?;
        let scope_level = ScopeLevel::parse(level.trim())?;
        let scope = scope.trim();
        validate_path_component("scope", scope).ok()?;
        Some(Self::new(scope_level, scope))
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Topic bus configuration.
    pub bus: BusConfig,
    /// Gate router configuration.
    pub router: RouterConfig,
    /// Admission threshold before mode biases.
    pub base_threshold: f64,
    /// Interval between expired-gate sweeps.
    pub gate_gc_interval_ms: u64,
    /// Scopes the thalamus boundary listens on.
    pub scopes: Vec<WatchedScope>,
    /// Nuclei subscribed per scope. Empty means every routed nucleus.
    pub nuclei: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            router: RouterConfig::default(),
            base_threshold: ModeBiasedThresholdPolicy::new().base(),
            gate_gc_interval_ms: DEFAULT_GATE_GC_INTERVAL_MS,
            scopes: vec![WatchedScope::new(ScopeLevel::House, "home")],
            nuclei: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NR_QUEUE_CAPACITY`: Per-subscription queue capacity (default: 1000)
    /// - `NR_WINDOW_MS`: Default modulator window (default: 200)
    /// - `NR_BASE_THRESHOLD`: Admission threshold before biases (default: 0.5)
    /// - `NR_GATE_GC_INTERVAL_MS`: Expired-gate sweep interval (default: 60000)
    /// - `NR_SCOPES`: Comma-separated `level:scope` list (default: `house:home`)
    /// - `NR_NUCLEI`: Comma-separated nuclei (default: every routed nucleus)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("NR_QUEUE_CAPACITY") {
            config.bus.queue_capacity = parse_number("NR_QUEUE_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("NR_WINDOW_MS") {
            config.router.default_window_ms = parse_number("NR_WINDOW_MS", &value)?;
        }
        if let Some(value) = lookup("NR_BASE_THRESHOLD") {
            config.base_threshold = parse_number("NR_BASE_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("NR_GATE_GC_INTERVAL_MS") {
            config.gate_gc_interval_ms = parse_number("NR_GATE_GC_INTERVAL_MS", &value)?;
        }
        if let Some(value) = lookup("NR_SCOPES") {
            config.scopes = split_list(&value)
                .map(|item| {
                    WatchedScope::parse(item).ok_or_else(|| ConfigError::InvalidValue {
                        var: "NR_SCOPES",
                        value: item.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = lookup("NR_NUCLEI") {
            config.nuclei = split_list(&value)
                .map(|item| {
                    validate_path_component("nucleus", item)
                        .map(str::to_string)
                        .map_err(|_| ConfigError::InvalidValue {
                            var: "NR_NUCLEI",
                            value: item.to_string(),
                        })
                })
                .collect::<Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<WatchedScope>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_nuclei(mut self, nuclei: Vec<String>) -> Self {
        self.nuclei = nuclei;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.bus.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_gate_gc_interval(mut self, interval_ms: u64) -> Self {
        self.gate_gc_interval_ms = interval_ms;
        self
    }

    /// Threshold policy built from this configuration.
    #[must_use]
    pub fn threshold_policy(&self) -> ModeBiasedThresholdPolicy {
        ModeBiasedThresholdPolicy::new().with_base(self.base_threshold)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bus.validate()?;
        self.router
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.threshold_policy()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.gate_gc_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "gate_gc_interval_ms must be positive".into(),
            ));
        }
        if self.scopes.is_empty() {
            return Err(ConfigError::Invalid("at least one scope must be watched".into()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.bus.queue_capacity, 1000);
        assert_eq!(config.router.default_window_ms, 200);
        assert_eq!(config.base_threshold, 0.5);
        assert_eq!(config.scopes, vec![WatchedScope::new(ScopeLevel::House, "home")]);
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("NR_QUEUE_CAPACITY", "16"),
            ("NR_WINDOW_MS", "500"),
            ("NR_BASE_THRESHOLD", "0.7"),
            ("NR_SCOPES", "room:living_room, house:home"),
            ("NR_NUCLEI", "lgn,mgn"),
        ]))
        .unwrap();

        assert_eq!(config.bus.queue_capacity, 16);
        assert_eq!(config.router.default_window_ms, 500);
        assert_eq!(config.base_threshold, 0.7);
        assert_eq!(
            config.scopes,
            vec![
                WatchedScope::new(ScopeLevel::Room, "living_room"),
                WatchedScope::new(ScopeLevel::House, "home"),
            ]
        );
        assert_eq!(config.nuclei, vec!["lgn".to_string(), "mgn".to_string()]);
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let err = RuntimeConfig::from_lookup(lookup(&[("NR_QUEUE_CAPACITY", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "NR_QUEUE_CAPACITY", .. }));

        let err = RuntimeConfig::from_lookup(lookup(&[("NR_SCOPES", "room:../etc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "NR_SCOPES", .. }));

        let err = RuntimeConfig::from_lookup(lookup(&[("NR_SCOPES", "garage:car")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "NR_SCOPES", .. }));

        let err = RuntimeConfig::from_lookup(lookup(&[("NR_NUCLEI", "lgn,a/b")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "NR_NUCLEI", .. }));
    }

    #[test]
    fn test_validation() {
        assert!(RuntimeConfig::from_lookup(lookup(&[("NR_QUEUE_CAPACITY", "0")])).is_err());
        assert!(RuntimeConfig::from_lookup(lookup(&[("NR_BASE_THRESHOLD", "1.5")])).is_err());
        assert!(RuntimeConfig::from_lookup(lookup(&[("NR_WINDOW_MS", "0")])).is_err());
        assert!(RuntimeConfig::default().with_scopes(vec![]).validate().is_err());
        assert!(RuntimeConfig::default().with_gate_gc_interval(0).validate().is_err());
    }
}
