//! Global mode flags.
//!
//! Scope-wide switches such as `high_alert` or `quiet_hours` that bias
//! admission thresholds for every driver signal of the scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raises thresholds (more traffic admitted).
pub const HIGH_ALERT: &str = "high_alert";

/// Lowers thresholds (less traffic admitted).
pub const QUIET_HOURS: &str = "quiet_hours";

/// Set of named boolean flags for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalModes {
    flags: BTreeMap<String, bool>,
}

impl GlobalModes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style flag assignment.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, active: bool) -> Self {
        self.set(name, active);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, active: bool) {
        self.flags.insert(name.into(), active);
    }

    /// True only when the flag is present and set.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Names of all set flags, sorted.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, active)| **active)
            .map(|(name, _)| name.as_str())
    }
}
