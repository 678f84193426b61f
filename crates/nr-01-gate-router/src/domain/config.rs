//! Router configuration and validation.

use crate::error::RouterError;
use serde::{Deserialize, Serialize};

/// Default modulator window when the payload names none.
pub const DEFAULT_WINDOW_MS: u64 = 200;

/// Reason recorded on modulator-installed gates that give none.
pub const DEFAULT_MODULATOR_REASON: &str = "modulator";

/// Gate router configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Lifetime of a modulator-installed gate when `window_ms` is absent.
    pub default_window_ms: u64,
    /// Reason tag for modulator gates without an explicit reason.
    pub modulator_reason: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_window_ms: DEFAULT_WINDOW_MS,
            modulator_reason: DEFAULT_MODULATOR_REASON.to_string(),
        }
    }
}

impl RouterConfig {
    #[must_use]
    pub fn with_default_window(mut self, window_ms: u64) -> Self {
        self.default_window_ms = window_ms;
        self
    }

    #[must_use]
    pub fn with_modulator_reason(mut self, reason: impl Into<String>) -> Self {
        self.modulator_reason = reason.into();
        self
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.default_window_ms == 0 {
            return Err(RouterError::InvalidConfig(
                "default_window_ms must be positive".into(),
            ));
        }
        if self.modulator_reason.is_empty() {
            return Err(RouterError::InvalidConfig(
                "modulator_reason must not be empty".into(),
            ));
        }
        Ok(())
    }
}
