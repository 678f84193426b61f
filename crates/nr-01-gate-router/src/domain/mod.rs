//! Domain layer: pure gating logic, no I/O.

pub mod config;
pub mod modes;
pub mod payload;
pub mod policies;

pub use config::{RouterConfig, DEFAULT_MODULATOR_REASON, DEFAULT_WINDOW_MS};
pub use modes::{GlobalModes, HIGH_ALERT, QUIET_HOURS};
pub use payload::{GateInstall, ModulatorRequest};
pub use policies::{CortexRoute, ModeBiasedThresholdPolicy, StaticRoutingPolicy};
