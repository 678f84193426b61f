//! # Relay Container
//!
//! Configuration and the container holding every wired component.

pub mod config;
pub mod relay;

pub use config::{BusConfig, ConfigError, RuntimeConfig, WatchedScope, DEFAULT_GATE_GC_INTERVAL_MS};
pub use relay::{ContainerError, RelayContainer};
