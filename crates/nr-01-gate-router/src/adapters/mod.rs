//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the outbound ports.
//!
//! ## Adapters
//!
//! - `InMemoryGateStore` / `InMemoryGlobalModeStore` - Process-local state
//! - `BusCortexPort` / `BusGatePort` - Publish router output on the topic bus
//! - `RecordingCortexPort` / `RecordingGatePort` - Capture output for inspection

pub mod bus_ports;
pub mod memory;
pub mod recording;

pub use bus_ports::{BusCortexPort, BusGatePort};
pub use memory::{InMemoryGateStore, InMemoryGlobalModeStore, DEFAULT_GC_INTERVAL_MS};
pub use recording::{RecordingCortexPort, RecordingGatePort};
