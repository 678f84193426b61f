//! # NR-01 Gate Router
//!
//! Inhibition-gated relay of driver signals, modelled on the thalamic
//! reticular gate: each (scope, nucleus) pair carries an inhibition level,
//! and a driver signal is relayed only while that inhibition stays strictly
//! below a context-dependent threshold.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `ModeBiasedThresholdPolicy`: base threshold biased by global modes
//!   - `StaticRoutingPolicy`: nucleus → cortical area table
//!   - `ModulatorRequest` / `GateInstall`: typed payload views
//!   - `RouterConfig`: configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `GateRouterApi`: Driving port (ingest + gate control)
//!   - `GateStore`, `GlobalModeStore`, `RoutingPolicy`, `ThresholdPolicy`,
//!     `CortexPort`, `GatePort`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `GateRouter`: Implements `GateRouterApi`
//!
//! - **Adapters Layer** (`adapters/`): In-memory stores, bus-backed and
//!   recording output ports
//!
//! ## Invariants
//!
//! - **Admission**: `allowed == (inhibition < threshold)`; equality blocks.
//! - **Fail-open**: an absent or expired gate counts as inhibition `0.0`.
//! - **Addressing**: driver, modulator and gate envelopes must carry a
//!   nucleus; its absence is a contract violation, never a soft default.
//!
//! ## Usage Example
//!
//! ```ignore
//! use nr_01_gate_router::{
//!     GateRouter, GateRouterApi, InMemoryGateStore, InMemoryGlobalModeStore,
//!     ModeBiasedThresholdPolicy, RecordingCortexPort, StaticRoutingPolicy,
//! };
//! use std::sync::Arc;
//!
//! let router = GateRouter::new(
//!     Arc::new(InMemoryGateStore::new()),
//!     Arc::new(InMemoryGlobalModeStore::new()),
//!     Arc::new(StaticRoutingPolicy::sensory_defaults()),
//!     Arc::new(ModeBiasedThresholdPolicy::new()),
//!     Arc::new(RecordingCortexPort::new()),
//! );
//!
//! let decision = router.ingest(envelope).await?;
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{
    BusCortexPort, BusGatePort, InMemoryGateStore, InMemoryGlobalModeStore, RecordingCortexPort,
    RecordingGatePort,
};
pub use domain::{
    CortexRoute, GlobalModes, ModeBiasedThresholdPolicy, RouterConfig, StaticRoutingPolicy,
    HIGH_ALERT, QUIET_HOURS,
};
pub use error::{PortError, RouterError};
pub use metrics::{NoOpRouterMetrics, RouterMetricsRecorder, RouterStats, RouterStatsSnapshot};
pub use ports::{
    CortexPort, GatePort, GateRouterApi, GateStore, GlobalModeStore, NucleusInhibition,
    RoutingPolicy, ScopeSummary, ThresholdPolicy,
};
pub use service::GateRouter;
