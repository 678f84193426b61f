//! # NR-02 Plane Ingress
//!
//! One generic boundary component, instantiated per plane. Each instance
//! reads the declared type of an inbound message and either hands it to a
//! boundary-specific dispatch hook or turns it into a [`RejectEvent`]
//! published on the scope's reflect channel.
//!
//! Refusing a message is never an error for the sender: the refusal is data
//! on `/X/reflect/{scope_level}/{scope}/lane/reject`, the same topic for
//! every boundary and every reason.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `IngressConfig` presets, `build_reject`
//! - **Ports Layer** (`ports/`): `PlaneIngressApi` (driving),
//!   `DispatchHook` (driven)
//! - **Service Layer** (`service/`): `PlaneIngress`
//!
//! ## Usage Example
//!
//! ```ignore
//! use nr_02_plane_ingress::{IngressConfig, NoopDispatch, PlaneIngress, PlaneIngressApi};
//!
//! let spinal = PlaneIngress::new(IngressConfig::spinal(), bus, Arc::new(NoopDispatch))?;
//! let outcome = spinal.ingest("/spinal/in", msg).await?;
//! ```
//!
//! [`RejectEvent`]: shared_types::RejectEvent

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{build_reject, IngressConfig};
pub use error::IngressError;
pub use metrics::{IngressMetricsRecorder, IngressStats, IngressStatsSnapshot, NoOpIngressMetrics};
pub use ports::{DispatchHook, IngressOutcome, NoopDispatch, PlaneIngressApi};
pub use service::PlaneIngress;
