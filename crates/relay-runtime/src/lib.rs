//! # Relay Runtime Library
//!
//! Exposes the runtime internals for testing. The process entry point is the
//! `main.rs` binary.
//!
//! ## Structure
//!
//! - `container/` - Configuration and the wired component container
//! - `wiring/` - Thalamus dispatch hook and subscription topics
//! - `runtime` - Startup, background tasks and graceful shutdown

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod container;
pub mod runtime;
pub mod wiring;

pub use container::{ContainerError, RelayContainer, RuntimeConfig};
pub use runtime::RelayRuntime;
