//! # Shared Types Crate
//!
//! Message model shared by every relay boundary: envelopes, gate states,
//! relay decisions, reject events and the topic naming rules that address
//! them.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-boundary type is defined here.
//! - **Validated Addressing**: topics are only built through [`topics`], which
//!   refuses path components outside `[a-zA-Z0-9_-]`.
//! - **Fail-Open Gates**: an absent or expired [`GateState`] means inhibition
//!   `0.0`.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod message;
pub mod topics;

pub use entities::*;
pub use envelope::{Envelope, Meta};
pub use errors::*;
pub use message::{BusMessage, PlaneSignal};
