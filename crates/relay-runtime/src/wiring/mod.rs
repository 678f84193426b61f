//! # Relay Wiring
//!
//! Connects the gate router to the bus through the thalamus boundary.
//!
//! ```text
//!   producers ──publish──► Topic Bus ──subscribe──► PlaneIngress(thalamus)
//!                                                     │ wrong type → /X/reflect/.../lane/reject
//!                                                     ▼
//!                                               RouterDispatch
//!                                                     │
//!                                                     ▼
//!                                                GateRouter ──► BusCortexPort ──► /thalamus/relay/...
//!                                                     └───────► BusGatePort ────► /G/gate/...
//! ```

pub mod router_dispatch;
pub mod subscriptions;

pub use router_dispatch::{RouterDispatch, BROADCAST_STATE, BUNDLE_ENVELOPES};
pub use subscriptions::thalamus_topics;
