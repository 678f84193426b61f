//! Service Layer
//!
//! Application service that runs the gating state machine against the
//! injected ports.

pub mod gate_router;

pub use gate_router::GateRouter;
