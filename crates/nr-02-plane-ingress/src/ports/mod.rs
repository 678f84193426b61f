//! Ports Layer
//!
//! - Driving Port (inbound) - `PlaneIngressApi`, the boundary entry point
//! - Driven Port (outbound) - `DispatchHook`, where accepted traffic goes

pub mod inbound;
pub mod outbound;

pub use inbound::{IngressOutcome, PlaneIngressApi};
pub use outbound::{DispatchHook, NoopDispatch};
