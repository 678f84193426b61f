//! Service layer: the generic plane boundary.

pub mod plane_ingress;

pub use plane_ingress::PlaneIngress;
