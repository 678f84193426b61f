//! Domain layer: boundary configuration and reject construction.

pub mod config;
pub mod reject;

pub use config::IngressConfig;
pub use reject::{build_reject, OBSERVED_NONE, OBSERVED_SCOPE, UNKNOWN_SCOPE};
