//! Infrastructure layer: adapters for external services.

pub mod permit;

pub use permit::{PermitClient, PermitConfig, DEFAULT_API_URL, DEFAULT_PDP_URL, DEFAULT_TIMEOUT};
