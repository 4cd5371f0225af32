//! Process-wide logging setup shared by the binaries.

/// Initialize structured logging.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
