//! Observability subsystem: structured logging, the access log file, and
//! Prometheus metrics.

pub mod logging;
pub mod metrics;

pub use logging::{init as init_logging, LogGuard, ACCESS_TARGET};
