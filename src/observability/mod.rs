//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, pid, exit_code) instead of formatted messages
//! - Request ID flows through the HTTP trace spans
//! - Metrics are disabled by default

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
