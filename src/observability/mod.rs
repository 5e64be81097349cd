//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Launcher, server, application:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → Terminal / log aggregation (stderr)
//!     → Metrics endpoint (Prometheus scrape, when configured)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so `--info` and `--version` output stays clean
//! - Request ID flows through the trace span of every request
//! - Metrics are recorded unconditionally; without an installed exporter
//!   the macros are no-ops

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingError};
