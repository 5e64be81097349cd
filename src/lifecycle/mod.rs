//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Version gate (version_gate.rs):
//!     Packaged engine range vs. kernel version → continue or exit 1
//!
//! Startup (startup.rs):
//!     Construct application → init → build server → start
//!
//! Failure (failure.rs):
//!     Any dispatch error → lead-in + trace on stderr → exit 1
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → trigger → server drains → start() resolves → exit 0
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the version gate first, the listener last
//! - Fail fast: no retries, no rollback of partial startup
//! - Shutdown has a timeout: forced stop after the drain deadline

pub mod failure;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod version_gate;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{LaunchError, LaunchSupervisor, Readiness};
