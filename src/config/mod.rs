//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! nightframe.toml / app.toml [settings] / --config FILE
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → --host / --port overrides (re-validated)
//!     → ServerSettings (validated, immutable)
//!     → handed to the server by the launch supervisor
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once the application has initialized
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, with_overrides, ConfigError};
pub use schema::{ServerSettings, TlsConfig};
