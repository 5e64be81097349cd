//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Resolve the filter from `--log-level`, then `RUST_LOG`, then a default
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Human-readable format on stderr, stdout is reserved for command output
//! - A second initialization is reported, not fatal

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "nightframe=info,tower_http=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("logging was already initialized")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the filter for the given `--log-level` value.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match level {
        Some(filter) => EnvFilter::try_new(filter).map_err(|source| LoggingError::InvalidFilter {
            filter: filter.to_string(),
            source,
        }),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber.
pub fn init_logging(level: Option<&str>) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_is_used() {
        let filter = build_filter(Some("nightframe=debug")).unwrap();
        assert!(filter.to_string().contains("nightframe=debug"));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = build_filter(Some("nightframe=loudest")).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
    }
}
