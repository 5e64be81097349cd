//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Validate addresses that are parsed later (metrics endpoint)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerSettings → Result<(), Vec<ValidationError>>
//! - Runs before settings reach the server

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerSettings;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyHost,
    ZeroTimeout { field: &'static str },
    ZeroBodyLimit,
    EmptyTlsPath { field: &'static str },
    InvalidMetricsAddress { address: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyHost => write!(f, "host must not be empty"),
            ValidationError::ZeroTimeout { field } => write!(f, "{} must be greater than 0", field),
            ValidationError::ZeroBodyLimit => write!(f, "max_body_bytes must be greater than 0"),
            ValidationError::EmptyTlsPath { field } => write!(f, "tls.{} must not be empty", field),
            ValidationError::InvalidMetricsAddress { address } => {
                write!(f, "metrics_address `{}` is not a socket address", address)
            }
        }
    }
}

/// Validate settings, collecting every problem found.
pub fn validate_settings(settings: &ServerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if settings.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "request_timeout_secs" });
    }
    if settings.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "shutdown_timeout_secs" });
    }
    if settings.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if let Some(tls) = &settings.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "cert_path" });
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "key_path" });
        }
    }
    if let Some(address) = &settings.metrics_address {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress { address: address.clone() });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
