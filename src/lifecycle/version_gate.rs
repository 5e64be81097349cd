//! Platform version gate.
//!
//! # Responsibilities
//! - Compare the running platform against the packaged engine range
//! - Halt the process with status 1 on mismatch
//!
//! # Design Decisions
//! - Runs once, before any command is dispatched
//! - A mismatch is a process-level halt, never an error handed to a caller
//! - No declared range for the OS, or an undetectable kernel, lets the
//!   process through

use thiserror::Error;

use crate::platform::{PackageMetadata, PlatformVersion, VersionReq};

/// The running platform is older (or newer) than the package allows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "You are using {platform} {current}, but this version of {component} requires {platform} {required}.\nPlease upgrade your {platform} version."
)]
pub struct VersionIncompatible {
    pub platform: String,
    pub current: String,
    pub required: String,
    pub component: String,
}

/// Decide whether `current` satisfies `required`.
pub fn evaluate(
    required: &VersionReq,
    current: &PlatformVersion,
    component_id: &str,
) -> Result<(), VersionIncompatible> {
    if current.version().satisfies(required) {
        return Ok(());
    }
    Err(VersionIncompatible {
        platform: current.name().to_string(),
        current: current.raw().to_string(),
        required: required.to_string(),
        component: component_id.to_string(),
    })
}

/// Print a diagnostic and exit with status 1 when `current` does not satisfy `required`.
pub fn check_version(required: &VersionReq, current: &PlatformVersion, component_id: &str) {
    if let Err(incompatible) = evaluate(required, current, component_id) {
        eprintln!("{}", incompatible);
        std::process::exit(1);
    }
}

/// Gate the process on the engine range declared for the running OS.
pub fn enforce(metadata: &PackageMetadata) {
    let os = std::env::consts::OS;
    let Some(required) = metadata.required_platform(os) else {
        tracing::debug!(os, "No platform requirement declared");
        return;
    };
    let Some(current) = PlatformVersion::detect() else {
        tracing::warn!(os, required = %required, "Platform version unavailable, skipping version check");
        return;
    };

    tracing::debug!(platform = %current, required = %required, "Checking platform version");
    check_version(required, &current, metadata.name());
}
