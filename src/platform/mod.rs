//! Host platform and framework package information.
//!
//! # Data Flow
//! ```text
//! Cargo.toml (embedded) → metadata.rs → PackageMetadata { version, engines }
//! sysinfo kernel version → PlatformVersion
//!     → lifecycle::version_gate compares the two
//! ```

pub mod metadata;
pub mod version;

use std::fmt;

pub use metadata::{MetadataError, PackageMetadata};
pub use version::{Version, VersionParseError, VersionReq};

/// Version of the running host platform (the OS kernel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVersion {
    name: String,
    raw: String,
    version: Version,
}

impl PlatformVersion {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Result<Self, VersionParseError> {
        let raw = raw.into();
        let version = Version::parse(&raw)?;
        Ok(Self {
            name: name.into(),
            raw,
            version,
        })
    }

    /// Detect the running kernel version, if the host reports one.
    pub fn detect() -> Option<Self> {
        let raw = sysinfo::System::kernel_version()?;
        match Self::new(platform_name(std::env::consts::OS), raw.as_str()) {
            Ok(platform) => Some(platform),
            Err(e) => {
                tracing::warn!(kernel = %raw, error = %e, "Unrecognised kernel version");
                None
            }
        }
    }

    /// Human name of the platform, e.g. "Linux".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version exactly as reported by the host.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.raw)
    }
}

/// Map `std::env::consts::OS` to the name used in diagnostics.
pub fn platform_name(os: &'static str) -> &'static str {
    match os {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}
