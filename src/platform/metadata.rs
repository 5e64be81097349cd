//! Packaged metadata for the framework itself.
//!
//! The crate manifest is embedded at compile time; `package.version` feeds
//! `--version` and `package.metadata.nightframe.engines` declares the
//! minimum platform version per OS:
//!
//! ```toml
//! [package.metadata.nightframe.engines]
//! linux = ">=3.10.0"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::platform::version::{VersionParseError, VersionReq};

const EMBEDDED_MANIFEST: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));

/// Errors raised while reading packaged metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("package manifest could not be parsed")]
    Parse(#[from] toml::de::Error),

    #[error("engine range declared for `{os}` is invalid")]
    Engine {
        os: String,
        #[source]
        source: VersionParseError,
    },
}

#[derive(Deserialize)]
struct Manifest {
    package: PackageSection,
}

#[derive(Deserialize)]
struct PackageSection {
    name: String,
    version: String,
    #[serde(default)]
    metadata: MetadataSection,
}

#[derive(Deserialize, Default)]
struct MetadataSection {
    #[serde(default)]
    nightframe: FrameworkSection,
}

#[derive(Deserialize, Default)]
struct FrameworkSection {
    #[serde(default)]
    engines: BTreeMap<String, String>,
}

/// Name, version and engine ranges of the framework package.
///
/// Loaded once at process start and passed by reference afterwards.
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    name: String,
    version: String,
    engines: BTreeMap<String, VersionReq>,
}

impl PackageMetadata {
    /// Metadata of this build, read from the embedded manifest.
    pub fn embedded() -> Result<Self, MetadataError> {
        Self::from_manifest(EMBEDDED_MANIFEST)
    }

    /// Parse metadata from a `Cargo.toml` document.
    pub fn from_manifest(source: &str) -> Result<Self, MetadataError> {
        let manifest: Manifest = toml::from_str(source)?;
        let package = manifest.package;

        let engines = package
            .metadata
            .nightframe
            .engines
            .into_iter()
            .map(|(os, range)| match VersionReq::parse(&range) {
                Ok(req) => Ok((os, req)),
                Err(source) => Err(MetadataError::Engine { os, source }),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            name: package.name,
            version: package.version,
            engines,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The required platform range for an OS (`std::env::consts::OS`), if declared.
    pub fn required_platform(&self, os: &str) -> Option<&VersionReq> {
        self.engines.get(os)
    }
}
