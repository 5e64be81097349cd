//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServerSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "IO error reading {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Parse error in {}: {}", path.display(), source)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate server settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<ServerSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: ServerSettings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Settings loaded");
    Ok(settings)
}

/// Apply `--host`/`--port` overrides and re-validate.
pub fn with_overrides(
    mut settings: ServerSettings,
    host: Option<&str>,
    port: Option<u16>,
) -> Result<ServerSettings, ConfigError> {
    settings.apply_overrides(host, port);
    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}
