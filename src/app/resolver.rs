//! Application resolution from the working directory.
//!
//! # Responsibilities
//! - Detect `app.toml` in the working directory
//! - Check the document against the application contract
//! - Fall back to the configured definition when no file exists
//!
//! # Design Decisions
//! - The contract is checked on the raw TOML table before deserializing,
//!   so a wrong shape reports the contract message instead of a serde error
//! - Resolution is synchronous and happens once per process

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::app::{ApplicationDefinition, UserManifest};

/// File name of the user application definition.
pub const APP_DEFINITION_FILE: &str = "app.toml";

/// Base class name `[application] extends` must carry.
pub const BASE_APPLICATION: &str = "Application";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("app.toml must export a class which extends the <Application> base class.")]
    ContractViolation {
        path: PathBuf,
        missing: Vec<&'static str>,
    },
}

/// Decides which application this process launches.
#[derive(Debug, Clone, Default)]
pub struct ApplicationResolver {
    fallback: ApplicationDefinition,
}

impl ApplicationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fallback` when no `app.toml` exists.
    pub fn with_fallback(fallback: ApplicationDefinition) -> Self {
        Self { fallback }
    }

    /// Resolve the application for `working_dir`.
    pub fn resolve(&self, working_dir: &Path) -> Result<ApplicationDefinition, ResolveError> {
        let path = working_dir.join(APP_DEFINITION_FILE);
        if !path.is_file() {
            tracing::debug!(
                working_dir = %working_dir.display(),
                fallback = %self.fallback.name(),
                "No application definition found"
            );
            return Ok(self.fallback.clone());
        }

        let source = std::fs::read_to_string(&path).map_err(|source| ResolveError::Read {
            path: path.clone(),
            source,
        })?;
        let document: toml::Table = toml::from_str(&source).map_err(|source| ResolveError::Parse {
            path: path.clone(),
            source,
        })?;

        if let Err(missing) = check_contract(&document) {
            tracing::debug!(path = %path.display(), ?missing, "Application contract not met");
            return Err(ResolveError::ContractViolation { path, missing });
        }

        let mut manifest: UserManifest = toml::Value::Table(document)
            .try_into()
            .map_err(|source| ResolveError::Parse {
                path: path.clone(),
                source,
            })?;
        manifest.base_dir = working_dir.to_path_buf();

        tracing::info!(path = %path.display(), application = %manifest.name(), "Resolved user application");
        Ok(ApplicationDefinition::User(Arc::new(manifest)))
    }
}

/// Names of contract members the document lacks.
pub fn check_contract(document: &toml::Table) -> Result<(), Vec<&'static str>> {
    let mut missing = Vec::new();

    let extends = document
        .get("application")
        .and_then(toml::Value::as_table)
        .and_then(|section| section.get("extends"))
        .and_then(toml::Value::as_str);
    if extends != Some(BASE_APPLICATION) {
        missing.push("application.extends");
    }
    if !document.get("app").is_some_and(toml::Value::is_table) {
        missing.push("app");
    }
    if !document.get("settings").is_some_and(toml::Value::is_table) {
        missing.push("settings");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[application]
extends = "Application"
name = "shop"

[app]

[settings]
port = 8080
"#;

    #[test]
    fn test_absent_file_resolves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let definition = ApplicationResolver::new().resolve(dir.path()).unwrap();
        assert_eq!(definition.kind(), "default");
    }

    #[test]
    fn test_directory_named_app_toml_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(APP_DEFINITION_FILE)).unwrap();
        let definition = ApplicationResolver::new().resolve(dir.path()).unwrap();
        assert_eq!(definition.kind(), "default");
    }

    #[test]
    fn test_valid_file_resolves_user_application() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(APP_DEFINITION_FILE), VALID).unwrap();

        let definition = ApplicationResolver::new().resolve(dir.path()).unwrap();
        let ApplicationDefinition::User(manifest) = definition else {
            panic!("expected a user application");
        };
        assert_eq!(manifest.name(), "shop");
        assert_eq!(manifest.settings.port, 8080);
        assert_eq!(manifest.base_dir, dir.path());
    }

    #[test]
    fn test_contract_violation_has_fixed_message() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(APP_DEFINITION_FILE), "greeting = \"hello\"\n").unwrap();

        let err = ApplicationResolver::new().resolve(dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "app.toml must export a class which extends the <Application> base class."
        );
        let ResolveError::ContractViolation { missing, .. } = err else {
            panic!("expected a contract violation");
        };
        assert_eq!(missing, vec!["application.extends", "app", "settings"]);
    }

    #[test]
    fn test_wrong_base_class_violates_contract() {
        let document: toml::Table = toml::from_str(
            "[application]\nextends = \"Service\"\n[app]\n[settings]\n",
        )
        .unwrap();
        assert_eq!(check_contract(&document), Err(vec!["application.extends"]));
    }

    #[test]
    fn test_members_must_be_tables() {
        let document: toml::Table = toml::from_str(
            "app = \"yes\"\nsettings = 1\n[application]\nextends = \"Application\"\n",
        )
        .unwrap();
        assert_eq!(check_contract(&document), Err(vec!["app", "settings"]));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(APP_DEFINITION_FILE), "[application\n").unwrap();

        let err = ApplicationResolver::new().resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn test_mistyped_member_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(APP_DEFINITION_FILE),
            "[application]\nextends = \"Application\"\n[app]\nroutes = 5\n[settings]\n",
        )
        .unwrap();

        let err = ApplicationResolver::new().resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn test_custom_fallback_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ApplicationResolver::with_fallback(ApplicationDefinition::custom(
            "embedded",
            crate::app::DefaultApplication::new,
        ));
        let definition = resolver.resolve(dir.path()).unwrap();
        assert_eq!(definition.name(), "embedded");
    }
}
