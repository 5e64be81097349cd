//! The built-in application served when no `app.toml` is present.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use axum::{routing::get, Router};

use crate::app::Application;
use crate::cli::ParsedCommand;
use crate::config::{load_settings, with_overrides, ServerSettings};
use crate::http::response;

/// Settings file picked up from the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "nightframe.toml";

/// Welcome page, health endpoint and a JSON 404.
#[derive(Debug, Default)]
pub struct DefaultApplication {
    router: Option<Router>,
    settings: Option<ServerSettings>,
}

impl DefaultApplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings file to load: `--config`, else `nightframe.toml` in the
    /// working directory when it exists.
    fn settings_path(argv: &ParsedCommand) -> Option<PathBuf> {
        if let Some(path) = &argv.config {
            return Some(path.clone());
        }
        let local = Path::new(DEFAULT_SETTINGS_FILE);
        local.is_file().then(|| local.to_path_buf())
    }
}

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/", get(response::welcome))
        .route("/health", get(response::health))
        .fallback(response::not_found)
}

#[async_trait]
impl Application for DefaultApplication {
    async fn init(&mut self, argv: &ParsedCommand) -> anyhow::Result<()> {
        let settings = match Self::settings_path(argv) {
            Some(path) => load_settings(&path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => ServerSettings::default(),
        };
        let settings = with_overrides(settings, argv.host.as_deref(), argv.port)
            .context("invalid command line overrides")?;

        tracing::debug!(bind_address = %settings.bind_address(), "Default application ready");
        self.router = Some(routes());
        self.settings = Some(settings);
        Ok(())
    }

    fn app(&self) -> Option<Router> {
        self.router.clone()
    }

    fn settings(&self) -> Option<&ServerSettings> {
        self.settings.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::io::Write;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_uninitialized_exposes_nothing() {
        let app = DefaultApplication::new();
        assert!(app.app().is_none());
        assert!(app.settings().is_none());
    }

    #[tokio::test]
    async fn test_overrides_apply_to_defaults() {
        let mut app = DefaultApplication::new();
        let argv = ParsedCommand {
            host: Some("0.0.0.0".to_string()),
            port: Some(8081),
            ..ParsedCommand::default()
        };
        app.init(&argv).await.unwrap();

        let settings = app.settings().unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:8081");
    }

    #[tokio::test]
    async fn test_config_flag_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9001\nrequest_timeout_secs = 5").unwrap();

        let mut app = DefaultApplication::new();
        let argv = ParsedCommand {
            config: Some(file.path().to_path_buf()),
            ..ParsedCommand::default()
        };
        app.init(&argv).await.unwrap();

        let settings = app.settings().unwrap();
        assert_eq!(settings.port, 9001);
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_missing_config_fails_init() {
        let mut app = DefaultApplication::new();
        let argv = ParsedCommand {
            config: Some(PathBuf::from("/nonexistent/nightframe.toml")),
            ..ParsedCommand::default()
        };
        let err = app.init(&argv).await.unwrap_err();
        assert!(err.to_string().contains("failed to load settings"));
    }

    #[tokio::test]
    async fn test_routes() {
        let router = routes();

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        let body = axum::body::to_bytes(health.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");

        let welcome = router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(welcome.status(), StatusCode::OK);

        let missing = router
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
