//! Applications declared in `app.toml`.
//!
//! # Responsibilities
//! - Deserialize the manifest (`[application]`, `[app]`, `[settings]`)
//! - Validate declared routes before anything is served
//! - Build the router: fixed responses, optional static directory,
//!   optional health endpoint
//!
//! # Design Decisions
//! - Every route problem is reported at `init`, never as a router panic
//! - Captures use `{name}` / `{*name}` segments only
//! - The static directory is resolved relative to `app.toml`

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    routing::{get, MethodFilter, MethodRouter},
    Router,
};
use serde::Deserialize;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::app::Application;
use crate::cli::ParsedCommand;
use crate::config::{load_settings, with_overrides, ServerSettings};
use crate::http::response::{self, StaticResponse};

/// Errors found while building a user application.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid route path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("route `{path}` uses unsupported method `{method}`")]
    InvalidMethod { path: String, method: String },

    #[error("route `{path}` has invalid status code {status}")]
    InvalidStatus { path: String, status: u16 },

    #[error("route `{path}` sets both `body` and `json`")]
    ConflictingBody { path: String },

    #[error("route {method} `{path}` is declared more than once")]
    DuplicateRoute { method: String, path: String },

    #[error("route `{path}` conflicts with `{existing}`")]
    ConflictingRoute { path: String, existing: String },

    #[error("route `{path}` has invalid header `{name}`")]
    InvalidHeader { path: String, name: String },

    #[error("static directory `{}` does not exist", path.display())]
    MissingStaticDir { path: PathBuf },
}

/// Parsed `app.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserManifest {
    pub application: ApplicationSection,
    pub app: AppSurface,
    pub settings: ServerSettings,

    /// Directory containing `app.toml`.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl UserManifest {
    pub fn name(&self) -> &str {
        self.application.name.as_deref().unwrap_or("app")
    }
}

/// `[application]`
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSection {
    pub extends: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `[app]`: the request-handler surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSurface {
    pub routes: Vec<RouteDefinition>,
    pub static_dir: Option<PathBuf>,
    pub health_check: bool,
}

impl Default for AppSurface {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            static_dir: None,
            health_check: true,
        }
    }
}

/// `[[app.routes]]`
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub json: Option<serde_json::Value>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

/// Application built from a `UserManifest`.
#[derive(Debug)]
pub struct UserApplication {
    manifest: Arc<UserManifest>,
    router: Option<Router>,
    settings: Option<ServerSettings>,
}

impl UserApplication {
    pub fn new(manifest: Arc<UserManifest>) -> Self {
        Self {
            manifest,
            router: None,
            settings: None,
        }
    }
}

#[async_trait]
impl Application for UserApplication {
    async fn init(&mut self, argv: &ParsedCommand) -> anyhow::Result<()> {
        let settings = match &argv.config {
            Some(path) => load_settings(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => self.manifest.settings.clone(),
        };
        let settings = with_overrides(settings, argv.host.as_deref(), argv.port)
            .with_context(|| format!("invalid settings for `{}`", self.manifest.name()))?;

        let router = build_router(&self.manifest)
            .with_context(|| format!("failed to build application `{}`", self.manifest.name()))?;

        tracing::info!(
            application = %self.manifest.name(),
            routes = self.manifest.app.routes.len(),
            static_dir = self.manifest.app.static_dir.is_some(),
            "User application ready"
        );
        self.router = Some(router);
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

/// Validate the manifest's `[app]` table and build its router.
pub fn build_router(manifest: &UserManifest) -> Result<Router, ApplicationError> {
    let surface = &manifest.app;
    let mut by_path: BTreeMap<&str, MethodRouter> = BTreeMap::new();
    let mut matcher = matchit::Router::new();
    let mut declared: HashSet<(Method, &str)> = HashSet::new();

    for route in &surface.routes {
        validate_path(&route.path)?;
        if !by_path.contains_key(route.path.as_str()) {
            register_path(&mut matcher, &route.path)?;
        }

        let (method, filter) = parse_method(route)?;
        if !declared.insert((method.clone(), route.path.as_str())) {
            return Err(ApplicationError::DuplicateRoute {
                method: method.to_string(),
                path: route.path.clone(),
            });
        }

        let fixed = static_response(route)?;
        let handler = move || {
            let fixed = fixed.clone();
            async move { fixed }
        };
        let entry = by_path
            .remove(route.path.as_str())
            .unwrap_or_default()
            .on(filter, handler);
        by_path.insert(&route.path, entry);
    }

    let serve_health = surface.health_check && !by_path.contains_key("/health");
    if serve_health {
        register_path(&mut matcher, "/health")?;
    }

    let mut router = Router::new();
    for (path, methods) in by_path {
        router = router.route(path, methods);
    }
    if serve_health {
        router = router.route("/health", get(response::health));
    }

    match &surface.static_dir {
        Some(dir) => {
            let dir = manifest.base_dir.join(dir);
            if !dir.is_dir() {
                return Err(ApplicationError::MissingStaticDir { path: dir });
            }
            tracing::debug!(static_dir = %dir.display(), "Serving static files");
            Ok(router.fallback_service(ServeDir::new(dir)))
        }
        None => Ok(router.fallback(response::not_found)),
    }
}

fn validate_path(path: &str) -> Result<(), ApplicationError> {
    let invalid = |reason| ApplicationError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let Some(rest) = path.strip_prefix('/') else {
        return Err(invalid("must start with `/`"));
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    for (index, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("captures are written `{name}` or `{*name}`"));
        }
        if !segment.contains(['{', '}']) {
            continue;
        }
        let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Err(invalid("a capture must span a whole segment"));
        };
        let (catch_all, name) = match inner.strip_prefix('*') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        if name.is_empty() || name.contains(['{', '}', '*']) {
            return Err(invalid("malformed capture name"));
        }
        if catch_all && index != last {
            return Err(invalid("a catch-all capture must be the last segment"));
        }
    }
    Ok(())
}

/// Insert `path` into the same matcher axum routes with, so overlapping
/// captures surface as errors instead of a panic in `Router::route`.
fn register_path(matcher: &mut matchit::Router<()>, path: &str) -> Result<(), ApplicationError> {
    matcher.insert(path, ()).map_err(|err| match err {
        matchit::InsertError::Conflict { with } => ApplicationError::ConflictingRoute {
            path: path.to_string(),
            existing: with,
        },
        _ => ApplicationError::InvalidPath {
            path: path.to_string(),
            reason: "rejected by the route matcher",
        },
    })
}

fn parse_method(route: &RouteDefinition) -> Result<(Method, MethodFilter), ApplicationError> {
    let invalid = || ApplicationError::InvalidMethod {
        path: route.path.clone(),
        method: route.method.clone(),
    };
    let method = Method::from_bytes(route.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| invalid())?;
    let filter = MethodFilter::try_from(method.clone()).map_err(|_| invalid())?;
    Ok((method, filter))
}

fn static_response(route: &RouteDefinition) -> Result<StaticResponse, ApplicationError> {
    let status = StatusCode::from_u16(route.status).map_err(|_| ApplicationError::InvalidStatus {
        path: route.path.clone(),
        status: route.status,
    })?;

    let invalid_header = |name: &str| ApplicationError::InvalidHeader {
        path: route.path.clone(),
        name: name.to_string(),
    };

    let mut headers = HeaderMap::new();
    let (body, implied_type) = match (&route.body, &route.json) {
        (Some(_), Some(_)) => {
            return Err(ApplicationError::ConflictingBody {
                path: route.path.clone(),
            })
        }
        (Some(text), None) => (text.clone(), Some("text/plain; charset=utf-8")),
        (None, Some(json)) => (json.to_string(), Some("application/json")),
        (None, None) => (String::new(), None),
    };
    if let Some(content_type) = route.content_type.as_deref().or(implied_type) {
        let value = HeaderValue::from_str(content_type)
            .map_err(|_| invalid_header(header::CONTENT_TYPE.as_str()))?;
        headers.insert(header::CONTENT_TYPE, value);
    }

    for (name, value) in &route.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header(name))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid_header(name))?;
        headers.insert(header_name, header_value);
    }

    Ok(StaticResponse::new(status, headers, body))
}
