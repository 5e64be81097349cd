//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use nightframe::platform::metadata::PackageMetadata;
use nightframe::{Application, ApplicationDefinition, Launcher, ParsedCommand, Route, ServerSettings};
use thiserror::Error;
use tokio::task::JoinHandle;

/// A document that parses as TOML but is not an application.
pub const NOT_AN_APPLICATION: &str = "greeting = \"hello\"\n";

/// Write `source` as `app.toml` into `dir`.
pub fn write_app(dir: &Path, source: &str) {
    std::fs::write(dir.join("app.toml"), source).unwrap();
}

/// A valid `app.toml` listening on an ephemeral port with the given `[app]` body.
pub fn app_toml(app: &str) -> String {
    format!(
        "[application]\nextends = \"Application\"\nname = \"fixture\"\n\n[settings]\nport = 0\nshutdown_timeout_secs = 1\n\n[app]\n{app}"
    )
}

pub fn launcher(dir: &Path) -> Launcher {
    Launcher::new(PackageMetadata::embedded().unwrap(), dir)
}

#[derive(Debug, Error)]
#[error("database unavailable at {0}")]
pub struct DatabaseUnavailable(pub String);

/// Application whose `init` always fails.
pub struct FailingApplication;

#[async_trait]
impl Application for FailingApplication {
    async fn init(&mut self, _argv: &ParsedCommand) -> anyhow::Result<()> {
        Err(DatabaseUnavailable("db.internal:5432".to_string()).into())
    }

    fn app(&self) -> Option<Router> {
        None
    }

    fn settings(&self) -> Option<&ServerSettings> {
        None
    }
}

/// Definition counting how many instances it constructs.
pub fn counting_failure() -> (ApplicationDefinition, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let definition = ApplicationDefinition::custom("failing", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        FailingApplication
    });
    (definition, built)
}

/// Run `dispatch` on a background task, returning its output with the route.
pub fn spawn_dispatch(
    launcher: &Launcher,
    parsed: ParsedCommand,
) -> JoinHandle<anyhow::Result<(Route, Vec<u8>)>> {
    let launcher = launcher.clone();
    tokio::spawn(async move {
        let mut out = Vec::new();
        let route = launcher.dispatch(&parsed, &mut out).await?;
        Ok((route, out))
    })
}

/// Wait for the launched server and return its address.
pub async fn wait_listening(launcher: &Launcher) -> SocketAddr {
    tokio::time::timeout(std::time::Duration::from_secs(10), launcher.readiness().wait())
        .await
        .expect("server did not start in time")
        .expect("readiness channel closed")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
