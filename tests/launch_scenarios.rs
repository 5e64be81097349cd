//! End-to-end launch scenarios through the library API.

use std::sync::atomic::Ordering;

use nightframe::app::ResolveError;
use nightframe::lifecycle::{failure, LaunchError};
use nightframe::{ParsedCommand, Route};

mod common;

fn ephemeral() -> ParsedCommand {
    ParsedCommand {
        port: Some(0),
        ..ParsedCommand::default()
    }
}

#[tokio::test]
async fn test_default_application_serves_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = common::launcher(dir.path());

    let task = common::spawn_dispatch(&launcher, ephemeral());
    let addr = common::wait_listening(&launcher).await;

    let res = common::client()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let res = common::client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert!(res.text().await.unwrap().contains("Nightframe"));

    launcher.shutdown().trigger();
    let (route, out) = task.await.unwrap().unwrap();
    assert_eq!(route, Route::Run);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_user_application_serves_declared_routes() {
    let dir = tempfile::tempdir().unwrap();
    common::write_app(
        dir.path(),
        &common::app_toml(
            "[[app.routes]]\npath = \"/greet/{name}\"\njson = { greeting = \"hello\" }\n",
        ),
    );
    let launcher = common::launcher(dir.path());

    let task = common::spawn_dispatch(&launcher, ParsedCommand::default());
    let addr = common::wait_listening(&launcher).await;

    let res = common::client()
        .get(format!("http://{addr}/greet/ada"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["greeting"], "hello");

    let res = common::client()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    launcher.shutdown().trigger();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_invalid_definition_is_a_contract_violation() {
    let dir = tempfile::tempdir().unwrap();
    common::write_app(dir.path(), common::NOT_AN_APPLICATION);
    let (fallback, built) = common::counting_failure();
    let launcher = common::launcher(dir.path()).with_fallback(fallback);

    let err = launcher
        .dispatch(&ParsedCommand::default(), &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ResolveError>(),
        Some(ResolveError::ContractViolation { .. })
    ));
    assert_eq!(built.load(Ordering::SeqCst), 0);

    let mut report = Vec::new();
    failure::report(&err, &mut report, false).unwrap();
    let report = String::from_utf8(report).unwrap();
    assert!(report.contains("must export a class which extends"));
}

#[tokio::test]
async fn test_version_constructs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (fallback, built) = common::counting_failure();
    let launcher = common::launcher(dir.path()).with_fallback(fallback);
    let parsed = ParsedCommand {
        version: true,
        ..ParsedCommand::default()
    };

    let mut out = Vec::new();
    let route = launcher.dispatch(&parsed, &mut out).await.unwrap();

    assert_eq!(route, Route::ShowVersion);
    assert!(String::from_utf8(out)
        .unwrap()
        .contains(env!("CARGO_PKG_VERSION")));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_init_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (fallback, built) = common::counting_failure();
    let launcher = common::launcher(dir.path()).with_fallback(fallback);

    let err = launcher
        .dispatch(&ParsedCommand::default(), &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LaunchError>(),
        Some(LaunchError::Initialization(_))
    ));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let mut report = Vec::new();
    failure::report(&err, &mut report, false).unwrap();
    let report = String::from_utf8(report).unwrap();
    assert!(report.contains(failure::LEAD_IN));
    assert!(report.contains("database unavailable at db.internal:5432"));
}

#[tokio::test]
async fn test_occupied_port_is_a_startup_failure() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let launcher = common::launcher(dir.path());
    let parsed = ParsedCommand {
        port: Some(occupied.local_addr().unwrap().port()),
        ..ParsedCommand::default()
    };

    let err = launcher
        .dispatch(&parsed, &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LaunchError>(),
        Some(LaunchError::Startup(_))
    ));
}

#[tokio::test]
async fn test_broken_user_application_fails_init() {
    let dir = tempfile::tempdir().unwrap();
    common::write_app(dir.path(), &common::app_toml("static_dir = \"public\"\n"));
    let launcher = common::launcher(dir.path());

    let err = launcher
        .dispatch(&ParsedCommand::default(), &mut std::io::sink())
        .await
        .unwrap_err();

    let report = format!("{err:?}");
    assert!(report.contains("failed to build application `fixture`"));
    assert!(report.contains("does not exist"));
}
