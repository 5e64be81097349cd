//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap an application's router in the shared middleware stack
//! - Bind the listener (plain TCP or TLS) from `ServerSettings`
//! - Publish the bound address through `Readiness`
//! - Serve until shutdown, then drain in-flight requests
//!
//! # Design Decisions
//! - `start` resolves only when the server stops
//! - Draining is bounded by `shutdown_timeout_secs`; after that the
//!   server is dropped with connections still open
//! - Without a shutdown signal the server runs until the process exits

use std::future::IntoFuture;
use std::net::{AddrParseError, SocketAddr};
use std::path::Path;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    middleware, Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ServerSettings, TlsConfig};
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::{Readiness, ShutdownSignal};
use crate::observability::metrics;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load TLS certificate `{cert_path}` or key `{key_path}`")]
    Tls {
        cert_path: String,
        key_path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address `{address}`")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to start metrics exporter")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server stopped unexpectedly")]
    Serve(#[source] std::io::Error),
}

/// HTTP server for one application.
pub struct Server {
    app: Router,
    settings: ServerSettings,
    shutdown: Option<ShutdownSignal>,
    readiness: Readiness,
}

impl Server {
    /// Create a server for `app` with the given settings.
    pub fn new(app: Router, settings: ServerSettings) -> Self {
        Self {
            app,
            settings,
            shutdown: None,
            readiness: Readiness::new(),
        }
    }

    /// Stop serving when `signal` fires.
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Report the bound address through `readiness`.
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Build the router with all middleware layers, outermost first.
    #[allow(deprecated)]
    fn build_router(app: Router, settings: &ServerSettings) -> Router {
        let stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::SERVER,
                server_header(),
            ))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                settings.request_timeout_secs,
            )));
        app.layer(stack)
    }

    /// Bind and serve until shutdown.
    pub async fn start(self) -> Result<(), ServerError> {
        let Server {
            app,
            settings,
            shutdown,
            readiness,
        } = self;

        if let Some(address) = &settings.metrics_address {
            let addr: SocketAddr =
                address
                    .parse()
                    .map_err(|source| ServerError::MetricsAddress {
                        address: address.clone(),
                        source,
                    })?;
            metrics::init_metrics(addr)?;
        }

        let router = Self::build_router(app, &settings);
        match &settings.tls {
            Some(tls) => serve_tls(router, &settings, tls, shutdown, readiness).await,
            None => serve_plain(router, &settings, shutdown, readiness).await,
        }
    }
}

fn server_header() -> HeaderValue {
    HeaderValue::from_static(concat!("nightframe/", env!("CARGO_PKG_VERSION")))
}

async fn serve_plain(
    router: Router,
    settings: &ServerSettings,
    shutdown: Option<ShutdownSignal>,
    readiness: Readiness,
) -> Result<(), ServerError> {
    let address = settings.bind_address();
    let bind_error = |source| ServerError::Bind {
        address: address.clone(),
        source,
    };

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;
    tracing::info!(address = %local_addr, "HTTP server listening");
    readiness.mark_listening(local_addr);

    let drain = Duration::from_secs(settings.shutdown_timeout_secs);
    let serve = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()))
    .into_future();

    tokio::select! {
        result = serve => result.map_err(ServerError::Serve)?,
        _ = drain_deadline(shutdown, drain) => {
            tracing::warn!(
                timeout_secs = settings.shutdown_timeout_secs,
                "Drain timeout elapsed, forcing shutdown"
            );
        }
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn serve_tls(
    router: Router,
    settings: &ServerSettings,
    tls: &TlsConfig,
    shutdown: Option<ShutdownSignal>,
    readiness: Readiness,
) -> Result<(), ServerError> {
    let address = settings.bind_address();
    let addr = tokio::net::lookup_host(address.as_str())
        .await
        .and_then(|mut addrs| {
            addrs.next().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "host did not resolve to any address",
                )
            })
        })
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    let config = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
        .await
        .map_err(|source| ServerError::Tls {
            cert_path: tls.cert_path.clone(),
            key_path: tls.key_path.clone(),
            source,
        })?;

    let handle = Handle::new();

    let listening = handle.clone();
    tokio::spawn(async move {
        if let Some(local_addr) = listening.listening().await {
            tracing::info!(address = %local_addr, tls = true, "HTTP server listening");
            readiness.mark_listening(local_addr);
        }
    });

    let drain = Duration::from_secs(settings.shutdown_timeout_secs);
    let stopping = handle.clone();
    tokio::spawn(async move {
        wait_for_shutdown(shutdown).await;
        stopping.graceful_shutdown(Some(drain));
    });

    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|source| ServerError::Bind { address, source })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Load TLS configuration from certificate and key files.
async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

async fn wait_for_shutdown(signal: Option<ShutdownSignal>) {
    match signal {
        Some(signal) => signal.recv().await,
        None => std::future::pending().await,
    }
}

async fn drain_deadline(signal: Option<ShutdownSignal>, drain: Duration) {
    wait_for_shutdown(signal).await;
    tokio::time::sleep(drain).await;
}
