//! Startup orchestration.
//!
//! # Responsibilities
//! - Construct the resolved application
//! - Await its initialization
//! - Build the server from the application's router and settings
//! - Start the server and hold it until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Steps run strictly in order, never concurrently
//! - No timeout on `init` or `start`; a hang blocks startup

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::app::ApplicationDefinition;
use crate::cli::ParsedCommand;
use crate::http::server::{Server, ServerError};
use crate::lifecycle::Shutdown;

/// Errors that abort a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The application's `init` failed; the original error is kept as is.
    #[error(transparent)]
    Initialization(anyhow::Error),

    /// `init` succeeded but the application exposes no router or settings.
    #[error("application `{0}` exposed no app or settings after init")]
    NotInitialized(String),

    /// The server failed to bind or serve.
    #[error(transparent)]
    Startup(#[from] ServerError),
}

/// Publishes the address the server listens on once it is bound.
#[derive(Debug, Clone)]
pub struct Readiness {
    tx: Arc<watch::Sender<Option<SocketAddr>>>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Record that the server is accepting connections on `addr`.
    pub fn mark_listening(&self, addr: SocketAddr) {
        self.tx.send_replace(Some(addr));
    }

    /// Wait until the server is listening and return its address.
    pub async fn wait(&self) -> Option<SocketAddr> {
        let mut rx = self.tx.subscribe();
        rx.wait_for(Option::is_some).await.ok().and_then(|addr| *addr)
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the launch sequence: construct → init → build server → start.
#[derive(Debug, Clone, Default)]
pub struct LaunchSupervisor {
    shutdown: Shutdown,
    readiness: Readiness,
}

impl LaunchSupervisor {
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Launch `definition` and serve until shutdown.
    pub async fn launch(
        &self,
        definition: &ApplicationDefinition,
        argv: &ParsedCommand,
    ) -> Result<(), LaunchError> {
        tracing::info!(
            application = %definition.name(),
            kind = definition.kind(),
            "Constructing application"
        );
        let mut instance = definition.construct();

        instance.init(argv).await.map_err(LaunchError::Initialization)?;

        let (Some(app), Some(settings)) = (instance.app(), instance.settings().cloned()) else {
            return Err(LaunchError::NotInitialized(definition.name().to_string()));
        };
        tracing::info!(
            application = %definition.name(),
            bind_address = %settings.bind_address(),
            tls = settings.tls.is_some(),
            "Application initialized"
        );

        let server = Server::new(app, settings)
            .with_shutdown(self.shutdown.subscribe())
            .with_readiness(self.readiness.clone());
        server.start().await?;

        // The instance stays alive for as long as the server runs.
        drop(instance);
        Ok(())
    }
}
