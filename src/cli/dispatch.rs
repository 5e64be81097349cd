//! Command dispatch.
//!
//! # Responsibilities
//! - Route the parsed command to help, info, version or run
//! - Run: resolve the application, then hand it to the launch supervisor
//! - Funnel every failure into one `anyhow::Error` for the failure reporter
//!
//! # Design Decisions
//! - Output goes through a caller-supplied writer, stdout in the binary
//! - Help, info and version never touch the working directory's application

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

use crate::app::{ApplicationDefinition, ApplicationResolver};
use crate::cli::{ParsedCommand, Route};
use crate::info::{self, InfoOptions, InfoRequest};
use crate::lifecycle::{LaunchSupervisor, Readiness, Shutdown};
use crate::platform::metadata::PackageMetadata;

/// Process-wide launcher state, built once in `main`.
#[derive(Debug, Clone)]
pub struct Launcher {
    metadata: PackageMetadata,
    working_dir: PathBuf,
    resolver: ApplicationResolver,
    supervisor: LaunchSupervisor,
    info_request: InfoRequest,
    info_options: InfoOptions,
}

impl Launcher {
    pub fn new(metadata: PackageMetadata, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            working_dir: working_dir.into(),
            resolver: ApplicationResolver::new(),
            supervisor: LaunchSupervisor::default(),
            info_request: InfoRequest::default(),
            info_options: InfoOptions::default(),
        }
    }

    /// Launch `fallback` when the working directory has no `app.toml`.
    pub fn with_fallback(mut self, fallback: ApplicationDefinition) -> Self {
        self.resolver = ApplicationResolver::with_fallback(fallback);
        self
    }

    /// Replace what `--info` reports on.
    pub fn with_info_request(mut self, request: InfoRequest) -> Self {
        self.info_request = request;
        self
    }

    /// Coordinator that stops a running server.
    pub fn shutdown(&self) -> &Shutdown {
        self.supervisor.shutdown()
    }

    /// Bound address of a running server.
    pub fn readiness(&self) -> &Readiness {
        self.supervisor.readiness()
    }

    /// Execute the route selected by `parsed`, writing command output to `out`.
    pub async fn dispatch<W: Write>(&self, parsed: &ParsedCommand, out: &mut W) -> anyhow::Result<Route> {
        let route = Route::from_command(parsed);
        tracing::debug!(?route, "Dispatching command");

        match route {
            Route::ShowHelp => self.show_help(out)?,
            Route::ShowInfo => self.show_info(out).await?,
            Route::ShowVersion => self.show_version(out)?,
            Route::Run => self.run(parsed).await?,
        }
        Ok(route)
    }

    fn show_help<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "{}", ParsedCommand::help_text())?;
        Ok(())
    }

    async fn show_info<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "  Environment Info:")?;
        let report = info::collect(&self.info_request, &self.info_options)
            .await
            .context("failed to collect environment info")?;
        writeln!(out, "{report}")?;
        Ok(())
    }

    fn show_version<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "  Nightframe:")?;
        writeln!(out, "    version: {}", self.metadata.version())?;
        Ok(())
    }

    async fn run(&self, parsed: &ParsedCommand) -> anyhow::Result<()> {
        let definition = self.resolver.resolve(&self.working_dir)?;
        self.supervisor.launch(&definition, parsed).await?;
        tracing::info!(application = %definition.name(), "Application stopped");
        Ok(())
    }
}
