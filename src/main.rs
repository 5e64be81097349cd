//! Nightframe launcher.
//!
//! Starts the application defined in the current directory, or prints
//! help, environment info or the version.
//!
//! # Architecture Overview
//!
//! ```text
//!     argv
//!       │
//!       ▼
//!  ┌──────────────┐   ┌──────────┐   ┌────────────┐
//!  │ version gate │──▶│   cli    │──▶│  dispatch  │──▶ help / info / version
//!  │  (platform)  │   │  (clap)  │   │ (launcher) │
//!  └──────────────┘   └──────────┘   └─────┬──────┘
//!                                          │ run
//!                                          ▼
//!                 ┌──────────┐   ┌──────────────────┐   ┌──────────┐
//!                 │ resolver │──▶│ launch supervisor│──▶│  server  │
//!                 │ app.toml │   │ construct + init │   │  (axum)  │
//!                 └──────────┘   └──────────────────┘   └──────────┘
//!
//!     any failure after the gate ──▶ failure reporter ──▶ exit 1
//! ```

use clap::Parser;

use nightframe::cli::{Launcher, ParsedCommand};
use nightframe::lifecycle::{failure, signals, version_gate};
use nightframe::observability::init_logging;
use nightframe::platform::metadata::PackageMetadata;

#[tokio::main]
async fn main() {
    let metadata = match PackageMetadata::embedded() {
        Ok(metadata) => metadata,
        Err(err) => failure::exit_with(&anyhow::Error::new(err)),
    };
    version_gate::enforce(&metadata);

    let parsed = ParsedCommand::parse();

    if let Err(err) = init_logging(parsed.log_level.as_deref()) {
        failure::exit_with(&anyhow::Error::new(err));
    }

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            let err = anyhow::Error::new(err).context("failed to read the working directory");
            failure::exit_with(&err)
        }
    };

    let launcher = Launcher::new(metadata, working_dir);
    signals::forward_to(launcher.shutdown().clone());

    let mut stdout = std::io::stdout();
    if let Err(err) = launcher.dispatch(&parsed, &mut stdout).await {
        failure::exit_with(&err);
    }
}
