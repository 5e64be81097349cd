//! Environment information for `--info`.
//!
//! # Data Flow
//! ```text
//! InfoRequest (System, Binaries, Browsers) + InfoOptions
//!     → system.rs (sysinfo, on a blocking thread)
//!     → probe.rs (PATH scan, `--version`, bundle Info.plist)
//!     → report.rs (Report, rendered envinfo style)
//! ```
//!
//! # Design Decisions
//! - Missing tools are part of the report, not errors
//! - Probes run one after another; each is bounded by a timeout

use std::ffi::OsString;

use thiserror::Error;

pub mod probe;
pub mod report;
pub mod system;

pub use probe::BinarySpec;
pub use report::{Entry, EntryStatus, Report, Section};
pub use system::SystemField;

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("system information task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Executable file name for the current OS.
macro_rules! exe {
    ($name:literal) => {
        if cfg!(windows) {
            concat!($name, ".exe")
        } else {
            $name
        }
    };
}

/// What the report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    pub system: Vec<SystemField>,
    pub binaries: Vec<BinarySpec>,
    pub browsers: Vec<BinarySpec>,
}

impl Default for InfoRequest {
    fn default() -> Self {
        Self {
            system: vec![SystemField::Os, SystemField::Cpu],
            binaries: vec![
                BinarySpec::new("Rustc", &[exe!("rustc")]),
                BinarySpec::new("Cargo", &[exe!("cargo")]),
                BinarySpec::new("Rustup", &[exe!("rustup")]),
            ],
            browsers: default_browsers(),
        }
    }
}

#[cfg(target_os = "macos")]
fn default_browsers() -> Vec<BinarySpec> {
    vec![
        BinarySpec::new("Chrome", &[]).with_bundles(&["/Applications/Google Chrome.app"]),
        BinarySpec::new("Edge", &[]).with_bundles(&["/Applications/Microsoft Edge.app"]),
        BinarySpec::new("Firefox", &[]).with_bundles(&["/Applications/Firefox.app"]),
        BinarySpec::new("Safari", &[]).with_bundles(&["/Applications/Safari.app"]),
    ]
}

#[cfg(windows)]
fn default_browsers() -> Vec<BinarySpec> {
    vec![
        BinarySpec::new("Chrome", &["chrome.exe"]),
        BinarySpec::new("Edge", &["msedge.exe"]),
        BinarySpec::new("Firefox", &["firefox.exe"]),
        BinarySpec::new("Safari", &[]),
    ]
}

#[cfg(not(any(target_os = "macos", windows)))]
fn default_browsers() -> Vec<BinarySpec> {
    vec![
        BinarySpec::new(
            "Chrome",
            &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"],
        ),
        BinarySpec::new("Edge", &["microsoft-edge", "microsoft-edge-stable"]),
        BinarySpec::new("Firefox", &["firefox"]),
        BinarySpec::new("Safari", &[]),
    ]
}

/// Rendering and lookup options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoOptions {
    /// Keep `Not Found` entries in the report.
    pub show_not_found: bool,
    /// List every further match on `PATH`.
    pub duplicates: bool,
    /// Resolve symlinks to the real install location.
    pub full_tree: bool,
}

impl Default for InfoOptions {
    fn default() -> Self {
        Self {
            show_not_found: true,
            duplicates: true,
            full_tree: true,
        }
    }
}

/// Collect the report for `request` using the process `PATH`.
pub async fn collect(request: &InfoRequest, options: &InfoOptions) -> Result<Report, InfoError> {
    let search_path = std::env::var_os("PATH");
    collect_with_path(request, options, search_path).await
}

/// Collect the report, searching binaries on `search_path`.
pub async fn collect_with_path(
    request: &InfoRequest,
    options: &InfoOptions,
    search_path: Option<OsString>,
) -> Result<Report, InfoError> {
    let mut report = Report::default();

    if !request.system.is_empty() {
        let fields = request.system.clone();
        let entries = tokio::task::spawn_blocking(move || system::collect(&fields)).await?;
        report.sections.push(Section {
            title: "System".to_string(),
            entries,
        });
    }

    for (title, specs) in [("Binaries", &request.binaries), ("Browsers", &request.browsers)] {
        if specs.is_empty() {
            continue;
        }
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let entry = probe::probe(spec, options, search_path.as_deref()).await;
            if entry.is_found() || options.show_not_found {
                entries.push(entry);
            }
        }
        report.sections.push(Section {
            title: title.to_string(),
            entries,
        });
    }

    tracing::debug!(sections = report.sections.len(), "Environment report collected");
    Ok(report)
}
