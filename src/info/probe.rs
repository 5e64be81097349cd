//! Locating binaries and reading their versions.
//!
//! # Design Decisions
//! - Binaries are found by scanning `PATH`, never through a shell
//! - Application bundles (macOS `.app` directories) are read from their
//!   `Info.plist` instead of being executed
//! - A version probe that fails or hangs leaves the version unknown; it
//!   never fails the report

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::info::report::{Entry, EntryStatus};
use crate::info::InfoOptions;

/// Upper bound for one `--version` call.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How to find one binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySpec {
    pub label: String,
    /// Executable names searched on `PATH`, in order.
    pub executables: Vec<String>,
    /// Application bundle directories checked after `PATH`.
    pub bundles: Vec<PathBuf>,
    pub version_flag: String,
}

impl BinarySpec {
    pub fn new(label: impl Into<String>, executables: &[&str]) -> Self {
        Self {
            label: label.into(),
            executables: executables.iter().map(|name| name.to_string()).collect(),
            bundles: Vec::new(),
            version_flag: "--version".to_string(),
        }
    }

    pub fn with_bundles(mut self, bundles: &[&str]) -> Self {
        self.bundles = bundles.iter().map(PathBuf::from).collect();
        self
    }
}

/// Locate `spec` on `search_path` and read its version.
pub async fn probe(spec: &BinarySpec, options: &InfoOptions, search_path: Option<&OsStr>) -> Entry {
    let mut found: Vec<PathBuf> = spec
        .executables
        .iter()
        .flat_map(|name| find_in_path(name, search_path))
        .collect();
    found.extend(spec.bundles.iter().filter(|bundle| bundle.is_dir()).cloned());

    if options.full_tree {
        found = found
            .into_iter()
            .map(|path| std::fs::canonicalize(&path).unwrap_or(path))
            .collect();
    }
    dedupe(&mut found);

    let Some(primary) = found.first().cloned() else {
        tracing::debug!(binary = %spec.label, "Binary not found");
        return Entry::not_found(&spec.label);
    };

    let version = if primary.is_dir() {
        bundle_version(&primary)
    } else {
        run_version(&primary, &spec.version_flag).await
    };
    let duplicates = if options.duplicates {
        found.split_off(1)
    } else {
        Vec::new()
    };

    Entry {
        label: spec.label.clone(),
        status: EntryStatus::Found {
            version,
            path: primary,
            duplicates,
        },
    }
}

/// Every executable named `name` on `search_path`, in `PATH` order.
pub fn find_in_path(name: &str, search_path: Option<&OsStr>) -> Vec<PathBuf> {
    let Some(search_path) = search_path else {
        return Vec::new();
    };
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .filter(|candidate| is_executable(candidate))
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn dedupe(paths: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
}

async fn run_version(path: &Path, flag: &str) -> Option<String> {
    let command = Command::new(path).arg(flag).kill_on_drop(true).output();
    match tokio::time::timeout(PROBE_TIMEOUT, command).await {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_version(&stdout).or_else(|| parse_version(&String::from_utf8_lossy(&output.stderr)))
        }
        Ok(Err(err)) => {
            tracing::debug!(path = %path.display(), error = %err, "Version probe failed");
            None
        }
        Err(_) => {
            tracing::warn!(
                path = %path.display(),
                timeout_secs = PROBE_TIMEOUT.as_secs(),
                "Version probe timed out"
            );
            None
        }
    }
}

/// First whitespace-separated token that looks like a dotted version.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .map(|token| token.trim_start_matches('v').trim_end_matches([',', ')', ';']))
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()) && token.contains('.'))
        .map(str::to_string)
}

/// `CFBundleShortVersionString` from a bundle's XML `Info.plist`.
fn bundle_version(bundle: &Path) -> Option<String> {
    let plist = std::fs::read_to_string(bundle.join("Contents").join("Info.plist")).ok()?;
    plist_string(&plist, "CFBundleShortVersionString")
}

fn plist_string(plist: &str, key: &str) -> Option<String> {
    let marker = format!("<key>{key}</key>");
    let after = &plist[plist.find(&marker)? + marker.len()..];
    let start = after.find("<string>")? + "<string>".len();
    let end = after[start..].find("</string>")? + start;
    Some(after[start..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("rustc 1.80.0 (051478957 2024-07-21)").as_deref(),
            Some("1.80.0")
        );
        assert_eq!(parse_version("Mozilla Firefox 121.0").as_deref(), Some("121.0"));
        assert_eq!(parse_version("tool v2.3.4, build 7").as_deref(), Some("2.3.4"));
        assert_eq!(parse_version("no version here 42"), None);
    }

    #[test]
    fn test_plist_string() {
        let plist = "<dict>\n\t<key>CFBundleName</key>\n\t<string>Safari</string>\n\t<key>CFBundleShortVersionString</key>\n\t<string>17.2</string>\n</dict>";
        assert_eq!(plist_string(plist, "CFBundleShortVersionString").as_deref(), Some("17.2"));
        assert_eq!(plist_string(plist, "CFBundleVersion"), None);
    }

    #[tokio::test]
    async fn test_bundle_is_read_not_executed() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("Viewer.app");
        std::fs::create_dir_all(bundle.join("Contents")).unwrap();
        std::fs::write(
            bundle.join("Contents/Info.plist"),
            "<key>CFBundleShortVersionString</key><string>3.1</string>",
        )
        .unwrap();

        let spec = BinarySpec::new("Viewer", &[]).with_bundles(&[bundle.to_str().unwrap()]);
        let entry = probe(&spec, &InfoOptions::default(), None).await;

        let EntryStatus::Found { version, .. } = entry.status else {
            panic!("expected the bundle to be found");
        };
        assert_eq!(version.as_deref(), Some("3.1"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let spec = BinarySpec::new("Ghost", &["nightframe-ghost-binary"]);
        let entry = probe(&spec, &InfoOptions::default(), Some(dir.path().as_os_str())).await;
        assert_eq!(entry, Entry::not_found("Ghost"));
    }

    #[cfg(unix)]
    fn fake_binary(dir: &Path, name: &str, output: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\necho '{output}'\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_version_and_duplicates() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let primary = fake_binary(first.path(), "fakebin", "fakebin 2.3.4 (abc)");
        let other = fake_binary(second.path(), "fakebin", "fakebin 9.9.9");
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();

        let options = InfoOptions {
            full_tree: false,
            ..InfoOptions::default()
        };
        let entry = probe(&BinarySpec::new("Fake", &["fakebin"]), &options, Some(search.as_os_str())).await;
        assert_eq!(
            entry.status,
            EntryStatus::Found {
                version: Some("2.3.4".to_string()),
                path: primary,
                duplicates: vec![other],
            }
        );

        let options = InfoOptions {
            duplicates: false,
            full_tree: false,
            ..InfoOptions::default()
        };
        let entry = probe(&BinarySpec::new("Fake", &["fakebin"]), &options, Some(search.as_os_str())).await;
        let EntryStatus::Found { duplicates, .. } = entry.status else {
            panic!("expected fakebin to be found");
        };
        assert!(duplicates.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_full_tree_resolves_symlinks() {
        let real = tempfile::tempdir().unwrap();
        let links = tempfile::tempdir().unwrap();
        let target = fake_binary(real.path(), "fakebin", "fakebin 1.0.0");
        std::os::unix::fs::symlink(&target, links.path().join("fakebin")).unwrap();

        let entry = probe(
            &BinarySpec::new("Fake", &["fakebin"]),
            &InfoOptions::default(),
            Some(links.path().as_os_str()),
        )
        .await;
        let EntryStatus::Found { path, .. } = entry.status else {
            panic!("expected fakebin to be found");
        };
        assert_eq!(path, std::fs::canonicalize(target).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain"), "data").unwrap();
        assert!(find_in_path("plain", Some(dir.path().as_os_str())).is_empty());
    }
}
