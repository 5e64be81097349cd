//! Command line arguments.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

/// Parsed command line.
///
/// clap's own `--help` and `--version` handling is disabled; those flags
/// are plain booleans routed by [`crate::cli::Route`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "nightframe",
    about = "Launch a Nightframe application from the current directory",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ParsedCommand {
    /// Print this help text
    #[arg(short = 'h', long)]
    pub help: bool,

    /// Print information about the environment
    #[arg(short = 'i', long)]
    pub info: bool,

    /// Print the Nightframe version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Load server settings from FILE
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the host to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override the port to bind
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log filter, e.g. `debug` or `nightframe=trace` (defaults to RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl ParsedCommand {
    /// Rendered help text.
    pub fn help_text() -> String {
        Self::command().render_help().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let parsed = ParsedCommand::try_parse_from([
            "nightframe", "-h", "-i", "-v", "-c", "site.toml", "--host", "0.0.0.0", "-p", "8080",
            "--log-level", "debug",
        ])
        .unwrap();

        assert!(parsed.help && parsed.info && parsed.version);
        assert_eq!(parsed.config, Some(PathBuf::from("site.toml")));
        assert_eq!(parsed.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(parsed.port, Some(8080));
        assert_eq!(parsed.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_no_flags_is_default() {
        let parsed = ParsedCommand::try_parse_from(["nightframe"]).unwrap();
        assert_eq!(parsed, ParsedCommand::default());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(ParsedCommand::try_parse_from(["nightframe", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_help_text_lists_flags() {
        let help = ParsedCommand::help_text();
        assert!(help.contains("--info"));
        assert!(help.contains("--version"));
        assert!(help.contains("--config"));
    }

    #[test]
    fn test_command_definition_is_valid() {
        ParsedCommand::command().debug_assert();
    }
}
