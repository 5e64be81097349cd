//! Command routing.

use crate::cli::ParsedCommand;

/// What the launcher does for a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ShowHelp,
    ShowInfo,
    ShowVersion,
    Run,
}

impl Route {
    /// First match wins: help, then info, then version, then run.
    pub fn from_command(parsed: &ParsedCommand) -> Self {
        if parsed.help {
            Route::ShowHelp
        } else if parsed.info {
            Route::ShowInfo
        } else if parsed.version {
            Route::ShowVersion
        } else {
            Route::Run
        }
    }
}
