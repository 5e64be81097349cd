//! Top-level failure reporting.
//!
//! Every failure after the version gate ends up here: a styled lead-in,
//! the error trace (message, causes, backtrace when captured), exit 1.

use std::io::{self, IsTerminal, Write};

use clap::builder::styling::{AnsiColor, Style};

/// Lead-in printed above every launch failure.
pub const LEAD_IN: &str = "An error occurred while trying to start the application:";

const INDENT: &str = "   ";

/// Write the failure report for `err` to `out`.
pub fn report<W: Write>(err: &anyhow::Error, out: &mut W, styled: bool) -> io::Result<()> {
    if styled {
        let style = Style::new().bold().fg_color(Some(AnsiColor::Red.into()));
        writeln!(out, "{}{INDENT}{LEAD_IN}{}", style.render(), style.render_reset())?;
    } else {
        writeln!(out, "{INDENT}{LEAD_IN}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", format_trace(err))?;
    writeln!(out)?;
    Ok(())
}

/// The error's debug representation (message, `Caused by:` chain and
/// backtrace), indented line by line.
pub fn format_trace(err: &anyhow::Error) -> String {
    format!("{err:?}")
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Report `err` on stderr and terminate with status 1.
pub fn exit_with(err: &anyhow::Error) -> ! {
    let stderr = io::stderr();
    let styled = stderr.is_terminal();
    let mut handle = stderr.lock();
    let _ = report(err, &mut handle, styled);
    let _ = handle.flush();
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_report_contains_lead_in_and_causes() {
        let err = Err::<(), _>(io::Error::new(io::ErrorKind::AddrInUse, "port 3000 taken"))
            .context("server failed to start")
            .unwrap_err();

        let mut out = Vec::new();
        report(&err, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("   An error occurred while trying to start the application:\n\n"));
        assert!(text.contains("   server failed to start"));
        assert!(text.contains("port 3000 taken"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_styled_report_wraps_lead_in() {
        let err = anyhow::anyhow!("boom");
        let mut out = Vec::new();
        report(&err, &mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\u{1b}["));
        assert!(text.contains(LEAD_IN));
        assert!(text.contains("   boom"));
    }
}
