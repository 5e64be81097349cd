//! Environment report rendering.

use std::fmt;
use std::path::PathBuf;

/// A rendered `--info` report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<Section>,
}

/// One titled block of the report (`System`, `Binaries`, `Browsers`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// A plain fact such as the OS name.
    Value(String),
    /// A located binary.
    Found {
        version: Option<String>,
        path: PathBuf,
        duplicates: Vec<PathBuf>,
    },
    NotFound,
}

impl Entry {
    pub fn value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: EntryStatus::Value(value.into()),
        }
    }

    pub fn not_found(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: EntryStatus::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self.status, EntryStatus::NotFound)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    {}: ", self.label)?;
        match &self.status {
            EntryStatus::Value(value) => f.write_str(value),
            EntryStatus::NotFound => f.write_str("Not Found"),
            EntryStatus::Found {
                version,
                path,
                duplicates,
            } => {
                write!(
                    f,
                    "{} - {}",
                    version.as_deref().unwrap_or("Unknown"),
                    path.display()
                )?;
                if !duplicates.is_empty() {
                    let others = duplicates
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, " (also {others})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            write!(f, "\n  {}:", section.title)?;
            for entry in &section.entries {
                write!(f, "\n{entry}")?;
            }
        }
        Ok(())
    }
}
