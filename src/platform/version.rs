//! Semantic version parsing and range matching.
//!
//! # Responsibilities
//! - Parse platform version strings leniently ("v16.2.0", "6.8.0-45-generic", "23.1")
//! - Parse npm-style ranges (">=14.0.0", "^1.2", "~1.2.3", "1.x", "1.0.0 - 2.0.0", "a || b")
//! - Decide whether a version satisfies a range
//!
//! # Design Decisions
//! - Distro suffixes and build metadata are ignored; kernel versions rarely
//!   follow strict semver
//! - Pre-release tags do not take part in comparisons
//! - A range keeps its source text for diagnostics

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing versions and ranges.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("invalid version `{input}`")]
    InvalidVersion { input: String },

    #[error("invalid version range `{input}`: {reason}")]
    InvalidRange { input: String, reason: &'static str },
}

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a version string, accepting a leading `v`, missing minor/patch
    /// components and any trailing suffix (`-generic`, `+build`, `.1`).
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let partial = Partial::parse(input)?.ok_or_else(|| VersionParseError::InvalidVersion {
            input: input.to_string(),
        })?;
        Ok(partial.floor())
    }

    /// Returns true if this version satisfies the range.
    pub fn satisfies(&self, req: &VersionReq) -> bool {
        req.matches(self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A version with optional (wildcard) minor and patch components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Partial {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
}

impl Partial {
    /// Returns `Ok(None)` for a full wildcard (`*`, `x`).
    fn parse(input: &str) -> Result<Option<Self>, VersionParseError> {
        let invalid = || VersionParseError::InvalidVersion {
            input: input.to_string(),
        };

        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let core = trimmed
            .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(invalid());
        }

        let mut components = core.split('.');
        let major = match parse_component(components.next().unwrap_or_default()) {
            Component::Number(n) => n,
            Component::Wildcard => return Ok(None),
            Component::Invalid => return Err(invalid()),
        };

        let mut rest = [None, None];
        for slot in rest.iter_mut() {
            match components.next().map(parse_component) {
                Some(Component::Number(n)) => *slot = Some(n),
                Some(Component::Wildcard) | None => break,
                Some(Component::Invalid) => return Err(invalid()),
            }
        }

        Ok(Some(Self {
            major,
            minor: rest[0],
            patch: rest[1],
        }))
    }

    fn is_full(&self) -> bool {
        self.minor.is_some() && self.patch.is_some()
    }

    /// Lowest version matched by this partial.
    fn floor(&self) -> Version {
        Version::new(self.major, self.minor.unwrap_or(0), self.patch.unwrap_or(0))
    }

    /// First version above everything this partial matches (for partials).
    fn ceiling(&self) -> Version {
        match self.minor {
            None => Version::new(self.major.saturating_add(1), 0, 0),
            Some(minor) => Version::new(self.major, minor.saturating_add(1), 0),
        }
    }
}

enum Component {
    Number(u64),
    Wildcard,
    Invalid,
}

fn parse_component(raw: &str) -> Component {
    if matches!(raw, "x" | "X" | "*") {
        return Component::Wildcard;
    }
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    match raw[..end].parse() {
        Ok(n) => Component::Number(n),
        Err(_) => Component::Invalid,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Exact,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, v: &Version) -> bool {
        match self.op {
            Op::Exact => *v == self.version,
            Op::Greater => *v > self.version,
            Op::GreaterEq => *v >= self.version,
            Op::Less => *v < self.version,
            Op::LessEq => *v <= self.version,
        }
    }
}

/// A version range such as `>=14.0.0` or `^1.2 || >=3`.
///
/// Alternatives are separated by `||`; within one alternative every
/// comparator must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionReq {
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let alternatives = input
            .split("||")
            .map(|alt| parse_alternative(alt, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: input.trim().to_string(),
            alternatives,
        })
    }

    /// Returns true if `version` satisfies any alternative of this range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|set| set.iter().all(|c| c.matches(version)))
    }

    /// The range as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionReq {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_alternative(alt: &str, input: &str) -> Result<Vec<Comparator>, VersionParseError> {
    let range_error = |reason| VersionParseError::InvalidRange {
        input: input.to_string(),
        reason,
    };

    let alt = alt.trim();
    if alt.is_empty() {
        return Err(range_error("empty alternative"));
    }

    if let Some((low, high)) = alt.split_once(" - ") {
        return parse_hyphen(low, high).map_err(|_| range_error("malformed hyphen range"));
    }

    // Join bare operators with the version that follows (">= 14.0.0").
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in alt.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            if pending_op.is_some() {
                return Err(range_error("operator without a version"));
            }
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{op}{token}")),
            None => tokens.push(token.to_string()),
        }
    }
    if pending_op.is_some() {
        return Err(range_error("operator without a version"));
    }

    let mut comparators = Vec::new();
    for token in tokens {
        comparators.extend(parse_token(&token)?);
    }
    Ok(comparators)
}

fn parse_hyphen(low: &str, high: &str) -> Result<Vec<Comparator>, VersionParseError> {
    let mut comparators = Vec::new();
    if let Some(low) = Partial::parse(low)? {
        comparators.push(Comparator::new(Op::GreaterEq, low.floor()));
    }
    if let Some(high) = Partial::parse(high)? {
        if high.is_full() {
            comparators.push(Comparator::new(Op::LessEq, high.floor()));
        } else {
            comparators.push(Comparator::new(Op::Less, high.ceiling()));
        }
    }
    Ok(comparators)
}

fn parse_token(token: &str) -> Result<Vec<Comparator>, VersionParseError> {
    const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "^", "~"];

    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token));

    let Some(partial) = Partial::parse(rest)? else {
        // Wildcard: `*`, `>=*` and friends match everything, `<*` nothing.
        return Ok(match op {
            "<" | ">" => vec![Comparator::new(Op::Less, Version::new(0, 0, 0))],
            _ => Vec::new(),
        });
    };

    let floor = partial.floor();
    let comparators = match op {
        ">=" => vec![Comparator::new(Op::GreaterEq, floor)],
        "<" => vec![Comparator::new(Op::Less, floor)],
        ">" if partial.is_full() => vec![Comparator::new(Op::Greater, floor)],
        ">" => vec![Comparator::new(Op::GreaterEq, partial.ceiling())],
        "<=" if partial.is_full() => vec![Comparator::new(Op::LessEq, floor)],
        "<=" => vec![Comparator::new(Op::Less, partial.ceiling())],
        "^" => vec![
            Comparator::new(Op::GreaterEq, floor),
            Comparator::new(Op::Less, caret_ceiling(&partial)),
        ],
        "~" | "~>" => vec![
            Comparator::new(Op::GreaterEq, floor),
            Comparator::new(Op::Less, tilde_ceiling(&partial)),
        ],
        _ if partial.is_full() => vec![Comparator::new(Op::Exact, floor)],
        _ => vec![
            Comparator::new(Op::GreaterEq, floor),
            Comparator::new(Op::Less, partial.ceiling()),
        ],
    };
    Ok(comparators)
}

fn caret_ceiling(p: &Partial) -> Version {
    if p.major > 0 {
        return Version::new(p.major.saturating_add(1), 0, 0);
    }
    match (p.minor, p.patch) {
        (None, _) => Version::new(1, 0, 0),
        (Some(minor), _) if minor > 0 => Version::new(0, minor.saturating_add(1), 0),
        (Some(_), None) => Version::new(0, 1, 0),
        (Some(_), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
    }
}

fn tilde_ceiling(p: &Partial) -> Version {
    match p.minor {
        None => Version::new(p.major.saturating_add(1), 0, 0),
        Some(minor) => Version::new(p.major, minor.saturating_add(1), 0),
    }
}
