//! Declared version constraint types
//!
//! A manifest declares a constraint, not a version:
//! - Node.js: `^1.2.3`, `~1.2.3`, `>=1.0.0 <2.0.0`, `*`
//! - Python: `==1.2.3`, `~=1.2`, `>=1.0,<2.0`
//! - Ruby: `~> 1.2`, `>= 1.0, < 2.0`
//! - JVM: `1.2.3`, `[1.0,2.0)`, `1.2.+`, `latest.release`
//! - Go: `v1.2.3`, pseudo-versions

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact/pinned version (`1.2.3`, `==1.2.3`, `= 1.2.3`)
    Exact,
    /// Caret range (`^1.2.3`)
    Caret,
    /// Tilde range (`~1.2.3`, `~=1.2`)
    Tilde,
    /// Ruby pessimistic operator (`~> 1.2`)
    Pessimistic,
    /// Lower bound only (`>=1.2.3`, `>1.2.3`)
    LowerBound,
    /// Upper bound only (`<=1.2.3`, `<1.2.3`)
    UpperBound,
    /// Bounded or compound range (`>=1.0 <2.0`, `[1.0,2.0)`)
    Range,
    /// Wildcard or prefix (`*`, `1.x`, `1.2.+`)
    Wildcard,
    /// Dynamic selector resolved at build time (`latest.release`, `latest`)
    Dynamic,
    /// Commit-derived version (Go pseudo-version)
    Pseudo,
    /// No constraint at all (`gem 'rails'`)
    Any,
}

impl VersionSpecKind {
    /// Returns true if the constraint pins a single version
    pub fn is_pinned(&self) -> bool {
        matches!(self, VersionSpecKind::Exact | VersionSpecKind::Pseudo)
    }

    /// Returns true if the constraint has no upper bound on what may be installed
    pub fn is_unbounded(&self) -> bool {
        matches!(
            self,
            VersionSpecKind::LowerBound
                | VersionSpecKind::Wildcard
                | VersionSpecKind::Dynamic
                | VersionSpecKind::Any
        )
    }
}

/// A parsed version constraint with its original text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The kind of constraint
    pub kind: VersionSpecKind,
    /// The raw constraint as it appears in the manifest
    pub raw: String,
    /// The reference version extracted from the constraint (lower bound for ranges)
    pub version: String,
    /// Operator prefix (`^`, `~>`, `>=`), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            operator: None,
        }
    }

    /// A constraint-free spec (`gem 'rails'`, `requests` in requirements.txt)
    pub fn any() -> Self {
        Self::new(VersionSpecKind::Any, "", "")
    }

    /// Sets the operator prefix
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Returns true if this version is pinned
    pub fn is_pinned(&self) -> bool {
        self.kind.is_pinned()
    }

    /// Returns true if the reference version carries a pre-release, snapshot or dev marker
    pub fn is_unstable(&self) -> bool {
        self.kind == VersionSpecKind::Pseudo || is_unstable_version(&self.version)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}

/// Markers that identify snapshot, pre-release and development builds
const UNSTABLE_MARKERS: [&str; 10] = [
    "snapshot", "alpha", "beta", "rc", "dev", "pre", "preview", "canary", "nightly", "milestone",
];

/// Returns true if a concrete version string looks like a snapshot or pre-release
pub fn is_unstable_version(version: &str) -> bool {
    let lower = version.to_ascii_lowercase();
    let body = lower.strip_prefix('v').unwrap_or(&lower);

    if UNSTABLE_MARKERS.iter().any(|m| {
        body.split(|c: char| !c.is_ascii_alphabetic())
            .any(|token| token == *m)
    }) {
        return true;
    }

    // Compact PEP 440 / RubyGems forms: 1.0a1, 1.0b2, 1.0rc1, 2.0.0.pre, 3.0.0-M1
    body.split(['.', '-', '+', '_']).any(|segment| {
        let letters: String = segment
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        let tail_is_numeric = segment
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .chars()
            .all(|c| c.is_ascii_digit());
        tail_is_numeric
            && matches!(
                letters.as_str(),
                "a" | "b" | "c" | "rc" | "m" | "alpha" | "beta" | "dev" | "pre" | "snapshot"
            )
            && letters.len() < segment.len()
    })
}
