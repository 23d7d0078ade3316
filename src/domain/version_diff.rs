//! Version comparison result types

use super::Ecosystem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which component of the version changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemverType {
    Major,
    Minor,
    Patch,
    Prerelease,
    /// Identical versions, or versions that could not be parsed
    Unknown,
}

impl SemverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemverType::Major => "major",
            SemverType::Minor => "minor",
            SemverType::Patch => "patch",
            SemverType::Prerelease => "prerelease",
            SemverType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SemverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordering of `to` relative to `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upgrade,
    Downgrade,
    Same,
}

impl Direction {
    /// The direction seen from the other side
    pub fn reversed(self) -> Self {
        match self {
            Direction::Upgrade => Direction::Downgrade,
            Direction::Downgrade => Direction::Upgrade,
            Direction::Same => Direction::Same,
        }
    }
}

/// Ecosystem-specific compatibility facts
///
/// Only the fields relevant to the compared ecosystem are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    /// PEP 440: both versions match the full grammar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pep440_compliant: Option<bool>,
    /// RubyGems: recommended `~>` constraint for the target version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pessimistic_constraint: Option<String>,
    /// RubyGems: target stays inside the current `~>` boundary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pessimistic_compatible: Option<bool>,
    /// Go: the module path needs a `/vN` suffix change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_import_path_change: Option<bool>,
    /// Go: the suffix the target version's module path must carry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_path_suffix: Option<String>,
    /// Go: `from` is a pseudo-version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_pseudo_version: Option<bool>,
    /// Go: `to` is a pseudo-version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_pseudo_version: Option<bool>,
    /// Go: either side carries `+incompatible`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incompatible: Option<bool>,
    /// Free-form notes surfaced to recommendations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Result of comparing two version strings for one coordinate
///
/// Exactly one of the change booleans is true, matching `semver_type`;
/// all are false when `semver_type` is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDiff {
    pub ecosystem: Ecosystem,
    pub from: String,
    pub to: String,
    pub major_change: bool,
    pub minor_change: bool,
    pub patch_change: bool,
    pub prerelease_change: bool,
    pub semver_type: SemverType,
    pub direction: Direction,
    #[serde(flatten)]
    pub compatibility: Compatibility,
}

impl VersionDiff {
    /// Builds a diff whose change booleans agree with `semver_type`
    pub fn new(
        ecosystem: Ecosystem,
        from: impl Into<String>,
        to: impl Into<String>,
        semver_type: SemverType,
        direction: Direction,
    ) -> Self {
        Self {
            ecosystem,
            from: from.into(),
            to: to.into(),
            major_change: semver_type == SemverType::Major,
            minor_change: semver_type == SemverType::Minor,
            patch_change: semver_type == SemverType::Patch,
            prerelease_change: semver_type == SemverType::Prerelease,
            semver_type,
            direction,
            compatibility: Compatibility::default(),
        }
    }

    /// Diff for two versions with no detectable change
    pub fn unchanged(ecosystem: Ecosystem, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(ecosystem, from, to, SemverType::Unknown, Direction::Same)
    }

    pub fn with_compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    pub fn has_change(&self) -> bool {
        self.semver_type != SemverType::Unknown
    }

    pub fn is_downgrade(&self) -> bool {
        self.direction == Direction::Downgrade
    }
}
