//! Ecosystem detection result types

use super::{Ecosystem, PackageManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Detection confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Points needed for `High`
    pub const HIGH_POINTS: u32 = 5;
    /// Points needed for `Medium`
    pub const MEDIUM_POINTS: u32 = 3;

    /// Monotonic in `points`
    pub fn from_points(points: u32) -> Self {
        if points >= Self::HIGH_POINTS {
            Confidence::High
        } else if points >= Self::MEDIUM_POINTS {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight class of a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceTier {
    /// Lock file (`go.sum`, `package-lock.json`)
    Lock,
    /// Declarative config file or manifest section
    Config,
    /// Loose dependency-declaration or wrapper file
    Loose,
    /// Presence of source files in the ecosystem's language
    Source,
}

impl EvidenceTier {
    pub fn points(&self) -> u32 {
        match self {
            EvidenceTier::Lock => 3,
            EvidenceTier::Config => 2,
            EvidenceTier::Loose | EvidenceTier::Source => 1,
        }
    }
}

/// One indicator found for an ecosystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub tier: EvidenceTier,
    /// Path relative to the project root
    pub path: PathBuf,
    pub detail: String,
}

impl Evidence {
    pub fn new(tier: EvidenceTier, path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self {
            tier,
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// Detection outcome for one ecosystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemDetection {
    pub ecosystem: Ecosystem,
    pub package_manager: PackageManager,
    pub score: u32,
    pub confidence: Confidence,
    pub evidence: Vec<Evidence>,
    /// Declared toolchain version (`go 1.21`, `sbt.version`, `packageManager`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
}

impl EcosystemDetection {
    /// True when a lock file or explicit version pin backs the detection
    pub fn has_version_evidence(&self) -> bool {
        self.runtime_version.is_some() || self.evidence.iter().any(|e| e.tier == EvidenceTier::Lock)
    }
}

/// Full detector output: one primary plus ordered secondaries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub root: PathBuf,
    pub primary: Option<EcosystemDetection>,
    pub secondary: Vec<EcosystemDetection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DetectionReport {
    pub fn package_manager(&self) -> Option<PackageManager> {
        self.primary.as_ref().map(|d| d.package_manager)
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.primary.as_ref().map(|d| d.confidence)
    }

    /// Primary followed by secondaries
    pub fn all(&self) -> impl Iterator<Item = &EcosystemDetection> {
        self.primary.iter().chain(self.secondary.iter())
    }

    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        self.all().map(|d| d.ecosystem).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_from_points() {
        assert_eq!(Confidence::from_points(0), Confidence::Low);
        assert_eq!(Confidence::from_points(2), Confidence::Low);
        assert_eq!(Confidence::from_points(3), Confidence::Medium);
        assert_eq!(Confidence::from_points(5), Confidence::High);
        assert_eq!(Confidence::from_points(40), Confidence::High);
    }

    #[test]
    fn test_confidence_monotonic() {
        let mut prev = Confidence::from_points(0);
        for points in 1..20 {
            let next = Confidence::from_points(points);
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn test_tier_points() {
        assert!(EvidenceTier::Lock.points() > EvidenceTier::Config.points());
        assert!(EvidenceTier::Config.points() > EvidenceTier::Loose.points());
    }

    #[test]
    fn test_version_evidence() {
        let mut det = EcosystemDetection {
            ecosystem: Ecosystem::Node,
            package_manager: PackageManager::Npm,
            score: 2,
            confidence: Confidence::Low,
            evidence: vec![Evidence::new(EvidenceTier::Config, "package.json", "manifest")],
            runtime_version: None,
        };
        assert!(!det.has_version_evidence());
        det.evidence
            .push(Evidence::new(EvidenceTier::Lock, "package-lock.json", "lock file"));
        assert!(det.has_version_evidence());
    }
}
