//! Analysis result structures
//!
//! These two types are the stable output contract: field names are camelCase
//! and every categorical field is a closed enum.

use super::{
    ChangelogClassification, Criticality, Dependency, DetectionReport, Ecosystem, ManifestFormat,
    Recommendation, VersionDiff,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-file summary of a parsed manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub path: PathBuf,
    pub format: ManifestFormat,
    pub ecosystem: Ecosystem,
    pub dependency_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_errors: Vec<String>,
}

/// Counts over the dependency list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub total: usize,
    pub direct: usize,
    pub transitive: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unused_direct: usize,
    pub conflicts: usize,
}

impl UsageSummary {
    pub fn from_dependencies(deps: &[Dependency]) -> Self {
        let mut summary = UsageSummary {
            total: deps.len(),
            ..Default::default()
        };
        for dep in deps {
            if dep.is_direct {
                summary.direct += 1;
            } else {
                summary.transitive += 1;
            }
            match dep.criticality {
                Criticality::High => summary.high += 1,
                Criticality::Medium => summary.medium += 1,
                Criticality::Low => summary.low += 1,
            }
            if dep.is_unused_direct() {
                summary.unused_direct += 1;
            }
            if dep.version_conflict {
                summary.conflicts += 1;
            }
        }
        summary
    }
}

/// Outcome of consulting one external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReport {
    /// Command line that was run, e.g. `go list -m -json all`
    pub command: String,
    pub succeeded: bool,
    /// Entries merged, or the reason the tool was unavailable
    pub detail: String,
}

/// Result of a dependency-usage analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyUsageAnalysis {
    pub project_path: PathBuf,
    pub analyzed_at: DateTime<Utc>,
    pub detection: DetectionReport,
    pub manifests: Vec<ManifestSummary>,
    /// Sorted by coordinate, then ecosystem
    pub dependencies: Vec<Dependency>,
    pub summary: UsageSummary,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DependencyUsageAnalysis {
    /// True when any file failed to parse or any warning was recorded
    pub fn has_errors(&self) -> bool {
        !self.warnings.is_empty() || self.manifests.iter().any(|m| !m.parse_errors.is_empty())
    }

    pub fn find(&self, coordinate: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.coordinate == coordinate)
    }
}

/// A toolchain/runtime version requirement change (`go 1.20` -> `go 1.22`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeChange {
    pub from: String,
    pub to: String,
}

/// Result of a version-comparison analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparisonAnalysis {
    pub package: String,
    pub ecosystem: Ecosystem,
    pub analyzed_at: DateTime<Utc>,
    pub version_diff: VersionDiff,
    /// Criticality of the package in the analyzed project, when it was found there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criticality_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_change: Option<RuntimeChange>,
    #[serde(flatten)]
    pub changelog: ChangelogClassification,
    #[serde(flatten)]
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut a = Dependency::new("a", Ecosystem::Node);
        a.is_direct = true;
        a.criticality = Criticality::High;
        let mut b = Dependency::new("b", Ecosystem::Node);
        b.version_conflict = true;
        let mut c = Dependency::new("c", Ecosystem::Node);
        c.is_direct = true;
        c.usage_count = 4;
        c.criticality = Criticality::Medium;

        let summary = UsageSummary::from_dependencies(&[a, b, c]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.direct, 2);
        assert_eq!(summary.transitive, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.unused_direct, 1);
        assert_eq!(summary.conflicts, 1);
    }
}
