//! JSON output formatter for machine processing
//!
//! The analysis types carry their own camelCase serde contract, so this
//! formatter only chooses the layout: pretty-printed normally, one line in
//! quiet mode.

use crate::domain::{DependencyUsageAnalysis, DetectionReport, VersionComparisonAnalysis};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Quiet mode writes compact single-line JSON
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn write_value<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = if self.verbosity == Verbosity::Quiet {
            serde_json::to_string(value)
        } else {
            serde_json::to_string_pretty(value)
        }
        .map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_detection(
        &self,
        report: &DetectionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_value(report, writer)
    }

    fn format_usage(
        &self,
        analysis: &DependencyUsageAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_value(analysis, writer)
    }

    fn format_comparison(
        &self,
        comparison: &VersionComparisonAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_value(comparison, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChangelogClassification, Criticality, Dependency, Ecosystem, Recommendation, RiskLevel,
        UsageSummary, VersionDiff,
    };
    use chrono::Utc;
    use std::path::PathBuf;

    fn usage_analysis() -> DependencyUsageAnalysis {
        let mut dep = Dependency::new("github.com/gin-gonic/gin", Ecosystem::Go);
        dep.is_direct = true;
        dep.usage_count = 12;
        dep.criticality = Criticality::High;
        let dependencies = vec![dep];
        DependencyUsageAnalysis {
            project_path: PathBuf::from("/srv/app"),
            analyzed_at: Utc::now(),
            detection: DetectionReport {
                root: PathBuf::from("/srv/app"),
                primary: None,
                secondary: Vec::new(),
                warnings: Vec::new(),
            },
            manifests: Vec::new(),
            summary: UsageSummary::from_dependencies(&dependencies),
            dependencies,
            recommendations: vec!["Remove unused dependency x".to_string()],
            tools: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn output_of(formatter: &JsonFormatter, analysis: &DependencyUsageAnalysis) -> String {
        let mut buf = Vec::new();
        formatter.format_usage(analysis, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_usage_json_contract() {
        let output = output_of(&JsonFormatter::new(Verbosity::Normal), &usage_analysis());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let dep = &value["dependencies"][0];
        assert_eq!(dep["coordinate"], "github.com/gin-gonic/gin");
        assert_eq!(dep["ecosystem"], "go");
        assert_eq!(dep["usageCount"], 12);
        assert_eq!(dep["criticality"], "HIGH");
        assert_eq!(value["summary"]["high"], 1);
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn test_quiet_is_single_line() {
        let output = output_of(&JsonFormatter::new(Verbosity::Quiet), &usage_analysis());
        assert_eq!(output.trim_end().lines().count(), 1);
        let pretty = output_of(&JsonFormatter::new(Verbosity::Normal), &usage_analysis());
        assert!(pretty.lines().count() > 1);
    }

    #[test]
    fn test_comparison_json_is_flat() {
        let comparison = VersionComparisonAnalysis {
            package: "express".to_string(),
            ecosystem: Ecosystem::Node,
            analyzed_at: Utc::now(),
            version_diff: VersionDiff::unchanged(Ecosystem::Node, "4.18.2", "4.18.2"),
            criticality: None,
            criticality_reasons: Vec::new(),
            usage_count: None,
            runtime_change: None,
            changelog: ChangelogClassification::default(),
            recommendation: Recommendation {
                recommendations: vec!["nothing to do".to_string()],
                risk_level: RiskLevel::Low,
                risk_score: 0,
                complexity: crate::domain::Complexity::Unknown,
                factors: Vec::new(),
            },
            warnings: Vec::new(),
        };
        let mut buf = Vec::new();
        JsonFormatter::new(Verbosity::Normal)
            .format_comparison(&comparison, &mut buf)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["riskLevel"], "low");
        assert!(value["breakingChanges"].as_array().unwrap().is_empty());
        assert!(value.get("criticality").is_none());
        assert_eq!(value["versionDiff"]["semverType"], "unknown");
    }
}
