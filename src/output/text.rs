//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Detection display with evidence (verbose)
//! - Dependency table ordered by criticality, with aligned coordinates
//! - Version comparison with risk factors and changelog counts
//! - Recommendations and warnings

use crate::domain::{
    Criticality, Dependency, DependencyUsageAnalysis, DetectionReport, EcosystemDetection,
    RiskLevel, SemverType, VersionComparisonAnalysis,
};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Set the color option
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn criticality_label(&self, criticality: Criticality) -> String {
        let label = format!("{:6}", criticality.to_string());
        if !self.color {
            return label;
        }
        match criticality {
            Criticality::High => label.red().bold().to_string(),
            Criticality::Medium => label.yellow().to_string(),
            Criticality::Low => label.green().to_string(),
        }
    }

    fn semver_label(&self, semver: SemverType) -> String {
        let label = semver.as_str();
        if !self.color {
            return label.to_string();
        }
        match semver {
            SemverType::Major => label.red().bold().to_string(),
            SemverType::Minor => label.yellow().to_string(),
            SemverType::Patch => label.green().to_string(),
            SemverType::Prerelease => label.magenta().to_string(),
            SemverType::Unknown => "?".dimmed().to_string(),
        }
    }

    fn risk_label(&self, risk: RiskLevel) -> String {
        let label = risk.as_str();
        if !self.color {
            return label.to_string();
        }
        match risk {
            RiskLevel::Critical => label.red().bold().to_string(),
            RiskLevel::High => label.red().to_string(),
            RiskLevel::Medium => label.yellow().to_string(),
            RiskLevel::Low => label.green().to_string(),
        }
    }

    fn write_list(
        &self,
        title: &str,
        items: &[String],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        writeln!(writer)?;
        writeln!(writer, "{}", self.heading(title))?;
        for item in items {
            writeln!(writer, "  - {}", item)?;
        }
        Ok(())
    }

    fn write_warnings(&self, warnings: &[String], writer: &mut dyn Write) -> std::io::Result<()> {
        if warnings.is_empty() {
            return Ok(());
        }
        writeln!(writer)?;
        let title = if self.color {
            "Warnings:".yellow().bold().to_string()
        } else {
            "Warnings:".to_string()
        };
        writeln!(writer, "{}", title)?;
        for warning in warnings {
            writeln!(writer, "  ! {}", warning)?;
        }
        Ok(())
    }

    fn write_detection_line(
        &self,
        detection: &EcosystemDetection,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let runtime = detection
            .runtime_version
            .as_deref()
            .map(|v| format!(", runtime {}", v))
            .unwrap_or_default();
        writeln!(
            writer,
            "  {:8} {} {}",
            detection.ecosystem.to_string(),
            detection.package_manager,
            self.dim(&format!(
                "({} confidence, score {}{})",
                detection.confidence, detection.score, runtime
            ))
        )?;
        if self.verbosity == Verbosity::Verbose {
            for evidence in &detection.evidence {
                writeln!(
                    writer,
                    "    {} {} {}",
                    self.dim(&format!("{:?}", evidence.tier).to_lowercase()),
                    evidence.path.display(),
                    self.dim(&evidence.detail)
                )?;
            }
        }
        Ok(())
    }

    fn write_dependency(
        &self,
        dep: &Dependency,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let version = dep.effective_version().unwrap_or("*");
        let kind = if dep.is_direct { "" } else { " (transitive)" };
        let mut flags = Vec::new();
        if dep.version_conflict {
            flags.push("conflict");
        }
        if dep.evicted {
            flags.push("evicted");
        }
        if dep.is_unused_direct() {
            flags.push("unused");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        writeln!(
            writer,
            "  {} {:width$} {} {}{}{}",
            self.criticality_label(dep.criticality),
            dep.coordinate,
            version,
            self.dim(&format!("{} uses, {}", dep.usage_count, dep.scope)),
            self.dim(kind),
            flags,
            width = width
        )?;
        if self.verbosity == Verbosity::Verbose {
            for reason in &dep.criticality_reasons {
                writeln!(writer, "         {}", self.dim(reason))?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format_detection(
        &self,
        report: &DetectionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let Some(primary) = &report.primary else {
            writeln!(writer, "No supported ecosystem found in {}", report.root.display())?;
            return self.write_warnings(&report.warnings, writer);
        };

        if self.verbosity == Verbosity::Quiet {
            writeln!(
                writer,
                "{} {} {}",
                primary.ecosystem.key(),
                primary.package_manager,
                primary.confidence
            )?;
            return Ok(());
        }

        writeln!(
            writer,
            "{}",
            self.heading(&format!("Ecosystems in {}", report.root.display()))
        )?;
        self.write_detection_line(primary, writer)?;
        if !report.secondary.is_empty() {
            writeln!(writer, "{}", self.dim("  secondary:"))?;
            for detection in &report.secondary {
                self.write_detection_line(detection, writer)?;
            }
        }
        self.write_warnings(&report.warnings, writer)
    }

    fn format_usage(
        &self,
        analysis: &DependencyUsageAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let summary = &analysis.summary;
        let summary_line = format!(
            "{} dependencies ({} direct, {} transitive): {} high, {} medium, {} low, {} unused, {} conflicts",
            summary.total,
            summary.direct,
            summary.transitive,
            summary.high,
            summary.medium,
            summary.low,
            summary.unused_direct,
            summary.conflicts
        );

        if self.verbosity == Verbosity::Quiet {
            writeln!(writer, "{}", summary_line)?;
            return Ok(());
        }

        writeln!(
            writer,
            "{}",
            self.heading(&format!("Dependency usage in {}", analysis.project_path.display()))
        )?;
        if let Some(primary) = &analysis.detection.primary {
            writeln!(
                writer,
                "{}",
                self.dim(&format!(
                    "primary: {} ({}, {} confidence)",
                    primary.ecosystem, primary.package_manager, primary.confidence
                ))
            )?;
        }

        if self.verbosity == Verbosity::Verbose && !analysis.manifests.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.heading("Manifests:"))?;
            for manifest in &analysis.manifests {
                writeln!(
                    writer,
                    "  {} {}",
                    manifest.path.display(),
                    self.dim(&format!("({} entries)", manifest.dependency_count))
                )?;
                for error in &manifest.parse_errors {
                    writeln!(writer, "    ! {}", error)?;
                }
            }
        }

        // transitive nodes are only listed in verbose mode
        let mut shown: Vec<&Dependency> = analysis
            .dependencies
            .iter()
            .filter(|d| d.is_direct || self.verbosity == Verbosity::Verbose)
            .collect();
        shown.sort_by(|a, b| {
            b.criticality
                .cmp(&a.criticality)
                .then_with(|| b.usage_count.cmp(&a.usage_count))
                .then_with(|| a.coordinate.cmp(&b.coordinate))
        });

        if !shown.is_empty() {
            writeln!(writer)?;
            let width = shown.iter().map(|d| d.coordinate.len()).max().unwrap_or(0);
            for dep in shown {
                self.write_dependency(dep, width, writer)?;
            }
        }

        writeln!(writer)?;
        writeln!(writer, "{}", summary_line)?;

        self.write_list("Recommendations:", &analysis.recommendations, writer)?;

        if self.verbosity == Verbosity::Verbose && !analysis.tools.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.heading("Tools:"))?;
            for tool in &analysis.tools {
                let status = match (tool.succeeded, self.color) {
                    (true, true) => "ok".green().to_string(),
                    (true, false) => "ok".to_string(),
                    (false, true) => "unavailable".yellow().to_string(),
                    (false, false) => "unavailable".to_string(),
                };
                writeln!(
                    writer,
                    "  {} {} {}",
                    tool.command,
                    status,
                    self.dim(&tool.detail)
                )?;
            }
        }

        self.write_warnings(&analysis.warnings, writer)
    }

    fn format_comparison(
        &self,
        comparison: &VersionComparisonAnalysis,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let diff = &comparison.version_diff;
        let rec = &comparison.recommendation;
        let arrow = if self.color {
            "→".dimmed().to_string()
        } else {
            "→".to_string()
        };

        writeln!(
            writer,
            "{} {} {} {} [{}] {}",
            self.heading(&comparison.package),
            diff.from,
            arrow,
            diff.to,
            self.semver_label(diff.semver_type),
            self.dim(&format!("({})", comparison.ecosystem))
        )?;
        writeln!(
            writer,
            "Risk: {} (score {}), complexity {}",
            self.risk_label(rec.risk_level),
            rec.risk_score,
            rec.complexity
        )?;

        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        if let Some(criticality) = comparison.criticality {
            let usage = comparison
                .usage_count
                .map(|n| format!(", {} uses", n))
                .unwrap_or_default();
            writeln!(
                writer,
                "Criticality in project: {}{}",
                self.criticality_label(criticality).trim_end(),
                usage
            )?;
        }
        if let Some(runtime) = &comparison.runtime_change {
            writeln!(writer, "Runtime: {} {} {}", runtime.from, arrow, runtime.to)?;
        }

        if !rec.factors.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.heading("Risk factors:"))?;
            for factor in &rec.factors {
                writeln!(writer, "  {:+3} {}", factor.weight, factor.description)?;
            }
        }

        let changelog = &comparison.changelog;
        if !changelog.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "Changelog: {} breaking, {} security, {} features, {} fixes, {} deprecations",
                changelog.breaking_changes.len(),
                changelog.security_fixes.len(),
                changelog.new_features.len(),
                changelog.bug_fixes.len(),
                changelog.deprecations.len()
            )?;
            if self.verbosity == Verbosity::Verbose {
                for line in changelog
                    .breaking_changes
                    .iter()
                    .chain(&changelog.security_fixes)
                {
                    writeln!(writer, "  {}", line)?;
                }
            }
        }

        if self.verbosity == Verbosity::Verbose {
            for reason in &comparison.criticality_reasons {
                writeln!(writer, "  {}", self.dim(reason))?;
            }
        }

        self.write_list("Recommendations:", &rec.recommendations, writer)?;
        self.write_warnings(&comparison.warnings, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Confidence, Ecosystem, Evidence, EvidenceTier, PackageManager, UsageSummary,
    };
    use crate::recommend::{recommend_upgrade, UpgradeContext};
    use crate::version::get_comparator;
    use chrono::Utc;
    use std::path::PathBuf;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn detection() -> DetectionReport {
        DetectionReport {
            root: PathBuf::from("/srv/web"),
            primary: Some(EcosystemDetection {
                ecosystem: Ecosystem::Node,
                package_manager: PackageManager::Npm,
                score: 6,
                confidence: Confidence::High,
                evidence: vec![Evidence::new(
                    EvidenceTier::Lock,
                    "package-lock.json",
                    "npm lock file",
                )],
                runtime_version: None,
            }),
            secondary: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn analysis() -> DependencyUsageAnalysis {
        let mut express = Dependency::new("express", Ecosystem::Node);
        express.is_direct = true;
        express.is_transitive = false;
        express.usage_count = 14;
        express.criticality = Criticality::High;
        express.criticality_reasons = vec!["direct dependency (+2)".to_string()];
        let mut unused = Dependency::new("left-pad", Ecosystem::Node);
        unused.is_direct = true;
        unused.is_transitive = false;
        let transitive = Dependency::new("qs", Ecosystem::Node);
        let dependencies = vec![express, unused, transitive];
        DependencyUsageAnalysis {
            project_path: PathBuf::from("/srv/web"),
            analyzed_at: Utc::now(),
            detection: detection(),
            manifests: Vec::new(),
            summary: UsageSummary::from_dependencies(&dependencies),
            dependencies,
            recommendations: vec!["Remove unused dependency left-pad".to_string()],
            tools: Vec::new(),
            warnings: vec!["could not read src/broken.js".to_string()],
        }
    }

    #[test]
    fn test_detection_normal_and_verbose() {
        let normal = TextFormatter::new(Verbosity::Normal).with_color(false);
        let output = render(|w| normal.format_detection(&detection(), w));
        assert!(output.contains("Node.js"));
        assert!(output.contains("npm"));
        assert!(output.contains("high confidence"));
        assert!(!output.contains("package-lock.json"));

        let verbose = TextFormatter::new(Verbosity::Verbose).with_color(false);
        let output = render(|w| verbose.format_detection(&detection(), w));
        assert!(output.contains("lock package-lock.json"));
    }

    #[test]
    fn test_detection_quiet() {
        let quiet = TextFormatter::new(Verbosity::Quiet).with_color(false);
        let output = render(|w| quiet.format_detection(&detection(), w));
        assert_eq!(output, "node npm high\n");
    }

    #[test]
    fn test_empty_detection() {
        let formatter = TextFormatter::new(Verbosity::Normal).with_color(false);
        let output = render(|w| formatter.format_detection(&DetectionReport::default(), w));
        assert!(output.starts_with("No supported ecosystem"));
    }

    #[test]
    fn test_usage_orders_by_criticality() {
        let formatter = TextFormatter::new(Verbosity::Normal).with_color(false);
        let output = render(|w| formatter.format_usage(&analysis(), w));
        let express = output.find("express").unwrap();
        let left_pad = output.find("left-pad").unwrap();
        assert!(express < left_pad);
        assert!(output.contains("[unused]"));
        assert!(!output.contains(" qs "));
        assert!(output.contains("3 dependencies (2 direct, 1 transitive)"));
        assert!(output.contains("Recommendations:"));
        assert!(output.contains("! could not read src/broken.js"));
    }

    #[test]
    fn test_usage_verbose_shows_transitive_and_reasons() {
        let formatter = TextFormatter::new(Verbosity::Verbose).with_color(false);
        let output = render(|w| formatter.format_usage(&analysis(), w));
        assert!(output.contains("qs"));
        assert!(output.contains("(transitive)"));
        assert!(output.contains("direct dependency (+2)"));
    }

    #[test]
    fn test_usage_quiet_is_summary_only() {
        let formatter = TextFormatter::new(Verbosity::Quiet).with_color(false);
        let output = render(|w| formatter.format_usage(&analysis(), w));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_comparison() {
        let diff = get_comparator(Ecosystem::Ruby).compare("1.2.3", "1.2.5");
        let changelog = Default::default();
        let recommendation = recommend_upgrade(&UpgradeContext {
            package: "faraday",
            diff: &diff,
            criticality: None,
            changelog: &changelog,
            runtime_change: None,
            extra_critical: &[],
        });
        let comparison = VersionComparisonAnalysis {
            package: "faraday".to_string(),
            ecosystem: Ecosystem::Ruby,
            analyzed_at: Utc::now(),
            version_diff: diff,
            criticality: None,
            criticality_reasons: Vec::new(),
            usage_count: None,
            runtime_change: None,
            changelog,
            recommendation,
            warnings: Vec::new(),
        };
        let formatter = TextFormatter::new(Verbosity::Normal).with_color(false);
        let output = render(|w| formatter.format_comparison(&comparison, w));
        assert!(output.starts_with("faraday 1.2.3 → 1.2.5 [patch] (Ruby)"));
        assert!(output.contains("Risk: low (score 0), complexity low"));
        assert!(output.contains("~> 1.2.5"));
    }
}
