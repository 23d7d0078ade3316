//! Ecosystem detection
//!
//! Turns the locator's file list into a [`DetectionReport`]:
//! 1. Collect tiered evidence per ecosystem
//! 2. Score each ecosystem and derive a confidence from the points
//! 3. Pick the package manager
//! 4. Rank: highest score first, then version/lock evidence, then ecosystem order
//!
//! The top-ranked ecosystem is primary; the rest are secondaries in rank order.

mod evidence;
mod package_manager;

use crate::domain::{Confidence, DetectionReport, EcosystemDetection};
use crate::error::InputError;
use crate::locator::{LocatedFiles, Locator};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

/// Detects the ecosystems present in already-located files
pub fn detect(located: &LocatedFiles) -> DetectionReport {
    let mut detections = Vec::new();
    let mut warnings = located.warnings.clone();

    for (ecosystem, signals) in evidence::collect(located) {
        let (package_manager, warning) = package_manager::select(ecosystem, &signals);
        if let Some(warning) = warning {
            warnings.push(warning);
        }
        let score = signals.score();
        let detection = EcosystemDetection {
            ecosystem,
            package_manager,
            score,
            confidence: Confidence::from_points(score),
            evidence: signals.evidence,
            runtime_version: signals.runtime_version,
        };
        debug!(
            ecosystem = %ecosystem,
            score,
            confidence = %detection.confidence,
            package_manager = %package_manager,
            "ecosystem detected"
        );
        detections.push(detection);
    }

    detections.sort_by(rank);
    let mut ranked = detections.into_iter();
    let primary = ranked.next();
    if let Some(primary) = &primary {
        info!(
            ecosystem = %primary.ecosystem,
            package_manager = %primary.package_manager,
            confidence = %primary.confidence,
            "primary ecosystem"
        );
    }

    DetectionReport {
        root: located.root.clone(),
        primary,
        secondary: ranked.collect(),
        warnings,
    }
}

/// Walks `root` with `locator` and detects its ecosystems
pub fn detect_project(root: &Path, locator: &Locator) -> Result<DetectionReport, InputError> {
    let located = locator.locate(root)?;
    Ok(detect(&located))
}

/// Orders detections best-first
fn rank(a: &EcosystemDetection, b: &EcosystemDetection) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.has_version_evidence().cmp(&a.has_version_evidence()))
        .then_with(|| a.ecosystem.cmp(&b.ecosystem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ecosystem, EvidenceTier, PackageManager};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn detect_in(root: &Path) -> DetectionReport {
        detect_project(root, &Locator::default()).unwrap()
    }

    #[test]
    fn test_npm_with_lock_is_high_confidence() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package.json", r#"{"name": "web", "dependencies": {}}"#);
        write(temp.path(), "package-lock.json", r#"{"lockfileVersion": 3, "packages": {}}"#);

        let report = detect_in(temp.path());
        assert_eq!(report.package_manager(), Some(PackageManager::Npm));
        assert_eq!(report.confidence(), Some(Confidence::High));
        assert!(report.secondary.is_empty());
    }

    #[test]
    fn test_primary_by_score_not_encounter_order() {
        let temp = TempDir::new().unwrap();
        // Go sorts first alphabetically but has less evidence
        write(temp.path(), "tools/gen.go", "package main\n");
        write(temp.path(), "Gemfile", "source 'https://rubygems.org'\ngem 'rails'\n");
        write(temp.path(), "Gemfile.lock", "GEM\n  remote: https://rubygems.org/\n  specs:\n    rails (7.1.2)\n");

        let report = detect_in(temp.path());
        assert_eq!(report.primary.as_ref().unwrap().ecosystem, Ecosystem::Ruby);
        assert_eq!(report.ecosystems(), vec![Ecosystem::Ruby, Ecosystem::Go]);
        assert_eq!(report.secondary[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_tie_prefers_version_evidence() {
        let temp = TempDir::new().unwrap();
        // Python: pyproject.toml (2) + 1 source file (1) = 3
        write(temp.path(), "pyproject.toml", "[project]\nname = \"x\"\n");
        write(temp.path(), "app.py", "import os\n");
        // Ruby: Gemfile.lock alone (3)
        write(temp.path(), "Gemfile.lock", "GEM\n  specs:\n");

        let report = detect_in(temp.path());
        let primary = report.primary.unwrap();
        assert_eq!(primary.ecosystem, Ecosystem::Ruby);
        assert!(primary.evidence.iter().any(|e| e.tier == EvidenceTier::Lock));
        assert_eq!(report.secondary[0].ecosystem, Ecosystem::Python);
        assert_eq!(report.secondary[0].score, primary.score);
    }

    #[test]
    fn test_confidence_never_decreases_with_more_evidence() {
        let temp = TempDir::new().unwrap();
        let steps: [(&str, &str); 4] = [
            ("requirements.txt", "requests==2.31.0\n"),
            ("pyproject.toml", "[tool.poetry]\nname = \"x\"\n"),
            ("poetry.lock", "[[package]]\nname = \"requests\"\nversion = \"2.31.0\"\n"),
            ("main.py", "import requests\n"),
        ];
        let mut previous = Confidence::Low;
        for (name, content) in steps {
            write(temp.path(), name, content);
            let report = detect_in(temp.path());
            let python = report
                .all()
                .find(|d| d.ecosystem == Ecosystem::Python)
                .unwrap();
            assert!(python.confidence >= previous, "confidence dropped after {}", name);
            previous = python.confidence;
        }
        assert_eq!(previous, Confidence::High);
    }

    #[test]
    fn test_empty_project() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "README.md", "# nothing\n");
        let report = detect_in(temp.path());
        assert!(report.is_empty());
        assert_eq!(report.package_manager(), None);
    }

    #[test]
    fn test_lock_mismatch_warning() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package.json", r#"{"packageManager": "yarn@4.0.2"}"#);
        write(temp.path(), "package-lock.json", "{}");

        let report = detect_in(temp.path());
        assert_eq!(report.package_manager(), Some(PackageManager::Yarn));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("package-lock.json"));
    }
}
