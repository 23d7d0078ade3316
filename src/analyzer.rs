//! Analysis workflow
//!
//! `analyze`: locate → detect → parse → measure usage → consult tools → build
//! graph → score → recommend.
//!
//! `compare`: validate versions → (optionally) analyze the project → diff →
//! mine changelog → recommend.
//!
//! Per-file and per-tool failures are recorded on the result and the
//! workflow continues; only a missing project or bad comparison input fails
//! the call.

use crate::changelog;
use crate::config::Config;
use crate::detector;
use crate::domain::{
    ChangelogClassification, Criticality, Dependency, DependencyUsageAnalysis, DetectionReport,
    Ecosystem, ManifestFile, ManifestFormat, ManifestSummary, RuntimeChange, UsageSummary,
    VersionComparisonAnalysis,
};
use crate::error::InputError;
use crate::graph::DependencyGraph;
use crate::manifest::{link_version_catalogs, parse_manifest};
use crate::progress::{Progress, Stage};
use crate::recommend::{recommend_upgrade, recommend_usage, UpgradeContext};
use crate::scoring::Scorer;
use crate::tools::{self, DisabledRunner, SystemToolRunner, ToolRunner, MAX_INSIGHT_TARGETS};
use crate::usage::{self, normalize_python_name};
use crate::version::get_comparator;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for a version comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareRequest {
    /// Project to look the package up in
    pub project: Option<PathBuf>,
    pub package: String,
    pub from: String,
    pub to: String,
    pub ecosystem: Option<Ecosystem>,
    pub changelog: Option<PathBuf>,
    pub runtime: Option<RuntimeChange>,
}

impl CompareRequest {
    pub fn new(package: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }
}

/// Runs analyses with one configuration
pub struct Analyzer {
    config: Config,
    runner: Arc<dyn ToolRunner>,
    show_progress: bool,
}

impl Analyzer {
    /// Creates an analyzer that runs real toolchain processes
    pub fn new(config: Config) -> Self {
        let runner: Arc<dyn ToolRunner> = if config.tools_enabled {
            Arc::new(SystemToolRunner::new(config.tool_timeout))
        } else {
            Arc::new(DisabledRunner)
        };
        Self::with_runner(config, runner)
    }

    /// Creates an analyzer with a custom tool runner (for testing)
    pub fn with_runner(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            config,
            runner,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detects the project's ecosystems and package managers
    pub fn detect(&self, root: &Path) -> Result<DetectionReport, InputError> {
        let mut progress = Progress::new(self.show_progress);
        progress.stage(Stage::Detecting);
        detector::detect_project(root, &self.config.locator())
    }

    /// Builds the dependency-usage analysis of the project at `root`
    pub async fn analyze(&self, root: &Path) -> Result<DependencyUsageAnalysis, InputError> {
        let mut progress = Progress::new(self.show_progress);
        let mut warnings = self.config.warnings.clone();

        // Step 1: Locate files and detect ecosystems
        progress.stage(Stage::Scanning);
        let located = self.config.locator().locate(root)?;
        let detection = detector::detect(&located);
        warnings.extend(located.warnings.iter().cloned());

        // Step 2: Parse manifests
        let manifest_paths: Vec<(PathBuf, PathBuf, ManifestFormat)> = located
            .manifests()
            .map(|(file, format)| (file.path.clone(), file.relative.clone(), format))
            .collect();
        if manifest_paths.is_empty() {
            return Err(InputError::NoManifest {
                path: located.root.clone(),
            });
        }
        progress.parsing(manifest_paths.len());
        let mut files = Vec::with_capacity(manifest_paths.len());
        for (path, relative, format) in manifest_paths {
            files.push(self.parse_one(&path, &relative, format, &mut warnings));
            progress.parsed(&relative);
        }
        link_version_catalogs(&mut files);

        let manifests: Vec<ManifestSummary> = files.iter().map(summarize).collect();
        let mut builder = DependencyGraph::builder();
        for file in &files {
            builder.add_manifest(file);
        }

        let declared = declared_coordinates(&files);
        let ecosystems: BTreeSet<Ecosystem> = detection
            .ecosystems()
            .into_iter()
            .chain(declared.keys().copied())
            .collect();

        // Step 3: Measure usage in source files
        let mut scanned = BTreeSet::new();
        for &ecosystem in &ecosystems {
            let coordinates: Vec<String> = declared
                .get(&ecosystem)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            progress.stage(Stage::Measuring(ecosystem));
            let report = usage::measure(&located, ecosystem, &coordinates);
            debug!(
                ecosystem = %ecosystem,
                files = report.files_scanned,
                matched = report.by_coordinate.len(),
                unresolved = report.unresolved.len(),
                "usage measured"
            );
            if report.files_scanned > 0 {
                scanned.insert(ecosystem);
            }
            warnings.extend(report.warnings.iter().cloned());
            builder.add_usage(ecosystem, &report);
        }

        // Step 4: Consult toolchains
        let mut tool_reports = Vec::new();
        for &ecosystem in ecosystems.iter().filter(|e| e.has_toolchain()) {
            progress.stage(Stage::Consulting(ecosystem));
            let targets = insight_targets(&files, ecosystem);
            let outcome = tools::collect(self.runner.as_ref(), ecosystem, root, &targets).await;
            builder.add_tool_findings(ecosystem, &outcome.findings);
            tool_reports.extend(outcome.reports);
        }

        // Step 5: Score and recommend
        progress.stage(Stage::Scoring);
        let graph = Scorer::new(self.config.scoring.clone()).score_graph(builder.build());
        let dependencies = graph.into_dependencies();
        let recommendations = recommend_usage(&dependencies, &scanned);
        let summary = UsageSummary::from_dependencies(&dependencies);

        info!(
            dependencies = summary.total,
            high = summary.high,
            unused = summary.unused_direct,
            "analysis complete"
        );

        Ok(DependencyUsageAnalysis {
            project_path: located.root.clone(),
            analyzed_at: Utc::now(),
            detection,
            manifests,
            dependencies,
            summary,
            recommendations,
            tools: tool_reports,
            warnings,
        })
    }

    fn parse_one(
        &self,
        path: &Path,
        relative: &Path,
        format: ManifestFormat,
        warnings: &mut Vec<String>,
    ) -> ManifestFile {
        let mut file = match parse_manifest(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "manifest unreadable");
                warnings.push(format!("could not read {}: {}", relative.display(), e));
                let mut file = ManifestFile::new(path, format);
                file.parse_errors.push(e.to_string());
                file
            }
        };
        file.path = relative.to_path_buf();
        file
    }

    /// Compares two versions of a package
    pub async fn compare(
        &self,
        request: &CompareRequest,
    ) -> Result<VersionComparisonAnalysis, InputError> {
        let package = request.package.trim();
        let from = request.from.trim();
        let to = request.to.trim();
        if from.is_empty() {
            return Err(InputError::EmptyVersion {
                package: package.to_string(),
                which: "from",
            });
        }
        if to.is_empty() {
            return Err(InputError::EmptyVersion {
                package: package.to_string(),
                which: "to",
            });
        }

        let mut warnings = Vec::new();
        let analysis = match &request.project {
            Some(project) => Some(self.analyze(project).await?),
            None => None,
        };
        let dependency = match &analysis {
            Some(analysis) => Some(find_package(analysis, package, request.ecosystem).ok_or_else(
                || InputError::PackageNotFound {
                    package: package.to_string(),
                    project: analysis.project_path.clone(),
                },
            )?),
            None => None,
        };

        let ecosystem = request
            .ecosystem
            .or_else(|| dependency.map(|d| d.ecosystem))
            .or_else(|| {
                analysis
                    .as_ref()
                    .and_then(|a| a.detection.primary.as_ref())
                    .map(|p| p.ecosystem)
            })
            .ok_or_else(|| InputError::UnknownEcosystem {
                package: package.to_string(),
            })?;

        let comparator = get_comparator(ecosystem);
        let version_diff = comparator.compare(from, to);

        let changelog = match &request.changelog {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    InputError::ChangelogRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                let digest = changelog::mine(&text, comparator.as_ref(), from, to);
                if digest.unsectioned {
                    warnings.push(format!(
                        "{} has no version headings; classified the whole file",
                        path.display()
                    ));
                } else if digest.versions.is_empty() {
                    warnings.push(format!(
                        "{} has no entries between {} and {}",
                        path.display(),
                        from,
                        to
                    ));
                }
                digest.classification
            }
            None => ChangelogClassification::default(),
        };

        let criticality: Option<Criticality> = dependency.map(|d| d.criticality);
        let recommendation = recommend_upgrade(&UpgradeContext {
            package,
            diff: &version_diff,
            criticality,
            changelog: &changelog,
            runtime_change: request.runtime.as_ref(),
            extra_critical: self.config.scoring.extra_critical(ecosystem),
        });

        Ok(VersionComparisonAnalysis {
            package: package.to_string(),
            ecosystem,
            analyzed_at: Utc::now(),
            version_diff,
            criticality,
            criticality_reasons: dependency
                .map(|d| d.criticality_reasons.clone())
                .unwrap_or_default(),
            usage_count: dependency.map(|d| d.usage_count),
            runtime_change: request.runtime.clone(),
            changelog,
            recommendation,
            warnings,
        })
    }
}

fn summarize(file: &ManifestFile) -> ManifestSummary {
    ManifestSummary {
        path: file.path.clone(),
        format: file.format,
        ecosystem: file.ecosystem(),
        dependency_count: file.declarations.len(),
        parse_errors: file.parse_errors.clone(),
    }
}

/// Coordinates per ecosystem that usage can be attributed to
fn declared_coordinates(files: &[ManifestFile]) -> BTreeMap<Ecosystem, BTreeSet<String>> {
    let mut declared: BTreeMap<Ecosystem, BTreeSet<String>> = BTreeMap::new();
    for file in files {
        for decl in &file.declarations {
            if decl.ecosystem.is_jvm() && !decl.coordinate.contains(':') {
                continue;
            }
            declared
                .entry(decl.ecosystem)
                .or_default()
                .insert(decl.coordinate.clone());
        }
    }
    declared
}

/// Gradle coordinates declared with more than one version
fn insight_targets(files: &[ManifestFile], ecosystem: Ecosystem) -> Vec<String> {
    if ecosystem != Ecosystem::Gradle {
        return Vec::new();
    }
    let mut versions: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for decl in files
        .iter()
        .filter(|f| f.format == ManifestFormat::Gradle)
        .flat_map(|f| &f.declarations)
    {
        if let Some(raw) = decl.declared_raw() {
            versions.entry(&decl.coordinate).or_default().insert(raw);
        }
    }
    versions
        .into_iter()
        .filter(|(_, v)| v.len() > 1)
        .map(|(coordinate, _)| coordinate.to_string())
        .take(MAX_INSIGHT_TARGETS)
        .collect()
}

fn find_package<'a>(
    analysis: &'a DependencyUsageAnalysis,
    package: &str,
    ecosystem: Option<Ecosystem>,
) -> Option<&'a Dependency> {
    let normalized = normalize_python_name(package);
    analysis
        .dependencies
        .iter()
        .filter(|d| ecosystem.map_or(true, |e| d.ecosystem == e))
        .find(|d| {
            d.coordinate == package
                || d.coordinate.eq_ignore_ascii_case(package)
                || (d.ecosystem == Ecosystem::Python && d.coordinate == normalized)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Complexity, PackageManager, SemverType};
    use crate::tools::mock::MockRunner;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn analyzer() -> Analyzer {
        Analyzer::with_runner(Config::default(), Arc::new(MockRunner::missing_binary()))
    }

    fn go_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "go.mod",
            "module example.com/svc\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgithub.com/pkg/errors v0.9.1\n)\n",
        );
        let mut handlers = String::from("package main\n\nimport \"github.com/gin-gonic/gin\"\n\n");
        for i in 0..11 {
            handlers.push_str(&format!("func h{}(c *gin.Context) {{}}\n", i));
        }
        write(dir.path(), "main.go", &handlers);
        for i in 0..11 {
            write(
                dir.path(),
                &format!("handlers/h{}.go", i),
                "package handlers\n\nimport \"github.com/gin-gonic/gin\"\n\nvar _ gin.HandlerFunc\n",
            );
        }
        dir
    }

    #[tokio::test]
    async fn test_analyze_go_project() {
        let dir = go_project();
        let analysis = analyzer().analyze(dir.path()).await.unwrap();

        assert_eq!(
            analysis.detection.primary.as_ref().map(|p| p.ecosystem),
            Some(Ecosystem::Go)
        );
        let gin = analysis.find("github.com/gin-gonic/gin").unwrap();
        assert!(gin.usage_count >= 10);
        assert_eq!(gin.criticality, Criticality::High);

        let errors = analysis.find("github.com/pkg/errors").unwrap();
        assert_eq!(errors.usage_count, 0);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("github.com/pkg/errors")));

        // tool failures are reported, not warned
        assert!(!analysis.tools.is_empty());
        assert!(analysis.tools.iter().all(|t| !t.succeeded));
        assert!(!analysis.has_errors());
        assert_eq!(analysis.manifests[0].path, PathBuf::from("go.mod"));
    }

    #[tokio::test]
    async fn test_analyze_missing_project() {
        let err = analyzer()
            .analyze(Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_analyze_without_manifest_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "# notes\n");
        let err = analyzer().analyze(dir.path()).await.unwrap_err();
        assert!(matches!(err, InputError::NoManifest { .. }));

        // detection still reports an empty result
        let report = analyzer().detect(dir.path()).unwrap();
        assert!(report.primary.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_manifest_keeps_located_format() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Gemfile"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        write(dir.path(), "app.rb", "require 'json'\n");
        let analysis = analyzer().analyze(dir.path()).await.unwrap();

        let gemfile = &analysis.manifests[0];
        assert_eq!(gemfile.format, ManifestFormat::Gemfile);
        assert_eq!(gemfile.ecosystem, Ecosystem::Ruby);
        assert_eq!(gemfile.parse_errors.len(), 1);
        assert!(analysis.has_errors());
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_recorded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{ not json");
        write(dir.path(), "package-lock.json", "{\"lockfileVersion\": 3, \"packages\": {}}");
        let analysis = analyzer().analyze(dir.path()).await.unwrap();
        assert!(analysis.has_errors());
        let summary = analysis
            .manifests
            .iter()
            .find(|m| m.format == ManifestFormat::PackageJson)
            .unwrap();
        assert_eq!(summary.parse_errors.len(), 1);
        assert_eq!(analysis.detection.package_manager(), Some(PackageManager::Npm));
    }

    #[tokio::test]
    async fn test_compare_without_project() {
        let mut request = CompareRequest::new("faraday", "1.2.3", "1.2.5");
        request.ecosystem = Some(Ecosystem::Ruby);
        let result = analyzer().compare(&request).await.unwrap();
        assert_eq!(result.version_diff.semver_type, SemverType::Patch);
        assert_eq!(result.recommendation.complexity, Complexity::Low);
        assert!(result.criticality.is_none());
        assert!(result.usage_count.is_none());
    }

    #[tokio::test]
    async fn test_compare_uses_project_dependency() {
        let dir = go_project();
        let mut request = CompareRequest::new("github.com/gin-gonic/gin", "v1.9.1", "v2.0.0");
        request.project = Some(dir.path().to_path_buf());
        let result = analyzer().compare(&request).await.unwrap();
        assert_eq!(result.ecosystem, Ecosystem::Go);
        assert_eq!(result.criticality, Some(Criticality::High));
        assert!(result.usage_count.unwrap() >= 10);
        assert!(!result.criticality_reasons.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_compare_undeclared_package_fails() {
        let dir = go_project();
        let mut request = CompareRequest::new("github.com/spf13/cobra", "v1.7.0", "v1.8.0");
        request.project = Some(dir.path().to_path_buf());
        let err = analyzer().compare(&request).await.unwrap_err();
        assert!(matches!(
            err,
            InputError::PackageNotFound { ref package, .. } if package == "github.com/spf13/cobra"
        ));
    }

    #[tokio::test]
    async fn test_compare_input_errors() {
        let empty = CompareRequest::new("lodash", "", "4.17.21");
        assert!(matches!(
            analyzer().compare(&empty).await,
            Err(InputError::EmptyVersion { which: "from", .. })
        ));

        let unknown = CompareRequest::new("lodash", "4.17.20", "4.17.21");
        assert!(matches!(
            analyzer().compare(&unknown).await,
            Err(InputError::UnknownEcosystem { .. })
        ));

        let mut missing_log = CompareRequest::new("lodash", "4.17.20", "4.17.21");
        missing_log.ecosystem = Some(Ecosystem::Node);
        missing_log.changelog = Some(PathBuf::from("/no/such/CHANGELOG.md"));
        assert!(matches!(
            analyzer().compare(&missing_log).await,
            Err(InputError::ChangelogRead { .. })
        ));
    }

    #[tokio::test]
    async fn test_compare_mines_changelog() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CHANGELOG.md",
            "## 2.0.0\n- BREAKING: removed legacy API\n- Added streaming\n\n## 1.5.0\n- Fixed crash\n",
        );
        let mut request = CompareRequest::new("some-lib", "1.5.0", "2.0.0");
        request.ecosystem = Some(Ecosystem::Node);
        request.changelog = Some(dir.path().join("CHANGELOG.md"));
        let result = analyzer().compare(&request).await.unwrap();
        assert_eq!(result.changelog.breaking_changes.len(), 1);
        assert_eq!(result.changelog.new_features.len(), 1);
        assert!(result.changelog.bug_fixes.is_empty());
    }

    #[test]
    fn test_insight_targets() {
        let mut app = ManifestFile::new("app/build.gradle", ManifestFormat::Gradle);
        let mut lib = ManifestFile::new("lib/build.gradle", ManifestFormat::Gradle);
        for (file, version) in [(&mut app, "2.15.0"), (&mut lib, "2.16.1")] {
            file.declarations.push(
                crate::domain::DeclaredDependency::new(
                    "com.fasterxml.jackson.core:jackson-databind",
                    Ecosystem::Gradle,
                    crate::domain::Scope::Compile,
                )
                .with_version(crate::domain::VersionSpec::new(
                    crate::domain::VersionSpecKind::Exact,
                    version,
                    version,
                )),
            );
        }
        let files = vec![app, lib];
        assert_eq!(
            insight_targets(&files, Ecosystem::Gradle),
            vec!["com.fasterxml.jackson.core:jackson-databind"]
        );
        assert!(insight_targets(&files, Ecosystem::Maven).is_empty());
    }
}
