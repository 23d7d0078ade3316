//! External toolchain adapters
//!
//! Toolchains know the resolved, transitive picture that manifests only
//! hint at. Every adapter returns `Result<_, ToolUnavailable>`; callers
//! record the failure and continue with declared-only data.

mod go;
mod gradle;
mod maven;
mod runner;
mod sbt;

pub use runner::{
    DisabledRunner, SystemToolRunner, ToolCommand, ToolRunner, DEFAULT_TOOL_TIMEOUT,
};

use crate::domain::{Ecosystem, Scope, ToolReport};
use crate::error::ToolUnavailable;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Gradle `dependencyInsight` runs at most this many times per analysis
pub const MAX_INSIGHT_TARGETS: usize = 5;

/// One package as a toolchain reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub coordinate: String,
    /// Version the resolver selected
    pub version: Option<String>,
    pub scope: Option<Scope>,
    /// Declared by the project itself rather than pulled in
    pub direct: bool,
    /// Versions the resolver discarded for this coordinate
    pub evicted_versions: Vec<String>,
    pub replaced_by: Option<String>,
    /// The resolver had to pick between competing versions
    pub conflict: bool,
}

impl ResolvedNode {
    pub fn new(coordinate: impl Into<String>, version: Option<String>) -> Self {
        Self {
            coordinate: coordinate.into(),
            version,
            scope: None,
            direct: false,
            evicted_versions: Vec::new(),
            replaced_by: None,
            conflict: false,
        }
    }

    /// Marks `evicted` as discarded in favour of the selected version
    pub fn evicting(mut self, evicted: impl Into<String>) -> Self {
        let evicted = evicted.into();
        if !self.evicted_versions.contains(&evicted) {
            self.evicted_versions.push(evicted);
        }
        self.conflict = true;
        self
    }
}

/// Dependency edge: `from` requires `to`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Everything learned from one or more tool runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFindings {
    pub nodes: Vec<ResolvedNode>,
    pub edges: Vec<Edge>,
}

impl ToolFindings {
    pub fn merge(&mut self, other: ToolFindings) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    fn push_edge(&mut self, from: &str, to: &str) {
        if from != to {
            self.edges.push(Edge {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
}

/// Supported tool invocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    /// `go list -m -json all`
    GoList,
    /// `go mod graph`
    GoModGraph,
    /// `mvn dependency:tree`
    MavenTree,
    /// `gradle dependencies`
    GradleDependencies,
    /// `gradle dependencyInsight --dependency <coordinate>`
    GradleInsight(String),
    /// `sbt dependencyTree`
    SbtDependencyTree,
    /// `sbt evicted`
    SbtEvicted,
}

impl ToolKind {
    /// Tools consulted for an ecosystem; Gradle adds one insight run per target
    pub fn for_ecosystem(ecosystem: Ecosystem, insight_targets: &[String]) -> Vec<ToolKind> {
        match ecosystem {
            Ecosystem::Go => vec![ToolKind::GoList, ToolKind::GoModGraph],
            Ecosystem::Maven => vec![ToolKind::MavenTree],
            Ecosystem::Gradle => {
                let mut kinds = vec![ToolKind::GradleDependencies];
                kinds.extend(
                    insight_targets
                        .iter()
                        .take(MAX_INSIGHT_TARGETS)
                        .map(|t| ToolKind::GradleInsight(t.clone())),
                );
                kinds
            }
            Ecosystem::Sbt => vec![ToolKind::SbtDependencyTree, ToolKind::SbtEvicted],
            Ecosystem::Node | Ecosystem::Python | Ecosystem::Ruby => Vec::new(),
        }
    }

    /// Builds the command line, preferring a project wrapper script when present
    pub fn command(&self, root: &Path) -> ToolCommand {
        let wrapper = |script: &str, fallback: &str| {
            if root.join(script).is_file() {
                format!("./{}", script)
            } else {
                fallback.to_string()
            }
        };
        match self {
            ToolKind::GoList => ToolCommand::new("go", ["list", "-m", "-json", "all"]),
            ToolKind::GoModGraph => ToolCommand::new("go", ["mod", "graph"]),
            ToolKind::MavenTree => ToolCommand::new(
                wrapper("mvnw", "mvn"),
                ["-B", "-Dstyle.color=never", "dependency:tree"],
            ),
            ToolKind::GradleDependencies => {
                ToolCommand::new(wrapper("gradlew", "gradle"), ["-q", "--console=plain", "dependencies"])
            }
            ToolKind::GradleInsight(coordinate) => ToolCommand::new(
                wrapper("gradlew", "gradle"),
                [
                    "-q",
                    "--console=plain",
                    "dependencyInsight",
                    "--configuration",
                    "runtimeClasspath",
                    "--dependency",
                    coordinate.as_str(),
                ],
            ),
            ToolKind::SbtDependencyTree => {
                ToolCommand::new("sbt", ["-batch", "-no-colors", "dependencyTree"])
            }
            ToolKind::SbtEvicted => ToolCommand::new("sbt", ["-batch", "-no-colors", "evicted"]),
        }
    }

    /// Parses captured stdout
    pub fn parse(&self, command: &ToolCommand, output: &str) -> Result<ToolFindings, ToolUnavailable> {
        let output = strip_ansi(output);
        match self {
            ToolKind::GoList => go::parse_list(&output)
                .map_err(|e| ToolUnavailable::unparseable(command.to_string(), e)),
            ToolKind::GoModGraph => Ok(go::parse_graph(&output)),
            ToolKind::MavenTree => Ok(maven::parse_tree(&output)),
            ToolKind::GradleDependencies => Ok(gradle::parse_dependencies(&output)),
            ToolKind::GradleInsight(coordinate) => Ok(gradle::parse_insight(coordinate, &output)),
            ToolKind::SbtDependencyTree => Ok(sbt::parse_tree(&output)),
            ToolKind::SbtEvicted => Ok(sbt::parse_evicted(&output)),
        }
    }
}

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

fn strip_ansi(output: &str) -> String {
    ANSI_RE.replace_all(output, "").into_owned()
}

/// Strips a Scala binary-version suffix so `cats-core_2.13` matches `org.typelevel:cats-core`
pub(crate) fn strip_scala_suffix(artifact: &str) -> &str {
    static SUFFIX_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"_(?:2\.1[0-3]|3)(?:_[\w.]+)?$").unwrap());
    match SUFFIX_RE.find(artifact) {
        Some(m) => &artifact[..m.start()],
        None => artifact,
    }
}

/// Findings plus one report per attempted command
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    pub findings: ToolFindings,
    pub reports: Vec<ToolReport>,
}

/// Runs every tool for `ecosystem`, degrading each failure to a report entry
pub async fn collect(
    runner: &dyn ToolRunner,
    ecosystem: Ecosystem,
    root: &Path,
    insight_targets: &[String],
) -> ToolOutcome {
    let mut outcome = ToolOutcome::default();

    for kind in ToolKind::for_ecosystem(ecosystem, insight_targets) {
        let command = kind.command(root);
        let result = match runner.run(&command, root).await {
            Ok(stdout) => kind.parse(&command, &stdout),
            Err(e) => Err(e),
        };

        match result {
            Ok(findings) => {
                debug!(
                    "{}: {} packages, {} edges",
                    command,
                    findings.nodes.len(),
                    findings.edges.len()
                );
                outcome.reports.push(ToolReport {
                    command: command.to_string(),
                    succeeded: true,
                    detail: format!(
                        "{} packages, {} edges",
                        findings.nodes.len(),
                        findings.edges.len()
                    ),
                });
                outcome.findings.merge(findings);
            }
            Err(e) => {
                warn!("{} unavailable: {}", command, e);
                let stop = matches!(
                    e,
                    ToolUnavailable::Disabled | ToolUnavailable::BinaryMissing { .. }
                );
                outcome.reports.push(ToolReport {
                    command: command.to_string(),
                    succeeded: false,
                    detail: e.to_string(),
                });
                // the remaining commands use the same binary
                if stop {
                    break;
                }
            }
        }
    }
    outcome
}
