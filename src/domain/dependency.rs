//! Dependency information structures
//!
//! Two shapes exist:
//! - [`DeclaredDependency`]: one raw declaration as a manifest parser sees it
//! - [`Dependency`]: the canonical, merged node of the dependency graph

use super::{Criticality, Ecosystem, VersionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Normalized dependency scope
///
/// Every ecosystem's vocabulary (Maven scopes, Gradle configurations, npm
/// dependency sections, Bundler groups, Poetry groups) folds into this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Compile-time and runtime classpath (Maven `compile`, Gradle `implementation`, npm `dependencies`)
    Compile,
    /// Needed at runtime only (Maven `runtime`, Gradle `runtimeOnly`)
    Runtime,
    /// Supplied by the container/environment (Maven `provided`, Gradle `compileOnly`)
    Provided,
    /// Maven `system` scope with an explicit jar path
    System,
    /// Test-only
    Test,
    /// Development tooling (npm `devDependencies`, Bundler `:development`)
    Dev,
    /// Optional or extra (npm `optionalDependencies`, Python extras)
    Optional,
    /// Peer requirement (npm `peerDependencies`)
    Peer,
    /// Build plugin (sbt `addSbtPlugin`, Gradle plugin block)
    Plugin,
}

impl Scope {
    /// Rank used when one coordinate is declared with several scopes;
    /// the most runtime-shaping scope wins.
    pub fn runtime_rank(&self) -> u8 {
        match self {
            Scope::Compile => 8,
            Scope::Runtime => 7,
            Scope::System => 6,
            Scope::Provided => 5,
            Scope::Peer => 4,
            Scope::Optional => 3,
            Scope::Dev => 2,
            Scope::Test => 1,
            Scope::Plugin => 0,
        }
    }

    /// True for scopes that shape what ships at runtime
    pub fn is_runtime_shaping(&self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime | Scope::System)
    }

    /// True for scopes that never reach production
    pub fn is_non_production(&self) -> bool {
        matches!(self, Scope::Test | Scope::Dev | Scope::Plugin)
    }

    /// Returns the label used in reasons and text output
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::System => "system",
            Scope::Test => "test",
            Scope::Dev => "dev",
            Scope::Optional => "optional",
            Scope::Peer => "peer",
            Scope::Plugin => "plugin",
        }
    }

    /// Maps a raw group/scope/configuration name to a normalized scope
    pub fn from_label(raw: &str) -> Scope {
        let lower = raw.trim().trim_start_matches(':').to_ascii_lowercase();
        match lower.as_str() {
            "" | "compile" | "default" | "main" | "implementation" | "api" | "production" => {
                Scope::Compile
            }
            "runtime" | "runtimeonly" => Scope::Runtime,
            "provided" | "compileonly" | "compileonlyapi" | "annotationprocessor" | "kapt" => {
                Scope::Provided
            }
            "system" => Scope::System,
            "peer" => Scope::Peer,
            "optional" => Scope::Optional,
            "plugin" | "plugins" | "classpath" => Scope::Plugin,
            other if other.starts_with("test") || other.ends_with("test") => Scope::Test,
            other if other.contains("test") => Scope::Test,
            "dev" | "development" | "develop" | "lint" | "docs" | "doc" | "typing" => Scope::Dev,
            other if other.starts_with("dev") || other.starts_with("debug") => Scope::Dev,
            _ => Scope::Optional,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a dependency's artifacts come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyOrigin {
    /// The ecosystem's default package registry
    #[default]
    Registry,
    /// A git repository
    Git,
    /// A local path
    Path,
    /// An arbitrary URL or tarball
    Url,
}

/// How a declaration entered the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationSource {
    /// A primary manifest (`go.mod`, `pom.xml`, `package.json`, `Gemfile`)
    Manifest,
    /// A lock file (`go.sum`, `package-lock.json`, `Gemfile.lock`)
    Lockfile,
}

/// One dependency declaration as read from a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDependency {
    /// Ecosystem-specific identity (`group:artifact`, module path, gem name)
    pub coordinate: String,
    /// Ecosystem of the declaring file
    pub ecosystem: Ecosystem,
    /// Declared constraint, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSpec>,
    /// Version pinned by a lock file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
    /// Normalized scope
    pub scope: Scope,
    /// Raw group/configuration/section name as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// True when explicitly declared in a primary manifest
    pub is_direct: bool,
    /// Manifest or lock file
    pub source: DeclarationSource,
    /// Registry, git, path or url
    pub origin: DependencyOrigin,
    /// Excluded transitive coordinates (Maven/Gradle exclusions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
    /// Replacement target (Go `replace`, npm `overrides`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// 1-based line number in the declaring file, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl DeclaredDependency {
    /// Creates a direct manifest declaration
    pub fn new(coordinate: impl Into<String>, ecosystem: Ecosystem, scope: Scope) -> Self {
        Self {
            coordinate: coordinate.into(),
            ecosystem,
            version: None,
            resolved_version: None,
            scope,
            group: None,
            is_direct: true,
            source: DeclarationSource::Manifest,
            origin: DependencyOrigin::Registry,
            exclusions: Vec::new(),
            replacement: None,
            line: None,
        }
    }

    /// Creates a lock-file entry pinning a resolved version
    pub fn locked(
        coordinate: impl Into<String>,
        ecosystem: Ecosystem,
        resolved: impl Into<String>,
    ) -> Self {
        Self {
            resolved_version: Some(resolved.into()),
            is_direct: false,
            source: DeclarationSource::Lockfile,
            ..Self::new(coordinate, ecosystem, Scope::Compile)
        }
    }

    /// Sets the declared version constraint
    pub fn with_version(mut self, spec: VersionSpec) -> Self {
        self.version = Some(spec);
        self
    }

    /// Sets the raw group/configuration name
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Marks the declaration as indirect (e.g. go.mod `// indirect`)
    pub fn indirect(mut self) -> Self {
        self.is_direct = false;
        self
    }

    /// Sets the artifact origin
    pub fn with_origin(mut self, origin: DependencyOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the exclusion list
    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the replacement target
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    /// Sets the line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the declared raw constraint, if any
    pub fn declared_raw(&self) -> Option<&str> {
        self.version
            .as_ref()
            .map(|v| v.raw.as_str())
            .filter(|raw| !raw.is_empty())
    }
}

/// Source-level usage facts collected for one coordinate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageFacts {
    /// Files containing at least one reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    /// Wildcard imports (`import a.b.*`, `from a import *`)
    pub wildcard_imports: usize,
    /// Go dot-imports (`import . "pkg"`)
    pub dot_imports: usize,
    /// References made from cgo-enabled Go files
    pub cgo_files: usize,
}

/// The canonical dependency node of an analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Ecosystem-specific identity, unique within the run
    pub coordinate: String,
    /// Ecosystem the dependency belongs to
    pub ecosystem: Ecosystem,
    /// First declared constraint
    pub declared_version: Option<String>,
    /// Version confirmed by a lock file or a toolchain; `None` means unverified
    pub resolved_version: Option<String>,
    /// Most runtime-shaping scope among all declarations
    pub scope: Scope,
    /// Raw group/configuration names seen for this coordinate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Explicitly declared in a primary manifest
    pub is_direct: bool,
    /// Complement of `is_direct`
    pub is_transitive: bool,
    /// Number of distinct source-level reference sites
    pub usage_count: usize,
    /// Detail behind `usage_count`
    pub usage: UsageFacts,
    /// Importance bucket
    pub criticality: Criticality,
    /// Triggered scoring rules, in evaluation order
    pub criticality_reasons: Vec<String>,
    /// Sum of triggered rule weights
    pub criticality_score: i32,
    /// Every distinct declared constraint for this coordinate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declared_versions: Vec<String>,
    /// Declarations disagree, or a resolver reported a conflict
    pub version_conflict: bool,
    /// Resolver evicted a requested version in favour of another
    pub evicted: bool,
    /// Versions the resolver discarded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evicted_versions: Vec<String>,
    /// Replacement target (Go `replace`, npm `overrides`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    /// Excluded transitive coordinates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
    /// Registry, git, path or url
    pub origin: DependencyOrigin,
    /// The declared constraint is missing or unbounded
    pub unconstrained: bool,
    /// Coordinates that pull this one in (from toolchain graphs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_by: Vec<String>,
    /// Files that declare this coordinate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declared_in: Vec<PathBuf>,
}

impl Dependency {
    /// Creates an unscored node
    pub fn new(coordinate: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            coordinate: coordinate.into(),
            ecosystem,
            declared_version: None,
            resolved_version: None,
            scope: Scope::Compile,
            groups: Vec::new(),
            is_direct: false,
            is_transitive: true,
            usage_count: 0,
            usage: UsageFacts::default(),
            criticality: Criticality::Low,
            criticality_reasons: Vec::new(),
            criticality_score: 0,
            declared_versions: Vec::new(),
            version_conflict: false,
            evicted: false,
            evicted_versions: Vec::new(),
            replaced_by: None,
            exclusions: Vec::new(),
            origin: DependencyOrigin::Registry,
            unconstrained: false,
            required_by: Vec::new(),
            declared_in: Vec::new(),
        }
    }

    /// The most concrete version known: resolved first, then declared
    pub fn effective_version(&self) -> Option<&str> {
        self.resolved_version
            .as_deref()
            .or(self.declared_version.as_deref())
    }

    /// Direct dependency with no detected reference site
    pub fn is_unused_direct(&self) -> bool {
        self.is_direct && self.usage_count == 0
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_version() {
            Some(v) => write!(f, "{}@{}", self.coordinate, v),
            None => write!(f, "{}", self.coordinate),
        }
    }
}
