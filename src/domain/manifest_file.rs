//! Parsed manifest file representation

use super::{DeclaredDependency, Ecosystem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Every file format understood by the manifest parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    GoMod,
    GoWork,
    GoSum,
    Pom,
    Gradle,
    GradleSettings,
    VersionCatalog,
    Sbt,
    SbtPlugins,
    SbtBuildProperties,
    PackageJson,
    PackageLock,
    YarnLock,
    PnpmLock,
    Pyproject,
    Requirements,
    Pipfile,
    PipfileLock,
    PoetryLock,
    UvLock,
    Gemfile,
    GemfileLock,
}

impl ManifestFormat {
    /// Identifies a format from a file path
    ///
    /// `plugins.sbt` and `build.properties` only count when they live
    /// under a `project/` directory.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let parent_is_project = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            == Some("project");
        let parent_is_gradle = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            == Some("gradle");

        let format = match name {
            "go.mod" => ManifestFormat::GoMod,
            "go.work" => ManifestFormat::GoWork,
            "go.sum" => ManifestFormat::GoSum,
            "pom.xml" => ManifestFormat::Pom,
            "build.gradle" | "build.gradle.kts" => ManifestFormat::Gradle,
            "settings.gradle" | "settings.gradle.kts" => ManifestFormat::GradleSettings,
            "libs.versions.toml" if parent_is_gradle => ManifestFormat::VersionCatalog,
            "build.sbt" => ManifestFormat::Sbt,
            "plugins.sbt" if parent_is_project => ManifestFormat::SbtPlugins,
            "build.properties" if parent_is_project => ManifestFormat::SbtBuildProperties,
            "package.json" => ManifestFormat::PackageJson,
            "package-lock.json" | "npm-shrinkwrap.json" => ManifestFormat::PackageLock,
            "yarn.lock" => ManifestFormat::YarnLock,
            "pnpm-lock.yaml" => ManifestFormat::PnpmLock,
            "pyproject.toml" => ManifestFormat::Pyproject,
            "Pipfile" => ManifestFormat::Pipfile,
            "Pipfile.lock" => ManifestFormat::PipfileLock,
            "poetry.lock" => ManifestFormat::PoetryLock,
            "uv.lock" => ManifestFormat::UvLock,
            "Gemfile" | "gems.rb" => ManifestFormat::Gemfile,
            "Gemfile.lock" | "gems.locked" => ManifestFormat::GemfileLock,
            n if is_requirements_name(n) => ManifestFormat::Requirements,
            _ => return None,
        };
        Some(format)
    }

    /// Returns the ecosystem whose dependencies this format declares
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestFormat::GoMod | ManifestFormat::GoWork | ManifestFormat::GoSum => Ecosystem::Go,
            ManifestFormat::Pom => Ecosystem::Maven,
            ManifestFormat::Gradle
            | ManifestFormat::GradleSettings
            | ManifestFormat::VersionCatalog => Ecosystem::Gradle,
            ManifestFormat::Sbt | ManifestFormat::SbtPlugins | ManifestFormat::SbtBuildProperties => {
                Ecosystem::Sbt
            }
            ManifestFormat::PackageJson
            | ManifestFormat::PackageLock
            | ManifestFormat::YarnLock
            | ManifestFormat::PnpmLock => Ecosystem::Node,
            ManifestFormat::Pyproject
            | ManifestFormat::Requirements
            | ManifestFormat::Pipfile
            | ManifestFormat::PipfileLock
            | ManifestFormat::PoetryLock
            | ManifestFormat::UvLock => Ecosystem::Python,
            ManifestFormat::Gemfile | ManifestFormat::GemfileLock => Ecosystem::Ruby,
        }
    }

    /// True when the format pins resolved versions rather than declaring constraints
    pub fn is_lockfile(&self) -> bool {
        matches!(
            self,
            ManifestFormat::GoSum
                | ManifestFormat::PackageLock
                | ManifestFormat::YarnLock
                | ManifestFormat::PnpmLock
                | ManifestFormat::PipfileLock
                | ManifestFormat::PoetryLock
                | ManifestFormat::UvLock
                | ManifestFormat::GemfileLock
        )
    }

    /// Short human label
    pub fn label(&self) -> &'static str {
        match self {
            ManifestFormat::GoMod => "go.mod",
            ManifestFormat::GoWork => "go.work",
            ManifestFormat::GoSum => "go.sum",
            ManifestFormat::Pom => "pom.xml",
            ManifestFormat::Gradle => "build.gradle",
            ManifestFormat::GradleSettings => "settings.gradle",
            ManifestFormat::VersionCatalog => "libs.versions.toml",
            ManifestFormat::Sbt => "build.sbt",
            ManifestFormat::SbtPlugins => "plugins.sbt",
            ManifestFormat::SbtBuildProperties => "build.properties",
            ManifestFormat::PackageJson => "package.json",
            ManifestFormat::PackageLock => "package-lock.json",
            ManifestFormat::YarnLock => "yarn.lock",
            ManifestFormat::PnpmLock => "pnpm-lock.yaml",
            ManifestFormat::Pyproject => "pyproject.toml",
            ManifestFormat::Requirements => "requirements.txt",
            ManifestFormat::Pipfile => "Pipfile",
            ManifestFormat::PipfileLock => "Pipfile.lock",
            ManifestFormat::PoetryLock => "poetry.lock",
            ManifestFormat::UvLock => "uv.lock",
            ManifestFormat::Gemfile => "Gemfile",
            ManifestFormat::GemfileLock => "Gemfile.lock",
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Matches `requirements.txt`, `requirements-dev.txt` and `requirements.in`
pub fn is_requirements_name(name: &str) -> bool {
    name.starts_with("requirements") && (name.ends_with(".txt") || name.ends_with(".in"))
}

/// Non-dependency facts a manifest exposes (toolchain versions, workspace members, includes)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    /// Key/value facts such as `go = 1.21`, `sbt.version = 1.9.7`, `packageManager = pnpm@8.15.0`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facts: BTreeMap<String, String>,
    /// Referenced files or modules (`go.work use`, `-r other.txt`, `gemspec`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
}

impl ManifestMetadata {
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.includes.is_empty()
    }

    pub fn fact(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }
}

/// One parsed source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    /// Path to the file
    pub path: PathBuf,
    /// Detected format
    pub format: ManifestFormat,
    /// Raw declarations in file order
    pub declarations: Vec<DeclaredDependency>,
    /// Toolchain and workspace facts
    #[serde(default, skip_serializing_if = "ManifestMetadata::is_empty")]
    pub metadata: ManifestMetadata,
    /// Non-fatal parse errors, accumulated rather than thrown
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_errors: Vec<String>,
}

impl ManifestFile {
    /// Creates an empty ManifestFile
    pub fn new(path: impl Into<PathBuf>, format: ManifestFormat) -> Self {
        Self {
            path: path.into(),
            format,
            declarations: Vec::new(),
            metadata: ManifestMetadata::default(),
            parse_errors: Vec::new(),
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.format.ecosystem()
    }

    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty()
    }
}
