//! Ecosystem and package-manager definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported package ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Go modules (go.mod)
    Go,
    /// Maven (pom.xml)
    Maven,
    /// Gradle (build.gradle, build.gradle.kts)
    Gradle,
    /// SBT (build.sbt)
    Sbt,
    /// Node.js (package.json)
    Node,
    /// Python (pyproject.toml, requirements.txt, Pipfile)
    Python,
    /// Ruby (Gemfile)
    Ruby,
}

impl Ecosystem {
    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Go => "Go",
            Ecosystem::Maven => "Maven",
            Ecosystem::Gradle => "Gradle",
            Ecosystem::Sbt => "SBT",
            Ecosystem::Node => "Node.js",
            Ecosystem::Python => "Python",
            Ecosystem::Ruby => "Ruby",
        }
    }

    /// Returns the configuration key used for this ecosystem
    pub fn key(&self) -> &'static str {
        match self {
            Ecosystem::Go => "go",
            Ecosystem::Maven => "maven",
            Ecosystem::Gradle => "gradle",
            Ecosystem::Sbt => "sbt",
            Ecosystem::Node => "node",
            Ecosystem::Python => "python",
            Ecosystem::Ruby => "ruby",
        }
    }

    /// Source file extensions whose imports reference this ecosystem's dependencies
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Go => &["go"],
            Ecosystem::Maven | Ecosystem::Gradle => &["java", "kt", "kts", "groovy", "scala"],
            Ecosystem::Sbt => &["scala", "java"],
            Ecosystem::Node => &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "vue", "svelte"],
            Ecosystem::Python => &["py", "pyi"],
            Ecosystem::Ruby => &["rb", "rake"],
        }
    }

    /// True for the JVM build tools, which share coordinates and import rules
    pub fn is_jvm(&self) -> bool {
        matches!(self, Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt)
    }

    /// True when an external toolchain can report the resolved graph
    pub fn has_toolchain(&self) -> bool {
        matches!(
            self,
            Ecosystem::Go | Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt
        )
    }

    /// Returns all supported ecosystems in their tie-break order
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Go,
            Ecosystem::Maven,
            Ecosystem::Gradle,
            Ecosystem::Sbt,
            Ecosystem::Node,
            Ecosystem::Python,
            Ecosystem::Ruby,
        ]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Ecosystem::Go),
            "maven" | "mvn" => Ok(Ecosystem::Maven),
            "gradle" => Ok(Ecosystem::Gradle),
            "sbt" | "scala" => Ok(Ecosystem::Sbt),
            "node" | "nodejs" | "npm" | "javascript" | "js" => Ok(Ecosystem::Node),
            "python" | "py" | "pip" => Ok(Ecosystem::Python),
            "ruby" | "rb" | "bundler" => Ok(Ecosystem::Ruby),
            other => Err(format!(
                "unknown ecosystem '{}': expected go, maven, gradle, sbt, node, python or ruby",
                other
            )),
        }
    }
}

/// Package managers that drive an ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// `go` module tooling
    Go,
    Maven,
    Gradle,
    Sbt,
    Npm,
    Yarn,
    Pnpm,
    Bun,
    Pip,
    Poetry,
    Uv,
    Pipenv,
    Pdm,
    Bundler,
}

impl PackageManager {
    /// Returns the ecosystem this package manager belongs to
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            PackageManager::Go => Ecosystem::Go,
            PackageManager::Maven => Ecosystem::Maven,
            PackageManager::Gradle => Ecosystem::Gradle,
            PackageManager::Sbt => Ecosystem::Sbt,
            PackageManager::Npm | PackageManager::Yarn | PackageManager::Pnpm | PackageManager::Bun => {
                Ecosystem::Node
            }
            PackageManager::Pip
            | PackageManager::Poetry
            | PackageManager::Uv
            | PackageManager::Pipenv
            | PackageManager::Pdm => Ecosystem::Python,
            PackageManager::Bundler => Ecosystem::Ruby,
        }
    }

    /// Returns the command-line name of the package manager
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Go => "go",
            PackageManager::Maven => "mvn",
            PackageManager::Gradle => "gradle",
            PackageManager::Sbt => "sbt",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
            PackageManager::Pip => "pip",
            PackageManager::Poetry => "poetry",
            PackageManager::Uv => "uv",
            PackageManager::Pipenv => "pipenv",
            PackageManager::Pdm => "pdm",
            PackageManager::Bundler => "bundle",
        }
    }

    /// The package manager assumed when an ecosystem shows no specific signal
    pub fn default_for(ecosystem: Ecosystem) -> Self {
        match ecosystem {
            Ecosystem::Go => PackageManager::Go,
            Ecosystem::Maven => PackageManager::Maven,
            Ecosystem::Gradle => PackageManager::Gradle,
            Ecosystem::Sbt => PackageManager::Sbt,
            Ecosystem::Node => PackageManager::Npm,
            Ecosystem::Python => PackageManager::Pip,
            Ecosystem::Ruby => PackageManager::Bundler,
        }
    }

    /// Parses the name portion of a `packageManager` field (`pnpm@8.15.0`)
    pub fn from_node_field(value: &str) -> Option<Self> {
        let name = value.split('@').next().unwrap_or("").trim();
        match name {
            "npm" => Some(PackageManager::Npm),
            "yarn" => Some(PackageManager::Yarn),
            "pnpm" => Some(PackageManager::Pnpm),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Ecosystem::Go.display_name(), "Go");
        assert_eq!(Ecosystem::Sbt.display_name(), "SBT");
        assert_eq!(format!("{}", Ecosystem::Node), "Node.js");
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("golang".parse::<Ecosystem>().unwrap(), Ecosystem::Go);
        assert_eq!("NPM".parse::<Ecosystem>().unwrap(), Ecosystem::Node);
        assert_eq!("bundler".parse::<Ecosystem>().unwrap(), Ecosystem::Ruby);
        assert!("cobol".parse::<Ecosystem>().is_err());
    }

    #[test]
    fn test_jvm_family() {
        assert!(Ecosystem::Maven.is_jvm());
        assert!(Ecosystem::Sbt.is_jvm());
        assert!(!Ecosystem::Go.is_jvm());
    }

    #[test]
    fn test_package_manager_ecosystem() {
        assert_eq!(PackageManager::Yarn.ecosystem(), Ecosystem::Node);
        assert_eq!(PackageManager::Uv.ecosystem(), Ecosystem::Python);
        assert_eq!(PackageManager::Bundler.command(), "bundle");
    }

    #[test]
    fn test_package_manager_field() {
        assert_eq!(
            PackageManager::from_node_field("pnpm@8.15.0"),
            Some(PackageManager::Pnpm)
        );
        assert_eq!(
            PackageManager::from_node_field("yarn@4.0.2+sha224.abc"),
            Some(PackageManager::Yarn)
        );
        assert_eq!(PackageManager::from_node_field("deno@1"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Ecosystem::Python).unwrap(), "\"python\"");
        assert_eq!(serde_json::to_string(&PackageManager::Npm).unwrap(), "\"npm\"");
        let eco: Ecosystem = serde_json::from_str("\"gradle\"").unwrap();
        assert_eq!(eco, Ecosystem::Gradle);
    }
}
