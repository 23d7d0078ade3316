//! Evidence collection per ecosystem
//!
//! Each located file can count for an ecosystem at one of three tiers: lock
//! files, declarative config files, and loose declaration or wrapper files.
//! Source files add a single low-weight entry. A file name counts once per
//! ecosystem (the shallowest occurrence), so a monorepo with fifty
//! `package.json` files scores like a single package.

use crate::domain::{Ecosystem, Evidence, EvidenceTier, ManifestFormat};
use crate::locator::{FileKind, LocatedFile, LocatedFiles};
use crate::manifest::get_parser;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

// distributionUrl=https\://services.gradle.org/distributions/gradle-8.5-bin.zip
static GRADLE_WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gradle-(\d+(?:\.\d+)*(?:-[\w.]+)?)-(?:bin|all)\.zip").unwrap());

/// Everything collected for one ecosystem
#[derive(Debug, Clone, Default)]
pub(crate) struct Signals {
    pub evidence: Vec<Evidence>,
    /// File names that produced evidence
    pub file_names: BTreeSet<String>,
    /// Metadata facts from the shallowest config manifests
    pub facts: BTreeMap<String, String>,
    pub runtime_version: Option<String>,
}

impl Signals {
    pub fn score(&self) -> u32 {
        self.evidence.iter().map(|e| e.tier.points()).sum()
    }

    pub fn has(&self, name: &str) -> bool {
        self.file_names.contains(name)
    }

    pub fn has_non_source(&self) -> bool {
        self.evidence.iter().any(|e| e.tier != EvidenceTier::Source)
    }

    fn push(&mut self, file: &LocatedFile, tier: EvidenceTier, detail: impl Into<String>) -> bool {
        if !self.file_names.insert(file.file_name().to_string()) {
            return false;
        }
        self.evidence
            .push(Evidence::new(tier, file.relative.clone(), detail));
        true
    }

    fn set_runtime(&mut self, version: Option<String>) {
        if self.runtime_version.is_none() {
            self.runtime_version = version.filter(|v| !v.is_empty());
        }
    }
}

/// Tier and description for a manifest format
fn manifest_rule(format: ManifestFormat) -> (EvidenceTier, &'static str) {
    use EvidenceTier::{Config, Lock, Loose};
    match format {
        ManifestFormat::GoSum => (Lock, "module checksums"),
        ManifestFormat::GoMod => (Config, "module file"),
        ManifestFormat::GoWork => (Config, "workspace file"),
        ManifestFormat::Pom => (Config, "project object model"),
        ManifestFormat::Gradle => (Config, "build script"),
        ManifestFormat::GradleSettings => (Config, "settings script"),
        ManifestFormat::VersionCatalog => (Lock, "version catalog"),
        ManifestFormat::Sbt => (Config, "build definition"),
        ManifestFormat::SbtBuildProperties => (Config, "sbt version pin"),
        ManifestFormat::SbtPlugins => (Loose, "plugin definitions"),
        ManifestFormat::PackageJson => (Config, "package manifest"),
        ManifestFormat::PackageLock => (Lock, "npm lock file"),
        ManifestFormat::YarnLock => (Lock, "yarn lock file"),
        ManifestFormat::PnpmLock => (Lock, "pnpm lock file"),
        ManifestFormat::Pyproject => (Config, "project metadata"),
        ManifestFormat::Pipfile => (Config, "pipenv manifest"),
        ManifestFormat::Requirements => (Loose, "requirements file"),
        ManifestFormat::PipfileLock => (Lock, "pipenv lock file"),
        ManifestFormat::PoetryLock => (Lock, "poetry lock file"),
        ManifestFormat::UvLock => (Lock, "uv lock file"),
        ManifestFormat::Gemfile => (Config, "Gemfile"),
        ManifestFormat::GemfileLock => (Lock, "bundler lock file"),
    }
}

/// Ecosystem, tier and description for a marker file
fn marker_rule(name: &str) -> Option<(Ecosystem, EvidenceTier, &'static str)> {
    use EvidenceTier::{Config, Lock, Loose};
    let rule = match name {
        "mvnw" | "mvnw.cmd" => (Ecosystem::Maven, Loose, "Maven wrapper"),
        "gradlew" | "gradlew.bat" => (Ecosystem::Gradle, Loose, "Gradle wrapper"),
        "gradle-wrapper.properties" => (Ecosystem::Gradle, Loose, "Gradle wrapper version"),
        "gradle.properties" => (Ecosystem::Gradle, Loose, "Gradle properties"),
        "gradle.lockfile" => (Ecosystem::Gradle, Lock, "dependency lock state"),
        "bun.lockb" | "bun.lock" => (Ecosystem::Node, Lock, "bun lock file"),
        "pnpm-workspace.yaml" => (Ecosystem::Node, Config, "pnpm workspace"),
        ".nvmrc" | ".node-version" => (Ecosystem::Node, Loose, "Node.js version file"),
        ".npmrc" | ".yarnrc" | ".yarnrc.yml" => (Ecosystem::Node, Loose, "package manager settings"),
        "lerna.json" => (Ecosystem::Node, Loose, "lerna monorepo"),
        "tsconfig.json" => (Ecosystem::Node, Loose, "TypeScript config"),
        "pdm.lock" => (Ecosystem::Python, Lock, "pdm lock file"),
        "setup.py" | "setup.cfg" => (Ecosystem::Python, Loose, "setuptools config"),
        "tox.ini" => (Ecosystem::Python, Loose, "tox config"),
        ".python-version" => (Ecosystem::Python, Loose, "Python version file"),
        ".ruby-version" => (Ecosystem::Ruby, Loose, "Ruby version file"),
        "Rakefile" | "config.ru" => (Ecosystem::Ruby, Loose, "Ruby build file"),
        "go.work.sum" => (Ecosystem::Go, Loose, "workspace checksums"),
        n if n.ends_with(".gemspec") => (Ecosystem::Ruby, Loose, "gem specification"),
        _ => return None,
    };
    Some(rule)
}

/// Maps an asdf/mise `.tool-versions` tool name to an ecosystem
fn tool_versions_ecosystem(tool: &str) -> Option<Ecosystem> {
    match tool {
        "golang" | "go" => Some(Ecosystem::Go),
        "nodejs" | "node" => Some(Ecosystem::Node),
        "python" => Some(Ecosystem::Python),
        "ruby" => Some(Ecosystem::Ruby),
        "maven" => Some(Ecosystem::Maven),
        "gradle" => Some(Ecosystem::Gradle),
        "sbt" | "scala" => Some(Ecosystem::Sbt),
        _ => None,
    }
}

/// Formats whose metadata feeds package-manager choice and runtime versions
fn reads_metadata(format: ManifestFormat) -> bool {
    matches!(
        format,
        ManifestFormat::GoMod
            | ManifestFormat::Pom
            | ManifestFormat::SbtBuildProperties
            | ManifestFormat::PackageJson
            | ManifestFormat::Pyproject
            | ManifestFormat::Pipfile
            | ManifestFormat::Gemfile
    )
}

fn read_trimmed(file: &LocatedFile) -> Option<String> {
    let content = std::fs::read_to_string(&file.path).ok()?;
    content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.trim_start_matches('v').to_string())
}

/// Files ordered shallowest first, then by path
fn by_depth(located: &LocatedFiles) -> Vec<&LocatedFile> {
    let mut files: Vec<&LocatedFile> = located.files.iter().collect();
    files.sort_by(|a, b| {
        a.relative
            .components()
            .count()
            .cmp(&b.relative.components().count())
            .then_with(|| a.relative.cmp(&b.relative))
    });
    files
}

/// Collects evidence for every ecosystem that shows at least one signal
pub(crate) fn collect(located: &LocatedFiles) -> BTreeMap<Ecosystem, Signals> {
    let mut signals: BTreeMap<Ecosystem, Signals> = BTreeMap::new();
    let files = by_depth(located);

    for file in &files {
        match file.kind {
            FileKind::Manifest(format) => {
                let entry = signals.entry(format.ecosystem()).or_default();
                let (tier, detail) = manifest_rule(format);
                if entry.push(file, tier, detail) && reads_metadata(format) {
                    if let Ok(content) = std::fs::read_to_string(&file.path) {
                        let meta = get_parser(format).metadata(&content);
                        for (key, value) in meta.facts {
                            entry.facts.entry(key).or_insert(value);
                        }
                    }
                }
            }
            FileKind::Marker => {
                let name = file.file_name();
                if name == ".tool-versions" {
                    collect_tool_versions(file, &mut signals);
                    continue;
                }
                let Some((ecosystem, tier, detail)) = marker_rule(name) else {
                    continue;
                };
                let entry = signals.entry(ecosystem).or_default();
                if entry.push(file, tier, detail) {
                    match name {
                        ".nvmrc" | ".node-version" => {
                            entry.facts.insert("nvmrc".to_string(), read_trimmed(file).unwrap_or_default());
                        }
                        ".python-version" | ".ruby-version" => {
                            entry.facts.insert("version-file".to_string(), read_trimmed(file).unwrap_or_default());
                        }
                        "gradle-wrapper.properties" => {
                            if let Some(version) = std::fs::read_to_string(&file.path)
                                .ok()
                                .and_then(|c| GRADLE_WRAPPER_RE.captures(&c).map(|caps| caps[1].to_string()))
                            {
                                entry.facts.insert("gradle.wrapper".to_string(), version);
                            }
                        }
                        _ => {}
                    }
                }
            }
            FileKind::Source => {}
        }
    }

    add_fact_evidence(&mut signals);
    add_source_evidence(located, &mut signals);
    for (ecosystem, entry) in signals.iter_mut() {
        let version = runtime_version(*ecosystem, &entry.facts);
        entry.set_runtime(version);
    }
    signals.retain(|_, s| !s.evidence.is_empty());

    debug!(
        ecosystems = ?signals.keys().collect::<Vec<_>>(),
        "collected detection evidence"
    );
    signals
}

fn collect_tool_versions(file: &LocatedFile, signals: &mut BTreeMap<Ecosystem, Signals>) {
    let Ok(content) = std::fs::read_to_string(&file.path) else {
        return;
    };
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(tool), Some(version)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(ecosystem) = tool_versions_ecosystem(tool) else {
            continue;
        };
        let entry = signals.entry(ecosystem).or_default();
        if !entry.file_names.contains(".tool-versions") {
            entry.file_names.insert(".tool-versions".to_string());
            entry.evidence.push(Evidence::new(
                EvidenceTier::Loose,
                file.relative.clone(),
                format!("{} {} in .tool-versions", tool, version),
            ));
            entry
                .facts
                .entry("tool-versions".to_string())
                .or_insert_with(|| version.to_string());
        }
    }
}

/// Declarative signals found inside already-counted files
fn add_fact_evidence(signals: &mut BTreeMap<Ecosystem, Signals>) {
    for (ecosystem, entry) in signals.iter_mut() {
        let found: Option<(String, String)> = match ecosystem {
            Ecosystem::Node => entry
                .facts
                .get("packageManager")
                .map(|v| ("package.json".to_string(), format!("packageManager field ({})", v))),
            Ecosystem::Python => ["poetry", "uv", "pdm", "hatch"]
                .iter()
                .find(|tool| entry.facts.contains_key(&format!("tool:{}", tool)))
                .map(|tool| ("pyproject.toml".to_string(), format!("[tool.{}] section", tool))),
            Ecosystem::Maven => entry
                .facts
                .get("java")
                .map(|v| ("pom.xml".to_string(), format!("Java release {} pinned", v))),
            _ => None,
        };
        if let Some((path, detail)) = found {
            let path = entry
                .evidence
                .iter()
                .find(|e| e.path.file_name().and_then(|n| n.to_str()) == Some(path.as_str()))
                .map(|e| e.path.clone())
                .unwrap_or_else(|| path.into());
            entry
                .evidence
                .push(Evidence::new(EvidenceTier::Config, path, detail));
        }
    }
}

/// One `Source` entry per ecosystem; JVM sources only back a build tool that has other evidence
fn add_source_evidence(located: &LocatedFiles, signals: &mut BTreeMap<Ecosystem, Signals>) {
    for ecosystem in Ecosystem::all() {
        let count = located.sources_for(*ecosystem).count();
        if count == 0 {
            continue;
        }
        if ecosystem.is_jvm() && !signals.get(ecosystem).is_some_and(Signals::has_non_source) {
            continue;
        }
        let entry = signals.entry(*ecosystem).or_default();
        let noun = if count == 1 { "file" } else { "files" };
        entry.evidence.push(Evidence::new(
            EvidenceTier::Source,
            ".",
            format!("{} source {}", count, noun),
        ));
    }
}

fn runtime_version(ecosystem: Ecosystem, facts: &BTreeMap<String, String>) -> Option<String> {
    let keys: &[&str] = match ecosystem {
        Ecosystem::Go => &["go", "tool-versions"],
        Ecosystem::Maven => &["java", "tool-versions"],
        Ecosystem::Gradle => &["gradle.wrapper", "tool-versions"],
        Ecosystem::Sbt => &["sbt.version", "tool-versions"],
        Ecosystem::Node => &["engines.node", "nvmrc", "tool-versions"],
        Ecosystem::Python => &[
            "requires-python",
            "python",
            "python_version",
            "version-file",
            "tool-versions",
        ],
        Ecosystem::Ruby => &["ruby", "version-file", "tool-versions"],
    };
    // `ruby file: ".ruby-version"` points elsewhere; the version file itself is read as a marker
    keys.iter()
        .filter_map(|k| facts.get(*k))
        .find(|v| !v.is_empty() && !v.starts_with("file:"))
        .cloned()
}
