//! pnpm-lock.yaml parser
//!
//! Reads the `packages:` (and v9 `snapshots:`) sections line by line. Package
//! keys come in three generations:
//! - v5: `/express/4.18.2:`
//! - v6: `/express@4.18.2:` or `/react-dom@18.2.0(react@18.2.0):`
//! - v9: `express@4.18.2:`

use crate::domain::{DeclaredDependency, Ecosystem, ManifestFormat, ManifestMetadata, Scope};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use std::collections::BTreeMap;

/// Parser for pnpm-lock.yaml files
pub struct PnpmLockParser;

#[derive(Debug)]
struct PnpmPackage {
    name: String,
    version: String,
    scope: Scope,
    requires: Vec<String>,
    line: usize,
}

/// Splits a package key into (name, version)
fn split_key(key: &str) -> Option<(String, String)> {
    let key = key.trim().trim_matches(['\'', '"']).trim_start_matches('/');
    // peer suffixes: (react@18.2.0) in v6+, _react@18.2.0 in v5
    let key = key.split('(').next().unwrap_or(key);

    // v5: name/version[_peers], @scope/name/version[_peers]
    let parts = if key.starts_with('@') { 3 } else { 2 };
    let segments: Vec<&str> = key.splitn(parts, '/').collect();
    if segments.len() == parts {
        let version = segments[parts - 1];
        if version.starts_with(|c: char| c.is_ascii_digit()) {
            let name = segments[..parts - 1].join("/");
            let version = version.split('_').next().unwrap_or(version);
            return Some((name, version.to_string()));
        }
    }

    let idx = key.get(1..)?.find('@')?;
    let name = &key[..idx + 1];
    let version = &key[idx + 2..];
    (!version.is_empty()).then(|| (name.to_string(), version.to_string()))
}

fn read_packages(content: &str) -> Result<(Vec<PnpmPackage>, BTreeMap<String, String>), ManifestError> {
    let mut packages: Vec<PnpmPackage> = Vec::new();
    let mut facts = BTreeMap::new();
    let mut section = String::new();
    let mut in_dependencies = false;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if line.contains('\t') {
            return Err(ManifestError::line_error(
                "pnpm-lock.yaml",
                idx + 1,
                "tab characters are not allowed in YAML indentation",
            ));
        }

        let indent = line.len() - line.trim_start().len();
        let text = line.trim();

        if indent == 0 {
            let Some((key, value)) = text.split_once(':') else {
                return Err(ManifestError::line_error(
                    "pnpm-lock.yaml",
                    idx + 1,
                    "expected a top-level key",
                ));
            };
            section = key.to_string();
            if key == "lockfileVersion" {
                facts.insert(
                    "lockfileVersion".to_string(),
                    value.trim().trim_matches(['\'', '"']).to_string(),
                );
            }
            continue;
        }

        if section != "packages" && section != "snapshots" {
            continue;
        }

        if indent == 2 {
            in_dependencies = false;
            let key = text.strip_suffix(':').or_else(|| text.strip_suffix(": {}"));
            let Some((name, version)) = key.and_then(split_key) else {
                return Err(ManifestError::line_error(
                    "pnpm-lock.yaml",
                    idx + 1,
                    format!("unrecognised package key '{}'", text),
                ));
            };
            if !packages.iter().any(|p| p.name == name && p.version == version) {
                packages.push(PnpmPackage {
                    name,
                    version,
                    scope: Scope::Compile,
                    requires: Vec::new(),
                    line: idx + 1,
                });
            }
            continue;
        }

        let Some(package) = packages.last_mut() else {
            continue;
        };
        if indent == 4 {
            in_dependencies = matches!(text, "dependencies:" | "optionalDependencies:");
            match text {
                "dev: true" => package.scope = Scope::Dev,
                "optional: true" if package.scope == Scope::Compile => {
                    package.scope = Scope::Optional
                }
                _ => {}
            }
        } else if indent >= 6 && in_dependencies {
            if let Some((name, _)) = text.split_once(':') {
                let name = name.trim().trim_matches(['\'', '"']).to_string();
                if !package.requires.contains(&name) {
                    package.requires.push(name);
                }
            }
        }
    }

    Ok((packages, facts))
}

impl ManifestParser for PnpmLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PnpmLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let (packages, _) = read_packages(content)?;
        let mut dependencies: Vec<DeclaredDependency> = Vec::new();
        for package in packages {
            if dependencies.iter().any(|d| d.coordinate == package.name) {
                continue;
            }
            let mut entry = DeclaredDependency::locked(&package.name, Ecosystem::Node, package.version)
                .at_line(package.line);
            entry.scope = package.scope;
            dependencies.push(entry);
        }
        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok((packages, facts)) = read_packages(content) else {
            return meta;
        };
        meta.facts = facts;

        let mut versions: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for package in &packages {
            versions
                .entry(package.name.as_str())
                .or_default()
                .push(package.version.as_str());
            if !package.requires.is_empty() {
                let requires = meta
                    .facts
                    .entry(format!("requires:{}", package.name))
                    .or_default();
                for name in &package.requires {
                    if !requires.split(',').any(|r| r == name) {
                        if !requires.is_empty() {
                            requires.push(',');
                        }
                        requires.push_str(name);
                    }
                }
            }
        }
        for (name, installed) in versions {
            if installed.len() > 1 {
                meta.facts
                    .insert(format!("duplicate:{}", name), installed.join(","));
            }
        }
        meta
    }
}
