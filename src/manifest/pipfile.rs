//! Pipfile and Pipfile.lock parsers (pipenv)

use crate::domain::{
    DeclarationSource, DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat,
    ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::requirements::normalize_name;
use crate::manifest::{parse_json, parse_toml, ManifestParser};
use crate::parser::parse_declared;

/// Parser for Pipfile
pub struct PipfileParser;

/// Parser for Pipfile.lock
pub struct PipfileLockParser;

const PIPFILE_SECTIONS: [(&str, Scope); 2] =
    [("packages", Scope::Compile), ("dev-packages", Scope::Dev)];

fn pipfile_entry(name: &str, value: &toml::Value, scope: Scope, section: &str) -> DeclaredDependency {
    let mut origin = DependencyOrigin::Registry;
    let version = match value {
        toml::Value::String(s) => Some(s.as_str()),
        toml::Value::Table(t) => {
            if t.contains_key("git") {
                origin = DependencyOrigin::Git;
            } else if t.contains_key("path") || t.contains_key("file") {
                origin = DependencyOrigin::Path;
            }
            t.get("version").and_then(toml::Value::as_str)
        }
        _ => None,
    };
    DeclaredDependency::new(normalize_name(name), Ecosystem::Python, scope)
        .with_version(parse_declared(Ecosystem::Python, version))
        .with_group(section)
        .with_origin(origin)
}

impl ManifestParser for PipfileParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Pipfile
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let doc = parse_toml(content, "Pipfile")?;
        let mut dependencies = Vec::new();

        for (section, scope) in PIPFILE_SECTIONS {
            let Some(table) = doc.get(section).and_then(toml::Value::as_table) else {
                continue;
            };
            for (name, value) in table {
                dependencies.push(pipfile_entry(name, value, scope, section));
            }
        }
        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(doc) = parse_toml(content, "Pipfile") else {
            return meta;
        };
        if let Some(requires) = doc.get("requires").and_then(toml::Value::as_table) {
            for key in ["python_version", "python_full_version"] {
                if let Some(v) = requires.get(key).and_then(toml::Value::as_str) {
                    meta.facts.insert(key.to_string(), v.to_string());
                }
            }
        }
        if let Some(sources) = doc.get("source").and_then(toml::Value::as_array) {
            let urls: Vec<&str> = sources
                .iter()
                .filter_map(|s| s.get("url").and_then(toml::Value::as_str))
                .collect();
            if !urls.is_empty() {
                meta.facts.insert("sources".to_string(), urls.join(","));
            }
        }
        meta
    }
}

impl ManifestParser for PipfileLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PipfileLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let json = parse_json(content, "Pipfile.lock")?;
        if !json.is_object() {
            return Err(ManifestError::json_parse_error(
                "Pipfile.lock",
                "top-level value is not an object",
            ));
        }
        let mut dependencies: Vec<DeclaredDependency> = Vec::new();

        for (section, scope) in [("default", Scope::Compile), ("develop", Scope::Dev)] {
            let Some(packages) = json.get(section).and_then(serde_json::Value::as_object) else {
                continue;
            };
            for (name, entry) in packages {
                let name = normalize_name(name);
                if dependencies.iter().any(|d| d.coordinate == name) {
                    continue;
                }
                let version = entry
                    .get("version")
                    .and_then(serde_json::Value::as_str)
                    .map(|v| v.trim_start_matches("==").to_string());
                let origin = if entry.get("git").is_some() {
                    DependencyOrigin::Git
                } else if entry.get("path").is_some() || entry.get("file").is_some() {
                    DependencyOrigin::Path
                } else {
                    DependencyOrigin::Registry
                };
                let mut locked = match version {
                    Some(v) => DeclaredDependency::locked(name, Ecosystem::Python, v),
                    // VCS and path entries carry a ref instead of a version
                    None => {
                        let mut d = DeclaredDependency::new(name, Ecosystem::Python, scope);
                        d.is_direct = false;
                        d.source = DeclarationSource::Lockfile;
                        d
                    }
                }
                .with_origin(origin)
                .with_group(section);
                locked.scope = scope;
                dependencies.push(locked);
            }
        }
        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(json) = parse_json(content, "Pipfile.lock") else {
            return meta;
        };
        let requires = json.pointer("/_meta/requires");
        if let Some(v) = requires
            .and_then(|r| r.get("python_version"))
            .and_then(serde_json::Value::as_str)
        {
            meta.facts.insert("python_version".to_string(), v.to_string());
        }
        if let Some(hash) = json
            .pointer("/_meta/hash/sha256")
            .and_then(serde_json::Value::as_str)
        {
            meta.facts.insert("pipfile-hash".to_string(), hash.to_string());
        }
        meta
    }
}
