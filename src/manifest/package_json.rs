//! package.json parser for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies
//! - overrides / resolutions / pnpm.overrides (recorded as replacements)
//! - packageManager, engines and workspaces (metadata)

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
    VersionSpec, VersionSpecKind,
};
use crate::error::ManifestError;
use crate::manifest::{parse_json, ManifestParser};
use crate::parser::parse_declared;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parser for package.json files
pub struct PackageJsonParser;

/// Dependency sections in the order npm resolves them
const SECTIONS: [(&str, Scope); 4] = [
    ("dependencies", Scope::Compile),
    ("devDependencies", Scope::Dev),
    ("peerDependencies", Scope::Peer),
    ("optionalDependencies", Scope::Optional),
];

/// Classifies where a package.json specifier fetches from
pub(crate) fn node_origin(specifier: &str) -> DependencyOrigin {
    let spec = specifier.trim();
    if spec.starts_with("git+")
        || spec.starts_with("git:")
        || spec.starts_with("git@")
        || spec.starts_with("github:")
        || spec.starts_with("gitlab:")
        || spec.starts_with("bitbucket:")
        || spec.ends_with(".git")
    {
        return DependencyOrigin::Git;
    }
    if spec.starts_with("file:")
        || spec.starts_with("link:")
        || spec.starts_with("portal:")
        || spec.starts_with("workspace:")
        || spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with('/')
    {
        return DependencyOrigin::Path;
    }
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return DependencyOrigin::Url;
    }
    // GitHub shorthand: user/repo or user/repo#ref
    if !spec.starts_with('@') && !spec.starts_with("npm:") && spec.contains('/') && !spec.contains(' ')
    {
        return DependencyOrigin::Git;
    }
    DependencyOrigin::Registry
}

fn node_spec(specifier: &str, origin: DependencyOrigin) -> VersionSpec {
    match origin {
        DependencyOrigin::Registry => parse_declared(Ecosystem::Node, Some(specifier)),
        DependencyOrigin::Path if specifier.starts_with("workspace:") => {
            parse_declared(Ecosystem::Node, Some(specifier))
        }
        _ => {
            // git refs and tarballs resolve at install time: #v1.2.3 is a hint only
            let hint = specifier
                .rsplit_once("#semver:")
                .or_else(|| specifier.rsplit_once('#'))
                .map(|(_, r)| r.trim_start_matches('v'))
                .filter(|r| r.starts_with(|c: char| c.is_ascii_digit()))
                .unwrap_or("");
            VersionSpec::new(VersionSpecKind::Dynamic, specifier, hint)
        }
    }
}

/// Extracts the package name from an override key
///
/// Keys may be yarn path globs (`**/lodash`, `webpack/@types/node`) or carry
/// an npm version selector (`lodash@^4`).
fn override_target(key: &str) -> &str {
    let segments: Vec<&str> = key.split('/').collect();
    let start = match segments.len() {
        n if n >= 2 && segments[n - 2].starts_with('@') => {
            key.len() - segments[n - 2].len() - segments[n - 1].len() - 1
        }
        n => key.len() - segments[n - 1].len(),
    };
    let name = &key[start..];
    match name.rfind('@') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Flattens npm `overrides` (possibly nested) and yarn `resolutions` into name -> version
fn collect_overrides(value: &Value, prefix: Option<&str>, out: &mut BTreeMap<String, String>) {
    let Some(map) = value.as_object() else {
        return;
    };
    for (key, entry) in map {
        let name = override_target(key);
        match entry {
            Value::String(version) if key == "." => {
                if let Some(parent) = prefix {
                    out.insert(parent.to_string(), version.clone());
                }
            }
            Value::String(version) => {
                out.insert(name.to_string(), version.clone());
            }
            Value::Object(_) => collect_overrides(entry, Some(name), out),
            _ => {}
        }
    }
}

fn overrides_of(json: &Value) -> BTreeMap<String, String> {
    let mut overrides = BTreeMap::new();
    for key in ["overrides", "resolutions"] {
        if let Some(value) = json.get(key) {
            collect_overrides(value, None, &mut overrides);
        }
    }
    if let Some(value) = json.get("pnpm").and_then(|p| p.get("overrides")) {
        collect_overrides(value, None, &mut overrides);
    }
    overrides
}

fn parse_dependency_object(
    deps: &Map<String, Value>,
    section: &str,
    scope: Scope,
    overrides: &BTreeMap<String, String>,
    output: &mut Vec<DeclaredDependency>,
) {
    for (name, version_value) in deps {
        let Some(specifier) = version_value.as_str() else {
            continue;
        };
        let origin = node_origin(specifier);
        let mut dep = DeclaredDependency::new(name.clone(), Ecosystem::Node, scope)
            .with_version(node_spec(specifier, origin))
            .with_group(section)
            .with_origin(origin);
        if let Some(replacement) = overrides.get(name) {
            dep = dep.with_replacement(replacement.clone());
        }
        output.push(dep);
    }
}

impl ManifestParser for PackageJsonParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PackageJson
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let json = parse_json(content, "package.json")?;
        if !json.is_object() {
            return Err(ManifestError::json_parse_error(
                "package.json",
                "top-level value is not an object",
            ));
        }

        let overrides = overrides_of(&json);
        let mut dependencies = Vec::new();

        for (section, scope) in SECTIONS {
            if let Some(deps) = json.get(section).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, section, scope, &overrides, &mut dependencies);
            }
        }

        // A peer that is also optional (peerDependenciesMeta) is not required at runtime
        if let Some(meta) = json.get("peerDependenciesMeta").and_then(|v| v.as_object()) {
            for dep in dependencies.iter_mut().filter(|d| d.scope == Scope::Peer) {
                let optional = meta
                    .get(&dep.coordinate)
                    .and_then(|m| m.get("optional"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if optional {
                    dep.scope = Scope::Optional;
                }
            }
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(json) = parse_json(content, "package.json") else {
            return meta;
        };

        for key in ["name", "version", "packageManager", "type"] {
            if let Some(value) = json.get(key).and_then(Value::as_str) {
                meta.facts.insert(key.to_string(), value.to_string());
            }
        }
        if let Some(engines) = json.get("engines").and_then(Value::as_object) {
            for (engine, range) in engines {
                if let Some(range) = range.as_str() {
                    meta.facts
                        .insert(format!("engines.{}", engine), range.to_string());
                }
            }
        }
        for (name, version) in overrides_of(&json) {
            meta.facts.insert(format!("override:{}", name), version);
        }

        // workspaces: ["packages/*"] or { packages: [...] }
        let workspaces = json.get("workspaces").and_then(|w| {
            w.as_array()
                .or_else(|| w.get("packages").and_then(Value::as_array))
        });
        if let Some(workspaces) = workspaces {
            meta.includes.extend(
                workspaces
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string),
            );
        }

        meta
    }
}
