//! package-lock.json / npm-shrinkwrap.json parser
//!
//! Handles lockfileVersion 1 (nested `dependencies`) and 2/3 (flat
//! `packages` keyed by `node_modules/...` paths). Each package name yields one
//! locked entry: the shallowest install path wins, other installed versions
//! are reported through `duplicate:<name>` facts.

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::{parse_json, ManifestParser};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parser for package-lock.json files
pub struct PackageLockParser;

/// One installed package
struct LockedPackage {
    name: String,
    version: String,
    depth: usize,
    scope: Scope,
    origin: DependencyOrigin,
    requires: Vec<String>,
}

fn scope_of(entry: &Value) -> Scope {
    let flag = |key: &str| entry.get(key).and_then(Value::as_bool).unwrap_or(false);
    if flag("dev") || flag("devOptional") {
        Scope::Dev
    } else if flag("optional") {
        Scope::Optional
    } else if flag("peer") {
        Scope::Peer
    } else {
        Scope::Compile
    }
}

fn origin_of(entry: &Value) -> DependencyOrigin {
    let resolved = entry.get("resolved").and_then(Value::as_str).unwrap_or("");
    if resolved.starts_with("git") {
        DependencyOrigin::Git
    } else if resolved.starts_with("file:") {
        DependencyOrigin::Path
    } else {
        DependencyOrigin::Registry
    }
}

fn object_keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

/// lockfileVersion 2/3: `packages` map keyed by install path
fn read_packages(packages: &Map<String, Value>, out: &mut Vec<LockedPackage>) {
    for (path, entry) in packages {
        if path.is_empty() || !path.contains("node_modules/") {
            // root project and workspace sources
            continue;
        }
        if entry.get("link").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let Some(version) = entry.get("version").and_then(Value::as_str) else {
            continue;
        };
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                path.rsplit_once("node_modules/")
                    .map(|(_, n)| n.to_string())
                    .unwrap_or_else(|| path.clone())
            });
        let mut requires = object_keys(entry.get("dependencies"));
        requires.extend(object_keys(entry.get("optionalDependencies")));
        out.push(LockedPackage {
            name,
            version: version.to_string(),
            depth: path.matches("node_modules/").count(),
            scope: scope_of(entry),
            origin: origin_of(entry),
            requires,
        });
    }
}

/// lockfileVersion 1: recursive `dependencies` map
fn read_dependencies(deps: &Map<String, Value>, depth: usize, out: &mut Vec<LockedPackage>) {
    for (name, entry) in deps {
        if let Some(version) = entry.get("version").and_then(Value::as_str) {
            out.push(LockedPackage {
                name: name.clone(),
                version: version.to_string(),
                depth,
                scope: scope_of(entry),
                origin: origin_of(entry),
                requires: object_keys(entry.get("requires")),
            });
        }
        if let Some(nested) = entry.get("dependencies").and_then(Value::as_object) {
            read_dependencies(nested, depth + 1, out);
        }
    }
}

impl PackageLockParser {
    fn read(&self, content: &str) -> Result<(Vec<LockedPackage>, Value), ManifestError> {
        let json = parse_json(content, "package-lock.json")?;
        let mut packages = Vec::new();

        if let Some(map) = json.get("packages").and_then(Value::as_object) {
            read_packages(map, &mut packages);
        } else if let Some(map) = json.get("dependencies").and_then(Value::as_object) {
            read_dependencies(map, 1, &mut packages);
        } else if !json.is_object() {
            return Err(ManifestError::json_parse_error(
                "package-lock.json",
                "top-level value is not an object",
            ));
        }

        // shallowest first, so the hoisted copy is kept
        packages.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.name.cmp(&b.name)));
        Ok((packages, json))
    }
}

impl ManifestParser for PackageLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PackageLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let (packages, _) = self.read(content)?;
        let mut entries: Vec<DeclaredDependency> = Vec::new();

        for package in packages {
            if entries.iter().any(|e| e.coordinate == package.name) {
                continue;
            }
            let mut entry = DeclaredDependency::locked(&package.name, Ecosystem::Node, package.version)
                .with_origin(package.origin);
            entry.scope = package.scope;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok((packages, json)) = self.read(content) else {
            return meta;
        };

        if let Some(version) = json.get("lockfileVersion").and_then(Value::as_u64) {
            meta.facts
                .insert("lockfileVersion".to_string(), version.to_string());
        }

        let mut versions: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for package in &packages {
            let seen = versions.entry(package.name.as_str()).or_default();
            if !seen.contains(&package.version.as_str()) {
                seen.push(package.version.as_str());
            }
            if !package.requires.is_empty() {
                meta.facts
                    .entry(format!("requires:{}", package.name))
                    .or_insert_with(|| package.requires.join(","));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeclarationSource;

    const LOCK_V3: &str = r#"{
  "name": "shop",
  "lockfileVersion": 3,
  "requires": true,
  "packages": {
    "": { "name": "shop", "dependencies": { "express": "^4.18.2" }, "devDependencies": { "jest": "^29.0.0" } },
    "node_modules/express": {
      "version": "4.18.2",
      "resolved": "https://registry.npmjs.org/express/-/express-4.18.2.tgz",
      "dependencies": { "debug": "2.6.9", "qs": "6.11.0" }
    },
    "node_modules/debug": { "version": "4.3.4" },
    "node_modules/express/node_modules/debug": { "version": "2.6.9" },
    "node_modules/jest": { "version": "29.7.0", "dev": true },
    "node_modules/fsevents": { "version": "2.3.3", "optional": true },
    "node_modules/@babel/core": { "version": "7.23.2", "dev": true },
    "node_modules/shared": { "resolved": "packages/shared", "link": true },
    "packages/shared": { "name": "shared", "version": "1.0.0" }
  }
}"#;

    const LOCK_V1: &str = r#"{
  "name": "legacy",
  "lockfileVersion": 1,
  "dependencies": {
    "lodash": { "version": "4.17.21" },
    "mocha": {
      "version": "10.2.0",
      "dev": true,
      "requires": { "ms": "2.1.3" },
      "dependencies": { "ms": { "version": "2.1.3", "dev": true } }
    }
  }
}"#;

    fn find<'a>(deps: &'a [DeclaredDependency], name: &str) -> &'a DeclaredDependency {
        deps.iter().find(|d| d.coordinate == name).unwrap()
    }

    #[test]
    fn test_parse_v3_packages() {
        let deps = PackageLockParser.parse(LOCK_V3).unwrap();
        assert_eq!(deps.len(), 5);

        let express = find(&deps, "express");
        assert_eq!(express.resolved_version.as_deref(), Some("4.18.2"));
        assert_eq!(express.source, DeclarationSource::Lockfile);
        assert!(!express.is_direct);

        assert_eq!(find(&deps, "debug").resolved_version.as_deref(), Some("4.3.4"));
        assert_eq!(find(&deps, "jest").scope, Scope::Dev);
        assert_eq!(find(&deps, "fsevents").scope, Scope::Optional);
        assert_eq!(find(&deps, "@babel/core").scope, Scope::Dev);
        assert!(!deps.iter().any(|d| d.coordinate == "shared"));
    }

    #[test]
    fn test_metadata_v3() {
        let meta = PackageLockParser.metadata(LOCK_V3);
        assert_eq!(meta.fact("lockfileVersion"), Some("3"));
        assert_eq!(meta.fact("duplicate:debug"), Some("4.3.4,2.6.9"));
        assert_eq!(meta.fact("requires:express"), Some("debug,qs"));
    }

    #[test]
    fn test_parse_v1_dependencies() {
        let deps = PackageLockParser.parse(LOCK_V1).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(find(&deps, "lodash").resolved_version.as_deref(), Some("4.17.21"));
        assert_eq!(find(&deps, "mocha").scope, Scope::Dev);
        assert_eq!(find(&deps, "ms").resolved_version.as_deref(), Some("2.1.3"));

        let meta = PackageLockParser.metadata(LOCK_V1);
        assert_eq!(meta.fact("requires:mocha"), Some("ms"));
    }

    #[test]
    fn test_parse_invalid() {
        let err = PackageLockParser.parse("{ \"packages\": ").unwrap_err();
        assert!(err.to_string().contains("failed to parse JSON"));
    }
}
