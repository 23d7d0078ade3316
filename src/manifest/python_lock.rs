//! poetry.lock and uv.lock parsers
//!
//! Both are TOML documents with a `[[package]]` array. Poetry keeps package
//! dependencies as a `[package.dependencies]` table, uv as an array of
//! `{ name = ... }` tables.

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::requirements::normalize_name;
use crate::manifest::{parse_toml, ManifestParser};
use toml::{Table, Value};

/// Parser for poetry.lock
pub struct PoetryLockParser;

/// Parser for uv.lock
pub struct UvLockParser;

struct LockedPackage {
    name: String,
    version: String,
    scope: Scope,
    origin: DependencyOrigin,
    requires: Vec<String>,
}

fn packages_of<'a>(doc: &'a Table, file_name: &str) -> Result<Vec<&'a Table>, ManifestError> {
    let Some(value) = doc.get("package") else {
        return Ok(Vec::new());
    };
    let array = value.as_array().ok_or_else(|| {
        ManifestError::toml_parse_error(file_name, "'package' must be an array of tables")
    })?;
    Ok(array.iter().filter_map(Value::as_table).collect())
}

fn read_poetry(content: &str) -> Result<(Vec<LockedPackage>, Table), ManifestError> {
    let doc = parse_toml(content, "poetry.lock")?;
    let mut packages = Vec::new();

    for package in packages_of(&doc, "poetry.lock")? {
        let (Some(name), Some(version)) = (
            package.get("name").and_then(Value::as_str),
            package.get("version").and_then(Value::as_str),
        ) else {
            return Err(ManifestError::toml_parse_error(
                "poetry.lock",
                "package entry without name or version",
            ));
        };
        // lock format 1.x records the group; 2.x dropped it
        let scope = match package.get("category").and_then(Value::as_str) {
            Some("dev") => Scope::Dev,
            _ if package.get("optional").and_then(Value::as_bool) == Some(true) => Scope::Optional,
            _ => Scope::Compile,
        };
        let origin = match package
            .get("source")
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
        {
            Some("git") => DependencyOrigin::Git,
            Some("directory") | Some("file") => DependencyOrigin::Path,
            Some("url") => DependencyOrigin::Url,
            _ => DependencyOrigin::Registry,
        };
        let requires = package
            .get("dependencies")
            .and_then(Value::as_table)
            .map(|t| t.keys().map(|k| normalize_name(k)).collect())
            .unwrap_or_default();
        packages.push(LockedPackage {
            name: normalize_name(name),
            version: version.to_string(),
            scope,
            origin,
            requires,
        });
    }
    Ok((packages, doc))
}

fn read_uv(content: &str) -> Result<(Vec<LockedPackage>, Table), ManifestError> {
    let doc = parse_toml(content, "uv.lock")?;
    let mut packages = Vec::new();

    for package in packages_of(&doc, "uv.lock")? {
        let Some(name) = package.get("name").and_then(Value::as_str) else {
            return Err(ManifestError::toml_parse_error(
                "uv.lock",
                "package entry without name",
            ));
        };
        let source = package.get("source").and_then(Value::as_table);
        // the project itself and workspace members
        if source.is_some_and(|s| s.contains_key("editable") || s.contains_key("virtual")) {
            continue;
        }
        let Some(version) = package.get("version").and_then(Value::as_str) else {
            continue;
        };
        let origin = match source {
            Some(s) if s.contains_key("git") => DependencyOrigin::Git,
            Some(s) if s.contains_key("path") || s.contains_key("directory") => DependencyOrigin::Path,
            Some(s) if s.contains_key("url") => DependencyOrigin::Url,
            _ => DependencyOrigin::Registry,
        };
        let requires = package
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(|d| d.get("name").and_then(Value::as_str))
                    .map(normalize_name)
                    .collect()
            })
            .unwrap_or_default();
        packages.push(LockedPackage {
            name: normalize_name(name),
            version: version.to_string(),
            scope: Scope::Compile,
            origin,
            requires,
        });
    }
    Ok((packages, doc))
}

fn to_declarations(packages: Vec<LockedPackage>) -> Vec<DeclaredDependency> {
    let mut dependencies: Vec<DeclaredDependency> = Vec::new();
    for package in packages {
        if dependencies.iter().any(|d| d.coordinate == package.name) {
            continue;
        }
        let mut entry = DeclaredDependency::locked(package.name, Ecosystem::Python, package.version)
            .with_origin(package.origin);
        entry.scope = package.scope;
        dependencies.push(entry);
    }
    dependencies
}

fn lock_metadata(packages: &[LockedPackage]) -> ManifestMetadata {
    let mut meta = ManifestMetadata::default();
    for package in packages {
        if !package.requires.is_empty() {
            meta.facts
                .entry(format!("requires:{}", package.name))
                .or_insert_with(|| package.requires.join(","));
        }
        let versions: Vec<&str> = packages
            .iter()
            .filter(|p| p.name == package.name)
            .map(|p| p.version.as_str())
            .collect();
        if versions.len() > 1 {
            meta.facts
                .insert(format!("duplicate:{}", package.name), versions.join(","));
        }
    }
    meta
}

impl ManifestParser for PoetryLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PoetryLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let (packages, _) = read_poetry(content)?;
        Ok(to_declarations(packages))
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let Ok((packages, doc)) = read_poetry(content) else {
            return ManifestMetadata::default();
        };
        let mut meta = lock_metadata(&packages);
        let info = doc.get("metadata");
        for (key, fact) in [("lock-version", "lock-version"), ("python-versions", "python")] {
            if let Some(v) = info.and_then(|m| m.get(key)).and_then(Value::as_str) {
                meta.facts.insert(fact.to_string(), v.to_string());
            }
        }
        meta
    }
}

impl ManifestParser for UvLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::UvLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let (packages, _) = read_uv(content)?;
        Ok(to_declarations(packages))
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let Ok((packages, doc)) = read_uv(content) else {
            return ManifestMetadata::default();
        };
        let mut meta = lock_metadata(&packages);
        if let Some(v) = doc.get("version").and_then(Value::as_integer) {
            meta.facts.insert("lock-version".to_string(), v.to_string());
        }
        if let Some(v) = doc.get("requires-python").and_then(Value::as_str) {
            meta.facts.insert("python".to_string(), v.to_string());
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POETRY_LOCK: &str = r#"
[[package]]
name = "Django"
version = "4.2.7"
description = "A high-level Python web framework"
optional = false
python-versions = ">=3.8"

[package.dependencies]
asgiref = ">=3.6.0,<4"
sqlparse = ">=0.3.1"

[[package]]
name = "pytest"
version = "7.4.3"
category = "dev"
optional = false
python-versions = ">=3.7"

[[package]]
name = "toolkit"
version = "0.3.0"
optional = false
python-versions = "*"

[package.source]
type = "git"
url = "https://github.com/org/toolkit.git"
reference = "main"
resolved_reference = "abc123"

[metadata]
lock-version = "2.0"
python-versions = "^3.11"
content-hash = "deadbeef"
"#;

    const UV_LOCK: &str = r#"
version = 1
requires-python = ">=3.11"

[[package]]
name = "my-app"
version = "0.1.0"
source = { editable = "." }
dependencies = [
    { name = "httpx" },
]

[[package]]
name = "httpx"
version = "0.25.2"
source = { registry = "https://pypi.org/simple" }
dependencies = [
    { name = "anyio" },
    { name = "certifi" },
]

[[package]]
name = "anyio"
version = "4.1.0"
source = { registry = "https://pypi.org/simple" }

[[package]]
name = "forked"
version = "1.0.0"
source = { git = "https://github.com/me/forked?rev=abc#abc" }
"#;

    #[test]
    fn test_parse_poetry_lock() {
        let deps = PoetryLockParser.parse(POETRY_LOCK).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].coordinate, "django");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("4.2.7"));
        assert_eq!(deps[1].scope, Scope::Dev);
        assert_eq!(deps[2].origin, DependencyOrigin::Git);
    }

    #[test]
    fn test_poetry_lock_metadata() {
        let meta = PoetryLockParser.metadata(POETRY_LOCK);
        assert_eq!(meta.fact("requires:django"), Some("asgiref,sqlparse"));
        assert_eq!(meta.fact("lock-version"), Some("2.0"));
        assert_eq!(meta.fact("python"), Some("^3.11"));
    }

    #[test]
    fn test_parse_uv_lock() {
        let deps = UvLockParser.parse(UV_LOCK).unwrap();
        assert_eq!(deps.len(), 3);
        assert!(!deps.iter().any(|d| d.coordinate == "my-app"));
        assert_eq!(deps[0].coordinate, "httpx");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("0.25.2"));
        assert_eq!(deps[2].origin, DependencyOrigin::Git);

        let meta = UvLockParser.metadata(UV_LOCK);
        assert_eq!(meta.fact("requires:httpx"), Some("anyio,certifi"));
        assert_eq!(meta.fact("lock-version"), Some("1"));
        assert_eq!(meta.fact("python"), Some(">=3.11"));
    }

    #[test]
    fn test_lock_errors() {
        assert!(PoetryLockParser.parse("[[package]]\nname = \"x\"\n").is_err());
        assert!(UvLockParser.parse("package = 3\n").is_err());
        assert!(UvLockParser.parse("version = 1\n").unwrap().is_empty());
    }
}
