//! Gradle version catalog parser (gradle/libs.versions.toml)
//!
//! Library aliases become declarations keyed by their `group:name`
//! coordinate. The alias-to-coordinate table is exposed through metadata
//! facts (`alias:<accessor>`) so build scripts that reference `libs.<accessor>`
//! can be resolved after all files are parsed.

use crate::domain::{
    DeclaredDependency, Ecosystem, ManifestFormat, ManifestMetadata, Scope, VersionSpec,
};
use crate::error::ManifestError;
use crate::manifest::{parse_toml, ManifestParser};
use crate::parser::parse_declared;
use toml::{Table, Value};

/// Parser for libs.versions.toml
pub struct VersionCatalogParser;

/// Converts a catalog alias to the accessor path Gradle generates for it
///
/// `spring-boot-starter`, `spring_boot_starter` and `spring.boot.starter`
/// all become `spring.boot.starter`.
pub fn catalog_accessor(alias: &str) -> String {
    alias
        .split(['-', '_', '.'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Reads a version value: a literal, a `ref`, or a rich version table
fn read_version(value: Option<&Value>, versions: &Table) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Table(t) => {
            if let Some(reference) = t.get("ref").and_then(Value::as_str) {
                return read_version(versions.get(reference), versions);
            }
            ["strictly", "require", "prefer"]
                .iter()
                .find_map(|key| t.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        }
        _ => None,
    }
}

/// Resolves one `[libraries]` entry to (coordinate, version)
fn read_library(value: &Value, versions: &Table) -> Option<(String, Option<String>)> {
    match value {
        Value::String(notation) => {
            let mut parts = notation.splitn(3, ':');
            let group = parts.next()?;
            let name = parts.next()?;
            Some((format!("{}:{}", group, name), parts.next().map(str::to_string)))
        }
        Value::Table(t) => {
            let coordinate = match t.get("module").and_then(Value::as_str) {
                Some(module) => module.to_string(),
                None => format!(
                    "{}:{}",
                    t.get("group").and_then(Value::as_str)?,
                    t.get("name").and_then(Value::as_str)?
                ),
            };
            Some((coordinate, read_version(t.get("version"), versions)))
        }
        _ => None,
    }
}

fn version_spec(version: Option<&str>) -> VersionSpec {
    match version {
        Some(v) => parse_declared(Ecosystem::Gradle, Some(v)),
        None => VersionSpec::any(),
    }
}

impl VersionCatalogParser {
    fn read(
        &self,
        content: &str,
    ) -> Result<(Vec<DeclaredDependency>, ManifestMetadata), ManifestError> {
        let doc = parse_toml(content, "libs.versions.toml")?;
        let empty = Table::new();
        let versions = doc
            .get("versions")
            .and_then(Value::as_table)
            .unwrap_or(&empty);

        let mut dependencies = Vec::new();
        let mut meta = ManifestMetadata::default();

        if let Some(libraries) = doc.get("libraries").and_then(Value::as_table) {
            for (alias, value) in libraries {
                let Some((coordinate, version)) = read_library(value, versions) else {
                    continue;
                };
                meta.facts
                    .insert(format!("alias:{}", catalog_accessor(alias)), coordinate.clone());
                dependencies.push(
                    DeclaredDependency::new(coordinate, Ecosystem::Gradle, Scope::Compile)
                        .with_version(version_spec(version.as_deref()))
                        .with_group("catalog"),
                );
            }
        }

        if let Some(plugins) = doc.get("plugins").and_then(Value::as_table) {
            for (alias, value) in plugins {
                let (id, version) = match value {
                    Value::String(notation) => match notation.split_once(':') {
                        Some((id, version)) => (id.to_string(), Some(version.to_string())),
                        None => (notation.clone(), None),
                    },
                    Value::Table(t) => match t.get("id").and_then(Value::as_str) {
                        Some(id) => (id.to_string(), read_version(t.get("version"), versions)),
                        None => continue,
                    },
                    _ => continue,
                };
                meta.facts
                    .insert(format!("plugin:{}", catalog_accessor(alias)), id.clone());
                dependencies.push(
                    DeclaredDependency::new(id, Ecosystem::Gradle, Scope::Plugin)
                        .with_version(version_spec(version.as_deref()))
                        .with_group("plugins"),
                );
            }
        }

        for (name, value) in versions {
            if let Some(version) = read_version(Some(value), versions) {
                meta.facts.insert(format!("version:{}", name), version);
            }
        }

        Ok((dependencies, meta))
    }
}

impl ManifestParser for VersionCatalogParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::VersionCatalog
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        self.read(content).map(|(deps, _)| deps)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        self.read(content).map(|(_, meta)| meta).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    const CATALOG: &str = r#"
[versions]
spring = "6.0.13"
jackson = { strictly = "[2.15, 2.16[", prefer = "2.15.3" }

[libraries]
spring-core = { module = "org.springframework:spring-core", version.ref = "spring" }
jackson_databind = { group = "com.fasterxml.jackson.core", name = "jackson-databind", version.ref = "jackson" }
guava = "com.google.guava:guava:32.1.3-jre"
commons-lang3 = { module = "org.apache.commons:commons-lang3" }

[bundles]
spring = ["spring-core"]

[plugins]
spring-boot = { id = "org.springframework.boot", version = "3.1.5" }
"#;

    fn find<'a>(deps: &'a [DeclaredDependency], coordinate: &str) -> &'a DeclaredDependency {
        deps.iter().find(|d| d.coordinate == coordinate).unwrap()
    }

    #[test]
    fn test_catalog_accessor() {
        assert_eq!(catalog_accessor("spring-boot-starter"), "spring.boot.starter");
        assert_eq!(catalog_accessor("jackson_databind"), "jackson.databind");
        assert_eq!(catalog_accessor("guava"), "guava");
    }

    #[test]
    fn test_parse_libraries() {
        let deps = VersionCatalogParser.parse(CATALOG).unwrap();
        assert_eq!(deps.len(), 5);

        assert_eq!(
            find(&deps, "org.springframework:spring-core").declared_raw(),
            Some("6.0.13")
        );
        let jackson = find(&deps, "com.fasterxml.jackson.core:jackson-databind");
        assert_eq!(jackson.version.as_ref().unwrap().kind, VersionSpecKind::Range);
        assert_eq!(
            find(&deps, "com.google.guava:guava").declared_raw(),
            Some("32.1.3-jre")
        );
        assert!(find(&deps, "org.apache.commons:commons-lang3")
            .declared_raw()
            .is_none());
    }

    #[test]
    fn test_parse_plugins() {
        let deps = VersionCatalogParser.parse(CATALOG).unwrap();
        let boot = find(&deps, "org.springframework.boot");
        assert_eq!(boot.scope, Scope::Plugin);
        assert_eq!(boot.declared_raw(), Some("3.1.5"));
    }

    #[test]
    fn test_metadata_aliases() {
        let meta = VersionCatalogParser.metadata(CATALOG);
        assert_eq!(
            meta.fact("alias:spring.core"),
            Some("org.springframework:spring-core")
        );
        assert_eq!(
            meta.fact("alias:jackson.databind"),
            Some("com.fasterxml.jackson.core:jackson-databind")
        );
        assert_eq!(meta.fact("plugin:spring.boot"), Some("org.springframework.boot"));
        assert_eq!(meta.fact("version:spring"), Some("6.0.13"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = VersionCatalogParser.parse("[libraries\nx = ").unwrap_err();
        assert!(err.to_string().contains("failed to parse TOML"));
    }
}
