//! Manifest file parsing
//!
//! Every supported format sits behind one [`ManifestParser`] trait and is
//! registered in a lookup table. Parsers see only the file text and return
//! raw declarations; [`parse_manifest`] wraps them with the file path and
//! turns parse failures into per-file error strings instead of propagating.

mod gemfile;
mod gemfile_lock;
mod go_mod;
mod go_sum;
mod go_work;
mod gradle;
mod package_json;
mod package_lock;
mod pipfile;
mod pnpm_lock;
mod pom;
mod pyproject_toml;
mod python_lock;
mod requirements;
mod sbt;
mod version_catalog;
mod yarn_lock;

pub use gemfile::GemfileParser;
pub use gemfile_lock::GemfileLockParser;
pub use go_mod::GoModParser;
pub use go_sum::GoSumParser;
pub use go_work::GoWorkParser;
pub use gradle::{GradleParser, GradleSettingsParser};
pub use package_json::PackageJsonParser;
pub use package_lock::PackageLockParser;
pub use pipfile::{PipfileLockParser, PipfileParser};
pub use pnpm_lock::PnpmLockParser;
pub use pom::PomParser;
pub use pyproject_toml::PyprojectTomlParser;
pub use python_lock::{PoetryLockParser, UvLockParser};
pub use requirements::RequirementsParser;
pub use sbt::{SbtBuildPropertiesParser, SbtParser};
pub use version_catalog::{catalog_accessor, VersionCatalogParser};
pub use yarn_lock::YarnLockParser;

use crate::domain::{
    DeclaredDependency, Ecosystem, ManifestFile, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Trait for parsing manifest files
pub trait ManifestParser: Send + Sync {
    /// Returns the format this parser handles
    fn format(&self) -> ManifestFormat;

    /// Parse dependency declarations from file content
    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError>;

    /// Returns true if this parser understands the file at `path`
    fn can_handle(&self, path: &Path) -> bool {
        ManifestFormat::from_path(path) == Some(self.format())
    }

    /// Non-dependency facts (toolchain versions, includes); empty by default
    fn metadata(&self, _content: &str) -> ManifestMetadata {
        ManifestMetadata::default()
    }

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem {
        self.format().ecosystem()
    }

    /// Scope implied by the file name itself (`requirements-dev.txt`)
    fn scope_hint(&self, _path: &Path) -> Option<Scope> {
        None
    }
}

/// Get a manifest parser for the specified format
pub fn get_parser(format: ManifestFormat) -> Box<dyn ManifestParser> {
    match format {
        ManifestFormat::GoMod => Box::new(GoModParser),
        ManifestFormat::GoWork => Box::new(GoWorkParser),
        ManifestFormat::GoSum => Box::new(GoSumParser),
        ManifestFormat::Pom => Box::new(PomParser),
        ManifestFormat::Gradle => Box::new(GradleParser),
        ManifestFormat::GradleSettings => Box::new(GradleSettingsParser),
        ManifestFormat::VersionCatalog => Box::new(VersionCatalogParser),
        ManifestFormat::Sbt => Box::new(SbtParser::build()),
        ManifestFormat::SbtPlugins => Box::new(SbtParser::plugins()),
        ManifestFormat::SbtBuildProperties => Box::new(SbtBuildPropertiesParser),
        ManifestFormat::PackageJson => Box::new(PackageJsonParser),
        ManifestFormat::PackageLock => Box::new(PackageLockParser),
        ManifestFormat::YarnLock => Box::new(YarnLockParser),
        ManifestFormat::PnpmLock => Box::new(PnpmLockParser),
        ManifestFormat::Pyproject => Box::new(PyprojectTomlParser),
        ManifestFormat::Requirements => Box::new(RequirementsParser),
        ManifestFormat::Pipfile => Box::new(PipfileParser),
        ManifestFormat::PipfileLock => Box::new(PipfileLockParser),
        ManifestFormat::PoetryLock => Box::new(PoetryLockParser),
        ManifestFormat::UvLock => Box::new(UvLockParser),
        ManifestFormat::Gemfile => Box::new(GemfileParser),
        ManifestFormat::GemfileLock => Box::new(GemfileLockParser),
    }
}

/// Finds the parser that can handle `path`
pub fn parser_for_path(path: &Path) -> Option<Box<dyn ManifestParser>> {
    let parser = get_parser(ManifestFormat::from_path(path)?);
    parser.can_handle(path).then_some(parser)
}

/// Parses already-read content into a [`ManifestFile`]
///
/// A parse failure leaves the declarations empty and records the error;
/// it never aborts the caller.
pub fn parse_content(path: &Path, parser: &dyn ManifestParser, content: &str) -> ManifestFile {
    let mut file = ManifestFile::new(path, parser.format());
    match parser.parse(content) {
        Ok(declarations) => {
            debug!(
                path = %path.display(),
                count = declarations.len(),
                "parsed manifest"
            );
            file.declarations = declarations;
            if let Some(scope) = parser.scope_hint(path) {
                let group = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                for decl in file.declarations.iter_mut() {
                    decl.scope = scope;
                    decl.group = Some(group.clone());
                }
            }
        }
        Err(e) => {
            let e = e.with_path(path);
            warn!(path = %path.display(), error = %e, "manifest parse failed");
            file.parse_errors.push(e.to_string());
        }
    }
    file.metadata = parser.metadata(content);
    file
}

/// Parses a manifest file from disk
///
/// Only an unreadable or unsupported file is an `Err`; malformed content is
/// recorded in [`ManifestFile::parse_errors`].
pub fn parse_manifest(path: &Path) -> Result<ManifestFile, ManifestError> {
    let parser = parser_for_path(path).ok_or_else(|| ManifestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::not_found(path)
        } else {
            ManifestError::read_error(path, e)
        }
    })?;

    Ok(parse_content(path, parser.as_ref(), &content))
}

/// Parses a TOML document, reporting errors against a placeholder file name
pub(crate) fn parse_toml(content: &str, file_name: &str) -> Result<toml::Table, ManifestError> {
    content
        .parse::<toml::Table>()
        .map_err(|e| ManifestError::toml_parse_error(file_name, e.to_string()))
}

/// Parses a JSON document, reporting errors against a placeholder file name
pub(crate) fn parse_json(
    content: &str,
    file_name: &str,
) -> Result<serde_json::Value, ManifestError> {
    serde_json::from_str(content).map_err(|e| ManifestError::json_parse_error(file_name, e.to_string()))
}

/// Replaces Gradle `libs.*` accessor placeholders with catalog coordinates
///
/// The Gradle parser cannot see `gradle/libs.versions.toml`, so it emits
/// `libs.<accessor>` coordinates. This pass resolves them against every
/// parsed catalog; unresolved accessors are reported as parse errors.
pub fn link_version_catalogs(files: &mut [ManifestFile]) {
    let mut catalog: HashMap<String, DeclaredDependency> = HashMap::new();
    for file in files
        .iter()
        .filter(|f| f.format == ManifestFormat::VersionCatalog)
    {
        for (key, coordinate) in &file.metadata.facts {
            let Some(accessor) = key.strip_prefix("alias:") else {
                continue;
            };
            if let Some(decl) = file
                .declarations
                .iter()
                .find(|d| &d.coordinate == coordinate)
            {
                catalog.insert(accessor.to_string(), decl.clone());
            }
        }
    }

    for file in files
        .iter_mut()
        .filter(|f| f.format == ManifestFormat::Gradle)
    {
        let mut unresolved = Vec::new();
        for decl in file.declarations.iter_mut() {
            let Some(accessor) = decl.coordinate.strip_prefix("libs.") else {
                continue;
            };
            match catalog.get(accessor) {
                Some(entry) => {
                    decl.coordinate = entry.coordinate.clone();
                    if decl.version.is_none() {
                        decl.version = entry.version.clone();
                    }
                }
                None => unresolved.push(decl.coordinate.clone()),
            }
        }
        for accessor in unresolved {
            file.parse_errors
                .push(format!("unresolved version catalog reference '{}'", accessor));
        }
        file.declarations
            .retain(|d| !d.coordinate.starts_with("libs."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_get_parser_formats() {
        for format in [
            ManifestFormat::GoMod,
            ManifestFormat::Pom,
            ManifestFormat::Sbt,
            ManifestFormat::YarnLock,
            ManifestFormat::Requirements,
            ManifestFormat::GemfileLock,
        ] {
            assert_eq!(get_parser(format).format(), format);
        }
    }

    #[test]
    fn test_parser_for_path() {
        let parser = parser_for_path(Path::new("/x/package.json")).unwrap();
        assert_eq!(parser.ecosystem(), Ecosystem::Node);
        assert!(parser_for_path(Path::new("/x/main.go")).is_none());
    }

    #[test]
    fn test_parse_manifest_records_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        fs::write(&path, "{ not json").unwrap();

        let file = parse_manifest(&path).unwrap();
        assert!(file.declarations.is_empty());
        assert_eq!(file.parse_errors.len(), 1);
        assert!(file.parse_errors[0].contains("failed to parse JSON"));
        assert!(file.parse_errors[0].contains(&path.display().to_string()));
    }

    #[test]
    fn test_parse_manifest_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = parse_manifest(&temp.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_parse_manifest_unsupported() {
        let err = parse_manifest(Path::new("README.md")).unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_link_version_catalogs() {
        let catalog_text = r#"
[versions]
guava = "32.1.3-jre"

[libraries]
guava = { module = "com.google.guava:guava", version.ref = "guava" }
"#;
        let gradle_text = r#"
dependencies {
    implementation(libs.guava)
    implementation(libs.missing.lib)
}
"#;
        let catalog = parse_content(
            Path::new("gradle/libs.versions.toml"),
            &VersionCatalogParser,
            catalog_text,
        );
        let build = parse_content(Path::new("build.gradle.kts"), &GradleParser, gradle_text);
        let mut files = vec![catalog, build];

        link_version_catalogs(&mut files);

        let build = &files[1];
        assert_eq!(build.declarations.len(), 1);
        assert_eq!(build.declarations[0].coordinate, "com.google.guava:guava");
        assert_eq!(
            build.declarations[0].declared_raw(),
            Some("32.1.3-jre")
        );
        assert_eq!(build.parse_errors.len(), 1);
        assert!(build.parse_errors[0].contains("libs.missing.lib"));
    }
}
