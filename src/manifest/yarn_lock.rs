//! yarn.lock parser
//!
//! Both lockfile dialects share the same shape: an unindented selector
//! header followed by indented fields.
//!
//! Classic (v1):
//! ```text
//! "@babel/core@^7.0.0", "@babel/core@^7.12.3":
//!   version "7.23.2"
//!   dependencies:
//!     debug "^4.1.0"
//! ```
//!
//! Berry (v2+):
//! ```text
//! "@babel/core@npm:^7.0.0":
//!   version: 7.23.2
//!   dependencies:
//!     debug: ^4.1.0
//! ```

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use std::collections::BTreeMap;

/// Parser for yarn.lock files
pub struct YarnLockParser;

#[derive(Debug, Default)]
struct YarnEntry {
    name: String,
    version: Option<String>,
    resolution: Option<String>,
    requires: Vec<String>,
    line: usize,
}

/// Package name from a selector: `@scope/pkg@^1.0.0`, `pkg@npm:^1.0.0`
fn selector_name(selector: &str) -> &str {
    let selector = selector.trim().trim_matches('"');
    match selector.get(1..).and_then(|rest| rest.find('@')) {
        Some(idx) => &selector[..idx + 1],
        None => selector,
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

fn finish_entry(entry: Option<YarnEntry>, entries: &mut Vec<YarnEntry>) -> Result<(), ManifestError> {
    let Some(entry) = entry else {
        return Ok(());
    };
    if entry.version.is_none() {
        return Err(ManifestError::line_error(
            "yarn.lock",
            entry.line,
            format!("entry '{}' has no version", entry.name),
        ));
    }
    entries.push(entry);
    Ok(())
}

fn read_entries(content: &str) -> Result<(Vec<YarnEntry>, BTreeMap<String, String>), ManifestError> {
    let mut entries: Vec<YarnEntry> = Vec::new();
    let mut facts = BTreeMap::new();
    let mut current: Option<YarnEntry> = None;
    let mut in_dependencies = false;
    let mut in_metadata = false;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            if line.starts_with("# yarn lockfile v1") {
                facts.insert("yarn.lockfile".to_string(), "v1".to_string());
            }
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let text = line.trim();

        if indent == 0 {
            finish_entry(current.take(), &mut entries)?;
            in_dependencies = false;
            in_metadata = text == "__metadata:";
            if in_metadata {
                continue;
            }
            let Some(header) = text.strip_suffix(':') else {
                return Err(ManifestError::line_error(
                    "yarn.lock",
                    idx + 1,
                    "expected an entry header ending with ':'",
                ));
            };
            let first = header.split(", ").next().unwrap_or(header);
            current = Some(YarnEntry {
                name: selector_name(first).to_string(),
                line: idx + 1,
                ..Default::default()
            });
            continue;
        }

        if in_metadata {
            if let Some(version) = text.strip_prefix("version:") {
                facts.insert("yarn.lockfile".to_string(), format!("berry:{}", version.trim()));
            }
            continue;
        }

        let Some(entry) = current.as_mut() else {
            return Err(ManifestError::line_error(
                "yarn.lock",
                idx + 1,
                "indented line outside of an entry",
            ));
        };

        if indent >= 4 && in_dependencies {
            let name = text
                .split_once(": ")
                .map(|(n, _)| n)
                .or_else(|| text.rsplit_once(' ').map(|(n, _)| n))
                .unwrap_or(text);
            entry.requires.push(unquote(name).to_string());
            continue;
        }

        in_dependencies = matches!(text, "dependencies:" | "optionalDependencies:");
        if let Some(value) = text.strip_prefix("version:").or_else(|| text.strip_prefix("version ")) {
            entry.version = Some(unquote(value).to_string());
        } else if let Some(value) = text.strip_prefix("resolution:") {
            entry.resolution = Some(unquote(value).to_string());
        } else if let Some(value) = text.strip_prefix("resolved ") {
            entry.resolution = Some(unquote(value).to_string());
        }
    }
    finish_entry(current.take(), &mut entries)?;

    Ok((entries, facts))
}

fn origin_of(resolution: Option<&str>) -> DependencyOrigin {
    match resolution {
        Some(r) if r.contains("@workspace:") || r.contains("@link:") || r.contains("@portal:") => {
            DependencyOrigin::Path
        }
        Some(r) if r.contains("@file:") || r.starts_with("file:") => DependencyOrigin::Path,
        Some(r)
            if r.contains("git+")
                || r.contains(".git")
                || r.contains("github:")
                || r.contains("github.com/") =>
        {
            DependencyOrigin::Git
        }
        _ => DependencyOrigin::Registry,
    }
}

impl ManifestParser for YarnLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::YarnLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let (entries, _) = read_entries(content)?;
        let mut dependencies: Vec<DeclaredDependency> = Vec::new();

        for entry in entries {
            let origin = origin_of(entry.resolution.as_deref());
            // the project itself appears as a workspace entry in berry lockfiles
            if origin == DependencyOrigin::Path
                && entry
                    .resolution
                    .as_deref()
                    .is_some_and(|r| r.ends_with("@workspace:."))
            {
                continue;
            }
            if dependencies.iter().any(|d| d.coordinate == entry.name) {
                continue;
            }
            let version = entry.version.unwrap_or_default();
            dependencies.push(
                DeclaredDependency::locked(entry.name, Ecosystem::Node, version)
                    .with_origin(origin)
                    .at_line(entry.line),
            );
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok((entries, facts)) = read_entries(content) else {
            return meta;
        };
        meta.facts = facts;

        let mut versions: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for entry in &entries {
            let version = entry.version.as_deref().unwrap_or("");
            let seen = versions.entry(entry.name.as_str()).or_default();
            if !seen.contains(&version) {
                seen.push(version);
            }
            if !entry.requires.is_empty() {
                meta.facts
                    .entry(format!("requires:{}", entry.name))
                    .or_insert_with(|| entry.requires.join(","));
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

    const CLASSIC: &str = r#"# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.
# yarn lockfile v1


"@babel/code-frame@^7.0.0", "@babel/code-frame@^7.10.4":
  version "7.22.13"
  resolved "https://registry.yarnpkg.com/@babel/code-frame/-/code-frame-7.22.13.tgz"
  integrity sha512-abc
  dependencies:
    "@babel/highlight" "^7.22.13"
    chalk "^2.4.2"

chalk@^2.4.2:
  version "2.4.2"
  resolved "https://registry.yarnpkg.com/chalk/-/chalk-2.4.2.tgz"

chalk@^4.1.0:
  version "4.1.2"
  resolved "https://registry.yarnpkg.com/chalk/-/chalk-4.1.2.tgz"
"#;

    const BERRY: &str = r#"# This file is generated by running "yarn install" inside your project.

__metadata:
  version: 6
  cacheKey: 8

"lodash@npm:^4.17.21":
  version: 4.17.21
  resolution: "lodash@npm:4.17.21"
  checksum: eb835a2e51d381e561e508ce932ea50a8e5a68f4ebdd771ea240d3048244a8d13658acbd502cd4829768c56f2e16bdd4340b9ea141297d472517b83868e677f7
  languageName: node
  linkType: hard

"my-lib@github:me/my-lib#v1.0.0":
  version: 1.0.0
  resolution: "my-lib@https://github.com/me/my-lib.git#commit=abc"
  dependencies:
    lodash: ^4.17.21
  languageName: node
  linkType: hard

"shop@workspace:.":
  version: 0.0.0-use.local
  resolution: "shop@workspace:."
  languageName: unknown
  linkType: soft
"#;

    #[test]
    fn test_selector_name() {
        assert_eq!(selector_name("\"@babel/core@^7.0.0\""), "@babel/core");
        assert_eq!(selector_name("lodash@npm:^4.17.21"), "lodash");
        assert_eq!(selector_name("left-pad"), "left-pad");
    }

    #[test]
    fn test_parse_classic() {
        let deps = YarnLockParser.parse(CLASSIC).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coordinate, "@babel/code-frame");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("7.22.13"));
        assert_eq!(deps[0].line, Some(5));
        assert_eq!(deps[1].coordinate, "chalk");
        assert_eq!(deps[1].resolved_version.as_deref(), Some("2.4.2"));
    }

    #[test]
    fn test_metadata_classic() {
        let meta = YarnLockParser.metadata(CLASSIC);
        assert_eq!(meta.fact("yarn.lockfile"), Some("v1"));
        assert_eq!(meta.fact("duplicate:chalk"), Some("2.4.2,4.1.2"));
        assert_eq!(
            meta.fact("requires:@babel/code-frame"),
            Some("@babel/highlight,chalk")
        );
    }

    #[test]
    fn test_parse_berry() {
        let deps = YarnLockParser.parse(BERRY).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coordinate, "lodash");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("4.17.21"));
        assert_eq!(deps[0].origin, DependencyOrigin::Registry);
        assert_eq!(deps[1].coordinate, "my-lib");
        assert_eq!(deps[1].origin, DependencyOrigin::Git);

        let meta = YarnLockParser.metadata(BERRY);
        assert_eq!(meta.fact("yarn.lockfile"), Some("berry:6"));
        assert_eq!(meta.fact("requires:my-lib"), Some("lodash"));
    }

    #[test]
    fn test_entry_without_version() {
        let err = YarnLockParser.parse("left-pad@^1.0.0:\n  resolved \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("yarn.lock:1: entry 'left-pad' has no version"));
    }
}
