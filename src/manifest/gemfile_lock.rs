//! Gemfile.lock parser
//!
//! Sections start in column 0. Source sections (`GEM`, `GIT`, `PATH`) list
//! resolved gems under `specs:` at four spaces, each followed by its own
//! requirements at six spaces. `DEPENDENCIES` lists the Gemfile's direct gems,
//! with a trailing `!` for gems pinned to a git or path source.

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Parser for Gemfile.lock files
pub struct GemfileLockParser;

// `name (version)` or `name (version-platform)`
static SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9._-]+)\s+\(([^)]+)\)$").unwrap());

// direct entry: `rails (~> 7.1)`, `mygem!`, `puma`
static DEPENDENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9._-]+)(!)?(?:\s+\(([^)]+)\))?$").unwrap());

#[derive(Debug, Default)]
struct LockContents {
    specs: Vec<LockedGem>,
    direct: Vec<String>,
    facts: BTreeMap<String, String>,
}

#[derive(Debug)]
struct LockedGem {
    name: String,
    version: String,
    origin: DependencyOrigin,
    requires: Vec<String>,
    line: usize,
}

/// Strips a platform suffix: `1.15.4-x86_64-linux` -> `1.15.4`
fn strip_platform(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

fn read_lock(content: &str) -> Result<LockContents, ManifestError> {
    let mut lock = LockContents::default();
    let mut section = String::new();
    let mut remote = String::new();
    let mut platforms = Vec::new();
    let mut skipping = false;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let text = line.trim();

        if indent == 0 {
            section = text.to_string();
            remote.clear();
            continue;
        }

        match section.as_str() {
            "GEM" | "GIT" | "PATH" => {
                if indent == 2 {
                    if let Some(value) = text.strip_prefix("remote:") {
                        remote = value.trim().to_string();
                    }
                    continue;
                }
                if indent == 4 {
                    let Some(caps) = SPEC_RE.captures(text) else {
                        return Err(ManifestError::line_error(
                            "Gemfile.lock",
                            line_no,
                            format!("malformed spec entry '{}'", text),
                        ));
                    };
                    // the project's own gemspec
                    skipping = section == "PATH" && remote == ".";
                    if skipping {
                        continue;
                    }
                    let origin = match section.as_str() {
                        "GIT" => DependencyOrigin::Git,
                        "PATH" => DependencyOrigin::Path,
                        _ => DependencyOrigin::Registry,
                    };
                    lock.specs.push(LockedGem {
                        name: caps[1].to_string(),
                        version: strip_platform(&caps[2]).to_string(),
                        origin,
                        requires: Vec::new(),
                        line: line_no,
                    });
                } else if indent >= 6 && !skipping {
                    let name = text.split_whitespace().next().unwrap_or(text);
                    if let Some(gem) = lock.specs.last_mut() {
                        if !gem.requires.iter().any(|r| r == name) {
                            gem.requires.push(name.to_string());
                        }
                    }
                }
            }
            "DEPENDENCIES" => {
                let Some(caps) = DEPENDENCY_RE.captures(text) else {
                    return Err(ManifestError::line_error(
                        "Gemfile.lock",
                        line_no,
                        format!("malformed dependency entry '{}'", text),
                    ));
                };
                lock.direct.push(caps[1].to_string());
            }
            "PLATFORMS" => platforms.push(text.to_string()),
            "RUBY VERSION" => {
                let version = text.trim_start_matches("ruby").trim();
                let version = version.split('p').next().unwrap_or(version);
                lock.facts.insert("ruby".to_string(), version.to_string());
            }
            "BUNDLED WITH" => {
                lock.facts.insert("bundler".to_string(), text.to_string());
            }
            _ => {}
        }
    }

    if !platforms.is_empty() {
        lock.facts.insert("platforms".to_string(), platforms.join(","));
    }
    Ok(lock)
}

impl ManifestParser for GemfileLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::GemfileLock
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let lock = read_lock(content)?;
        let mut dependencies: Vec<DeclaredDependency> = Vec::new();
        for gem in lock.specs {
            // platform variants of the same gem share a version
            if dependencies.iter().any(|d| d.coordinate == gem.name) {
                continue;
            }
            dependencies.push(
                DeclaredDependency::locked(gem.name, Ecosystem::Ruby, gem.version)
                    .with_origin(gem.origin)
                    .at_line(gem.line),
            );
        }
        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(lock) = read_lock(content) else {
            return meta;
        };
        meta.facts = lock.facts;
        if !lock.direct.is_empty() {
            meta.facts
                .insert("dependencies".to_string(), lock.direct.join(","));
        }
        for gem in &lock.specs {
            if !gem.requires.is_empty() {
                meta.facts
                    .entry(format!("requires:{}", gem.name))
                    .or_insert_with(|| gem.requires.join(","));
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"GIT
  remote: https://github.com/sidekiq/sidekiq.git
  revision: 0123456789abcdef
  branch: main
  specs:
    sidekiq (7.2.0)
      redis-client (>= 0.14.0)

PATH
  remote: .
  specs:
    my_app (0.1.0)
      rails (~> 7.1)

GEM
  remote: https://rubygems.org/
  specs:
    actionpack (7.1.2)
      rack (>= 2.2.4)
    nokogiri (1.15.5-arm64-darwin)
      racc (~> 1.4)
    nokogiri (1.15.5-x86_64-linux)
      racc (~> 1.4)
    rack (3.0.8)
    racc (1.7.3)
    rails (7.1.2)
      actionpack (= 7.1.2)
    redis-client (0.19.0)

PLATFORMS
  arm64-darwin-23
  x86_64-linux

DEPENDENCIES
  my_app!
  nokogiri
  rails (~> 7.1)
  sidekiq!

RUBY VERSION
   ruby 3.2.2p53

BUNDLED WITH
   2.4.22
"#;

    #[test]
    fn test_parse_specs() {
        let deps = GemfileLockParser.parse(LOCK).unwrap();
        assert_eq!(deps.len(), 7);
        assert!(!deps.iter().any(|d| d.coordinate == "my_app"));

        let sidekiq = deps.iter().find(|d| d.coordinate == "sidekiq").unwrap();
        assert_eq!(sidekiq.origin, DependencyOrigin::Git);
        assert_eq!(sidekiq.resolved_version.as_deref(), Some("7.2.0"));

        let nokogiri = deps.iter().find(|d| d.coordinate == "nokogiri").unwrap();
        assert_eq!(nokogiri.resolved_version.as_deref(), Some("1.15.5"));
        assert_eq!(nokogiri.line, Some(20));
    }

    #[test]
    fn test_metadata() {
        let meta = GemfileLockParser.metadata(LOCK);
        assert_eq!(meta.fact("bundler"), Some("2.4.22"));
        assert_eq!(meta.fact("ruby"), Some("3.2.2"));
        assert_eq!(meta.fact("platforms"), Some("arm64-darwin-23,x86_64-linux"));
        assert_eq!(meta.fact("dependencies"), Some("my_app,nokogiri,rails,sidekiq"));
        assert_eq!(meta.fact("requires:rails"), Some("actionpack"));
        assert_eq!(meta.fact("requires:nokogiri"), Some("racc"));
    }

    #[test]
    fn test_malformed_spec() {
        let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    rack 3.0.8\n";
        let err = GemfileLockParser.parse(content).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gemfile.lock:4: malformed spec entry 'rack 3.0.8'"
        );
    }
}
