//! requirements*.txt parser
//!
//! Handles the pip requirements file grammar:
//! - `name[extras] <specifier> ; <marker>` (PEP 508)
//! - `name @ https://...` direct references
//! - `-e git+https://...#egg=name` / `-e ./local` editable installs
//! - `-r other.txt` and `-c constraints.txt` (recorded, not followed)
//! - line continuations with a trailing `\`

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::parse_declared;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Parser for requirements.txt and friends
pub struct RequirementsParser;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(\[[^\]]*\])?\s*(.*)$").unwrap()
});

static EGG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#&]egg=([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap());

/// A parsed PEP 508 requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Requirement {
    pub name: String,
    pub specifier: Option<String>,
    pub url: Option<String>,
}

/// PEP 503 name normalisation: lowercase, runs of `-_.` become `-`
pub(crate) fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        }
    }
    out
}

/// Parses one PEP 508 requirement string; markers and extras are dropped
pub(crate) fn parse_requirement(text: &str) -> Option<Requirement> {
    let caps = REQUIREMENT_RE.captures(text.trim())?;
    let name = normalize_name(caps.get(1)?.as_str());
    let rest = caps.get(3).map_or("", |m| m.as_str()).trim();

    if let Some(url) = rest.strip_prefix('@') {
        let url = url.split(';').next().unwrap_or(url).trim();
        return Some(Requirement {
            name,
            specifier: None,
            url: Some(url.to_string()),
        });
    }

    let spec = rest.split(';').next().unwrap_or(rest).trim();
    let spec = spec
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(spec)
        .trim();
    if !spec.is_empty() && !spec.starts_with(['=', '<', '>', '~', '!']) {
        return None;
    }

    Some(Requirement {
        name,
        specifier: (!spec.is_empty()).then(|| spec.to_string()),
        url: None,
    })
}

/// Classifies a direct-reference URL or path
pub(crate) fn reference_origin(target: &str) -> DependencyOrigin {
    let target = target.trim();
    if target.starts_with("git+") || target.ends_with(".git") || target.contains(".git@") {
        DependencyOrigin::Git
    } else if target.starts_with("file:")
        || target.starts_with('.')
        || target.starts_with('/')
        || !target.contains("://")
    {
        DependencyOrigin::Path
    } else {
        DependencyOrigin::Url
    }
}

impl Requirement {
    pub(crate) fn into_declaration(self, scope: Scope) -> DeclaredDependency {
        let version = parse_declared(Ecosystem::Python, self.specifier.as_deref());
        let origin = self
            .url
            .as_deref()
            .map_or(DependencyOrigin::Registry, reference_origin);
        DeclaredDependency::new(self.name, Ecosystem::Python, scope)
            .with_version(version)
            .with_origin(origin)
    }
}

/// Name of an editable or bare-URL install: `#egg=` fragment, else the last path segment
fn name_from_target(target: &str) -> Option<String> {
    if let Some(caps) = EGG_RE.captures(target) {
        return Some(normalize_name(&caps[1]));
    }
    let path = target.split(['#', '?']).next().unwrap_or(target);
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let last = last.trim_end_matches(".git");
    // wheel and sdist file names: name-version-...
    let stem = last
        .strip_suffix(".whl")
        .or_else(|| last.strip_suffix(".tar.gz"))
        .or_else(|| last.strip_suffix(".zip"))
        .map(|s| s.split('-').next().unwrap_or(s))
        .unwrap_or(last);
    (!stem.is_empty() && stem != ".").then(|| normalize_name(stem))
}

/// Joins continuation lines, keeping the number of the first physical line
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (start, mut text) = match pending.take() {
            Some((start, mut acc)) => {
                acc.push(' ');
                acc.push_str(raw.trim());
                (start, acc)
            }
            None => (idx + 1, raw.trim().to_string()),
        };
        if let Some(stripped) = text.strip_suffix('\\') {
            text = stripped.trim_end().to_string();
            pending = Some((start, text));
            continue;
        }
        lines.push((start, text));
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

/// Drops trailing per-requirement options such as `--hash=sha256:...`
fn strip_options(line: &str) -> &str {
    match line.find(" --") {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

impl ManifestParser for RequirementsParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Requirements
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(crate::domain::is_requirements_name)
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let mut dependencies = Vec::new();

        for (line_no, raw) in logical_lines(content) {
            let line = strip_comment(&raw).trim();
            if line.is_empty() {
                continue;
            }

            let editable = line
                .strip_prefix("-e ")
                .or_else(|| line.strip_prefix("--editable "))
                .or_else(|| line.strip_prefix("--editable="));
            if let Some(target) = editable {
                let target = target.trim();
                let Some(name) = name_from_target(target) else {
                    return Err(ManifestError::line_error(
                        "requirements.txt",
                        line_no,
                        format!("cannot determine package name for editable '{}'", target),
                    ));
                };
                dependencies.push(
                    DeclaredDependency::new(name, Ecosystem::Python, Scope::Compile)
                        .with_version(parse_declared(Ecosystem::Python, None))
                        .with_origin(reference_origin(target))
                        .at_line(line_no),
                );
                continue;
            }

            if line.starts_with('-') {
                // -r, -c, --index-url and other pip options
                continue;
            }

            let line = strip_options(line);
            if line.contains("://") && !line.contains(" @ ") && !line.contains('@') {
                if let Some(name) = name_from_target(line) {
                    dependencies.push(
                        DeclaredDependency::new(name, Ecosystem::Python, Scope::Compile)
                            .with_version(parse_declared(Ecosystem::Python, None))
                            .with_origin(reference_origin(line))
                            .at_line(line_no),
                    );
                    continue;
                }
            }

            let Some(requirement) = parse_requirement(line) else {
                return Err(ManifestError::line_error(
                    "requirements.txt",
                    line_no,
                    format!("invalid requirement '{}'", line),
                ));
            };
            dependencies.push(requirement.into_declaration(Scope::Compile).at_line(line_no));
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let mut constraints = Vec::new();

        for (_, raw) in logical_lines(content) {
            let line = strip_comment(&raw).trim();
            let option = |long: &str, short: &str| {
                line.strip_prefix(long)
                    .or_else(|| line.strip_prefix(short))
                    .map(|rest| rest.trim_start_matches('=').trim().to_string())
            };
            if let Some(file) = option("--requirement", "-r") {
                meta.includes.push(file);
            } else if let Some(file) = option("--constraint", "-c") {
                constraints.push(file);
            } else if let Some(url) = option("--index-url", "-i") {
                meta.facts.insert("index-url".to_string(), url);
            }
        }
        if !constraints.is_empty() {
            meta.facts
                .insert("constraints".to_string(), constraints.join(","));
        }
        meta
    }

    fn scope_hint(&self, path: &Path) -> Option<Scope> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let stem = name
            .trim_start_matches("requirements")
            .trim_start_matches(['-', '_', '.']);
        if stem.contains("test") {
            Some(Scope::Test)
        } else if ["dev", "lint", "doc", "typing", "build"]
            .iter()
            .any(|k| stem.contains(k))
        {
            Some(Scope::Dev)
        } else {
            None
        }
    }
}
