//! go.mod parser for Go projects
//!
//! Handles:
//! - require statements (single and block), `// indirect` markers
//! - replace directives (single and block), local-path replacements
//! - exclude and retract directives
//! - module, go and toolchain directives

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::{get_parser, VersionParser};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Parser for go.mod files
pub struct GoModParser;

// Single-line directive: require module/path v1.2.3 // comment
static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(require|replace|exclude|retract)\s+(.+)$").unwrap()
});

// Block start: require (
static BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(require|replace|exclude|retract)\s*\($").unwrap());

// Module/version pair: module/path v1.2.3
static MODULE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(v\d+\.\d+\.\d+\S*)$").unwrap());

// Replace body: old [v] => new [v]
static REPLACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)(?:\s+(v\S+))?\s*=>\s*(\S+)(?:\s+(v\S+))?$").unwrap()
});

static SIMPLE_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(module|go|toolchain)\s+(\S+)").unwrap());

/// Everything read from one go.mod
#[derive(Default)]
struct GoModScan {
    requires: Vec<DeclaredDependency>,
    replaces: HashMap<String, (String, bool)>,
    facts: BTreeMap<String, String>,
}

/// Splits `text // comment` into its parts
fn split_comment(line: &str) -> (&str, &str) {
    match line.find("//") {
        Some(idx) => (line[..idx].trim(), line[idx + 2..].trim()),
        None => (line.trim(), ""),
    }
}

impl GoModParser {
    fn scan(&self, content: &str) -> Result<GoModScan, ManifestError> {
        let parser = get_parser(Ecosystem::Go);
        let mut scan = GoModScan::default();
        let mut block: Option<(String, usize)> = None;
        let mut retracted = Vec::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let (text, comment) = split_comment(raw_line);

            if text.is_empty() {
                continue;
            }

            if let Some((kind, _)) = &block {
                if text == ")" {
                    block = None;
                    continue;
                }
                let kind = kind.clone();
                self.apply_directive(&kind, text, comment, line_no, parser.as_ref(), &mut scan, &mut retracted);
                continue;
            }

            if let Some(caps) = BLOCK_START_RE.captures(text) {
                block = Some((caps[1].to_string(), line_no));
                continue;
            }

            if let Some(caps) = SIMPLE_DIRECTIVE_RE.captures(text) {
                let value = caps[2].trim_matches('"').to_string();
                scan.facts.insert(caps[1].to_string(), value);
                continue;
            }

            if let Some(caps) = DIRECTIVE_RE.captures(text) {
                let kind = caps[1].to_string();
                let body = caps[2].trim().to_string();
                self.apply_directive(&kind, &body, comment, line_no, parser.as_ref(), &mut scan, &mut retracted);
            }
        }

        if let Some((kind, start)) = block {
            return Err(ManifestError::line_error(
                "go.mod",
                start,
                format!("unterminated {} block", kind),
            ));
        }

        if !retracted.is_empty() {
            scan.facts.insert("retract".to_string(), retracted.join(", "));
        }

        Ok(scan)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_directive(
        &self,
        kind: &str,
        body: &str,
        comment: &str,
        line_no: usize,
        parser: &dyn VersionParser,
        scan: &mut GoModScan,
        retracted: &mut Vec<String>,
    ) {
        match kind {
            "require" => {
                let Some(caps) = MODULE_VERSION_RE.captures(body) else {
                    return;
                };
                let module = &caps[1];
                let Some(spec) = parser.parse(&caps[2]) else {
                    return;
                };
                let mut dep = DeclaredDependency::new(module, Ecosystem::Go, Scope::Compile)
                    .with_version(spec)
                    .at_line(line_no);
                if comment.split_whitespace().any(|w| w == "indirect" || w == "indirect;") {
                    dep = dep.indirect();
                }
                scan.requires.push(dep);
            }
            "replace" => {
                let Some(caps) = REPLACE_RE.captures(body) else {
                    return;
                };
                let target = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                let is_local = target.starts_with('.') || target.starts_with('/');
                let replacement = match caps.get(4) {
                    Some(v) => format!("{} {}", target, v.as_str()),
                    None => target.to_string(),
                };
                scan.replaces
                    .insert(caps[1].to_string(), (replacement, is_local));
            }
            "exclude" => {
                if let Some(caps) = MODULE_VERSION_RE.captures(body) {
                    scan.facts
                        .insert(format!("exclude:{}", &caps[1]), caps[2].to_string());
                }
            }
            "retract" => retracted.push(body.to_string()),
            _ => {}
        }
    }
}

impl ManifestParser for GoModParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::GoMod
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let scan = self.scan(content)?;
        let mut dependencies = scan.requires;

        for dep in dependencies.iter_mut() {
            if let Some((replacement, is_local)) = scan.replaces.get(&dep.coordinate) {
                dep.replacement = Some(replacement.clone());
                if *is_local {
                    dep.origin = DependencyOrigin::Path;
                }
            }
            let excluded_key = format!("exclude:{}", dep.coordinate);
            if let Some(version) = scan.facts.get(&excluded_key) {
                dep.exclusions.push(format!("{}@{}", dep.coordinate, version));
            }
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let facts = self.scan(content).map(|s| s.facts).unwrap_or_default();
        ManifestMetadata {
            facts,
            includes: Vec::new(),
        }
    }
}
