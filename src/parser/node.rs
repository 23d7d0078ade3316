//! Node.js (npm/yarn/pnpm/bun) version specification parser
//!
//! Handles version formats:
//! - Exact: `1.2.3`, `=1.2.3`, `v1.2.3`
//! - Caret: `^1.2.3`, `^1.2`
//! - Tilde: `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `x`, `1.x`, `1.2.*`, `1.2`
//! - Range: `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `^1.0.0 || ^2.0.0`
//! - Dist-tags: `latest`, `next`
//! - Protocol prefixes: `workspace:^1.0.0`, `npm:other@^1.0.0`

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{combine_parts, VersionParser};
use regex::Regex;
use std::sync::LazyLock;

/// Node.js version specification parser
pub struct NodeVersionParser;

// Single comparator: optional operator followed by a (possibly partial) version
static COMPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\^|~>|~|>=|<=|>|<|=)?\s*v?(\d+(?:\.(?:\d+|[xX*])){0,2}(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)$",
    )
    .unwrap()
});
static WILDCARD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[xX*]$").unwrap());
static HYPHEN_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?(\d[\w.+-]*)\s+-\s+v?(\d[\w.+-]*)$").unwrap());
static OPERATOR_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\^|~>|~|>=|<=|>|<|=)\s+").unwrap());

const DIST_TAGS: [&str; 9] = [
    "latest",
    "next",
    "beta",
    "alpha",
    "canary",
    "rc",
    "experimental",
    "nightly",
    "insiders",
];

impl NodeVersionParser {
    fn parse_comparator(&self, comparator: &str) -> Option<VersionSpec> {
        if WILDCARD_RE.is_match(comparator) {
            return Some(VersionSpec::new(VersionSpecKind::Wildcard, comparator, ""));
        }

        let caps = COMPARATOR_RE.captures(comparator)?;
        let operator = caps.get(1).map(|m| m.as_str());
        let version = caps.get(2)?.as_str();
        let partial = version.split(['-', '+']).next().unwrap_or(version);
        let is_partial = partial.split('.').count() < 3
            || partial.contains(['x', 'X', '*']);

        let spec = match operator {
            Some("^") => VersionSpec::new(VersionSpecKind::Caret, comparator, version).with_operator("^"),
            Some("~") | Some("~>") => {
                VersionSpec::new(VersionSpecKind::Tilde, comparator, version).with_operator("~")
            }
            Some(op @ (">=" | ">")) => {
                VersionSpec::new(VersionSpecKind::LowerBound, comparator, version).with_operator(op)
            }
            Some(op @ ("<=" | "<")) => {
                VersionSpec::new(VersionSpecKind::UpperBound, comparator, version).with_operator(op)
            }
            _ if is_partial => {
                let prefix = partial.trim_end_matches(['.', 'x', 'X', '*']);
                VersionSpec::new(VersionSpecKind::Wildcard, comparator, prefix)
            }
            Some(op) => VersionSpec::new(VersionSpecKind::Exact, comparator, version).with_operator(op),
            None => VersionSpec::new(VersionSpecKind::Exact, comparator, version),
        };
        Some(spec)
    }
}

impl VersionParser for NodeVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        // Protocol prefixes wrap a regular range
        if let Some(rest) = trimmed.strip_prefix("workspace:") {
            let mut spec = match rest {
                "*" | "^" | "~" => VersionSpec::new(VersionSpecKind::Wildcard, rest, ""),
                _ => self.parse(rest)?,
            };
            spec.raw = trimmed.to_string();
            return Some(spec);
        }
        if let Some(rest) = trimmed.strip_prefix("npm:") {
            let range = rest.rsplit_once('@').map(|(_, r)| r).unwrap_or("");
            let mut spec = self.parse(range).unwrap_or_else(VersionSpec::any);
            spec.raw = trimmed.to_string();
            return Some(spec);
        }

        // Dist-tags resolve at install time
        if DIST_TAGS.contains(&trimmed) {
            return Some(VersionSpec::new(VersionSpecKind::Dynamic, trimmed, ""));
        }

        // Union (^1.0.0 || ^2.0.0)
        if trimmed.contains("||") {
            let alternatives: Option<Vec<VersionSpec>> =
                trimmed.split("||").map(|alt| self.parse(alt)).collect();
            let alternatives = alternatives?;
            let version = alternatives
                .first()
                .map(|s| s.version.clone())
                .unwrap_or_default();
            return Some(VersionSpec::new(VersionSpecKind::Range, trimmed, version));
        }

        // Hyphen range (1.0.0 - 2.0.0)
        if let Some(caps) = HYPHEN_RANGE_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(VersionSpec::new(VersionSpecKind::Range, trimmed, version));
        }

        // Space-separated comparator set (>=1.0.0 <2.0.0, ">= 1.0.0")
        let normalized = OPERATOR_GAP_RE.replace_all(trimmed, "$1");
        let comparators: Vec<&str> = normalized.split_whitespace().collect();
        if comparators.len() > 1 {
            let parts: Option<Vec<VersionSpec>> = comparators
                .iter()
                .map(|c| self.parse_comparator(c))
                .collect();
            return combine_parts(trimmed, parts?);
        }

        let mut spec = self.parse_comparator(&normalized)?;
        spec.raw = trimmed.to_string();
        Some(spec)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(version: &str) -> Option<VersionSpec> {
        NodeVersionParser.parse(version)
    }

    #[test]
    fn test_parse_exact() {
        let spec = parse("1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.raw, "1.2.3");
        assert!(spec.operator.is_none());
        assert!(spec.is_pinned());
    }

    #[test]
    fn test_parse_exact_with_prerelease() {
        let spec = parse("1.2.3-beta.1").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2.3-beta.1");
        assert!(spec.is_pinned());
        assert!(spec.is_unstable());
    }

    #[test]
    fn test_parse_exact_with_v_and_eq() {
        assert_eq!(parse("v1.2.3").unwrap().version, "1.2.3");
        let spec = parse("=1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.operator.as_deref(), Some("="));
    }

    #[test]
    fn test_parse_caret() {
        let spec = parse("^1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.operator, Some("^".to_string()));
        assert!(!spec.is_pinned());
    }

    #[test]
    fn test_parse_caret_partial() {
        let spec = parse("^1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.version, "1.2");
    }

    #[test]
    fn test_parse_tilde() {
        let spec = parse("~1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Tilde);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.operator, Some("~".to_string()));
    }

    #[test]
    fn test_parse_bounds() {
        let spec = parse(">=1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert_eq!(spec.operator, Some(">=".to_string()));
        assert!(spec.kind.is_unbounded());

        let spec = parse("<2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::UpperBound);
    }

    #[test]
    fn test_parse_operator_with_space() {
        let spec = parse(">= 1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.raw, ">= 1.2.3");
    }

    #[test]
    fn test_parse_range() {
        let spec = parse(">=1.0.0 <2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.raw, ">=1.0.0 <2.0.0");
        assert_eq!(spec.version, "1.0.0");
    }

    #[test]
    fn test_parse_hyphen_range() {
        let spec = parse("1.0.0 - 2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0.0");
    }

    #[test]
    fn test_parse_union() {
        let spec = parse("^1.0.0 || ^2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0.0");
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(parse("*").unwrap().kind, VersionSpecKind::Wildcard);
        assert_eq!(parse("x").unwrap().kind, VersionSpecKind::Wildcard);
        let spec = parse("1.x").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
        assert_eq!(spec.version, "1");
        assert_eq!(parse("1.2.*").unwrap().kind, VersionSpecKind::Wildcard);
        assert_eq!(parse("1.2").unwrap().kind, VersionSpecKind::Wildcard);
    }

    #[test]
    fn test_parse_dist_tag() {
        let spec = parse("latest").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Dynamic);
        assert!(spec.kind.is_unbounded());
    }

    #[test]
    fn test_parse_workspace_protocol() {
        let spec = parse("workspace:*").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
        assert_eq!(spec.raw, "workspace:*");

        let spec = parse("workspace:^1.4.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.version, "1.4.0");
    }

    #[test]
    fn test_parse_npm_alias() {
        let spec = parse("npm:string-width@^4.2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.version, "4.2.0");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("not-a-version").is_none());
        assert!(parse("git+https://github.com/a/b.git").is_none());
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(NodeVersionParser.ecosystem(), Ecosystem::Node);
    }
}
