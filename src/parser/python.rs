//! Python (pip/poetry/uv/pipenv) version specification parser
//!
//! Handles version formats:
//! - Exact: `==1.2.3`, `===1.2.3`, bare `1.2.3` (Poetry)
//! - Caret: `^1.2.3` (Poetry)
//! - Tilde: `~1.2.3` (Poetry), `~=1.2.3` (compatible release)
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `!=1.2.3`
//! - Wildcard: `*`, `==1.*`
//! - Compound: `>=1.0,<2.0`, `>=1.0, !=1.5`

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{combine_parts, VersionParser};
use regex::Regex;
use std::sync::LazyLock;

/// Python version specification parser
pub struct PythonVersionParser;

// One PEP 440 clause; the version part allows epoch, pre/post/dev and local segments
static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(===|==|~=|!=|>=|<=|>|<|\^|~)?\s*v?((?:\d+!)?\d+(?:\.\d+)*(?:\.\*)?(?:[._-]?(?:a|b|c|rc|alpha|beta|pre|preview)[._-]?\d*)?(?:[._-]?(?:post|rev|r)[._-]?\d*)?(?:[._-]?dev[._-]?\d*)?(?:\+[a-zA-Z0-9.]+)?)$",
    )
    .unwrap()
});

impl PythonVersionParser {
    fn parse_clause(&self, clause: &str) -> Option<VersionSpec> {
        let clause = clause.trim();
        if clause == "*" {
            return Some(VersionSpec::new(VersionSpecKind::Wildcard, clause, ""));
        }

        let caps = CLAUSE_RE.captures(clause)?;
        let operator = caps.get(1).map(|m| m.as_str());
        let version = caps.get(2)?.as_str();

        if version.ends_with(".*") {
            let prefix = version.trim_end_matches(".*");
            return Some(VersionSpec::new(VersionSpecKind::Wildcard, clause, prefix));
        }

        let spec = match operator {
            Some(op @ ("==" | "===")) => {
                VersionSpec::new(VersionSpecKind::Exact, clause, version).with_operator(op)
            }
            Some("^") => VersionSpec::new(VersionSpecKind::Caret, clause, version).with_operator("^"),
            Some(op @ ("~=" | "~")) => {
                VersionSpec::new(VersionSpecKind::Tilde, clause, version).with_operator(op)
            }
            Some(op @ (">=" | ">")) => {
                VersionSpec::new(VersionSpecKind::LowerBound, clause, version).with_operator(op)
            }
            Some(op @ ("<=" | "<")) => {
                VersionSpec::new(VersionSpecKind::UpperBound, clause, version).with_operator(op)
            }
            // An exclusion alone places no bound on what may be installed
            Some("!=") => {
                VersionSpec::new(VersionSpecKind::Wildcard, clause, version).with_operator("!=")
            }
            _ => VersionSpec::new(VersionSpecKind::Exact, clause, version),
        };
        Some(spec)
    }
}

impl VersionParser for PythonVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        let clauses: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        if clauses.len() > 1 {
            let parts: Option<Vec<VersionSpec>> =
                clauses.iter().map(|c| self.parse_clause(c)).collect();
            return combine_parts(trimmed, parts?);
        }

        let mut spec = self.parse_clause(trimmed)?;
        spec.raw = trimmed.to_string();
        Some(spec)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(version: &str) -> Option<VersionSpec> {
        PythonVersionParser.parse(version)
    }

    #[test]
    fn test_parse_exact() {
        let spec = parse("==1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.operator, Some("==".to_string()));
        assert!(spec.is_pinned());
    }

    #[test]
    fn test_parse_bare_is_exact() {
        let spec = parse("2.31.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert!(spec.operator.is_none());
    }

    #[test]
    fn test_parse_caret_and_tilde() {
        let spec = parse("^1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);

        let spec = parse("~1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Tilde);
        assert_eq!(spec.operator.as_deref(), Some("~"));
    }

    #[test]
    fn test_parse_compatible_release() {
        let spec = parse("~=1.4.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Tilde);
        assert_eq!(spec.version, "1.4.2");
        assert_eq!(spec.operator.as_deref(), Some("~="));
    }

    #[test]
    fn test_parse_lower_bound() {
        let spec = parse(">=2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert!(spec.kind.is_unbounded());

        let spec = parse(">= 2.0").unwrap();
        assert_eq!(spec.version, "2.0");
    }

    #[test]
    fn test_parse_range() {
        let spec = parse(">=1.0,<2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0");
        assert_eq!(spec.raw, ">=1.0,<2.0");
    }

    #[test]
    fn test_parse_exclusion_keeps_unbounded() {
        let spec = parse(">=1.0, !=1.5.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(parse("*").unwrap().kind, VersionSpecKind::Wildcard);
        let spec = parse("==3.*").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
        assert_eq!(spec.version, "3");
    }

    #[test]
    fn test_parse_pep440_segments() {
        let spec = parse("==2.0.0rc1").unwrap();
        assert_eq!(spec.version, "2.0.0rc1");
        assert!(spec.is_unstable());

        assert_eq!(parse("==1.0.post2").unwrap().version, "1.0.post2");
        assert_eq!(parse("==1!2.0").unwrap().version, "1!2.0");
        assert_eq!(parse(">=1.0.dev3").unwrap().version, "1.0.dev3");
        assert_eq!(parse("==1.0+local.7").unwrap().version, "1.0+local.7");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("").is_none());
        assert!(parse("latest").is_none());
        assert!(parse(">=1.0,banana").is_none());
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(PythonVersionParser.ecosystem(), Ecosystem::Python);
    }
}
