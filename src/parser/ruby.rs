//! Ruby version specification parser
//!
//! Handles:
//! - Fixed versions: `= 1.2.3`, `1.2.3`
//! - Pessimistic constraints: `~> 1.2`, `~> 1.2.3`
//! - Comparison operators: `>=`, `<`, `>`, `<=`, `!=`
//! - Compound constraints: `>= 1.0, < 2.0`, `~> 7.1, >= 7.1.2`

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{combine_parts, VersionParser};
use regex::Regex;
use std::sync::LazyLock;

/// Parser for Ruby version specifications
pub struct RubyVersionParser;

// Operator (optional) plus a gem version; Ruby allows a space between them
// and letters in later segments (`7.1.0.rc1`, `2.0.0.pre`)
static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(~>|>=|<=|!=|>|<|=)?\s*(\d+(?:\.[0-9A-Za-z]+)*(?:-[0-9A-Za-z.]+)?)$").unwrap()
});

impl RubyVersionParser {
    /// Parse a single version constraint (not compound)
    fn parse_single(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim().trim_matches(['\'', '"']).trim();

        if trimmed.is_empty() {
            return None;
        }

        let caps = CONSTRAINT_RE.captures(trimmed)?;
        let operator = caps.get(1).map(|m| m.as_str());
        let version = caps.get(2)?.as_str();

        let spec = match operator {
            Some("~>") => {
                VersionSpec::new(VersionSpecKind::Pessimistic, trimmed, version).with_operator("~>")
            }
            Some("=") => VersionSpec::new(VersionSpecKind::Exact, trimmed, version).with_operator("="),
            Some(op @ (">=" | ">")) => {
                VersionSpec::new(VersionSpecKind::LowerBound, trimmed, version).with_operator(op)
            }
            Some(op @ ("<=" | "<")) => {
                VersionSpec::new(VersionSpecKind::UpperBound, trimmed, version).with_operator(op)
            }
            Some("!=") => {
                VersionSpec::new(VersionSpecKind::Wildcard, trimmed, version).with_operator("!=")
            }
            _ => VersionSpec::new(VersionSpecKind::Exact, trimmed, version),
        };
        Some(spec)
    }
}

impl VersionParser for RubyVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        let parts: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() > 1 {
            let specs: Option<Vec<VersionSpec>> =
                parts.iter().map(|p| self.parse_single(p)).collect();
            return combine_parts(trimmed, specs?);
        }

        let mut spec = self.parse_single(trimmed)?;
        spec.raw = trimmed.to_string();
        Some(spec)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(version: &str) -> Option<VersionSpec> {
        RubyVersionParser.parse(version)
    }

    #[test]
    fn test_parse_pessimistic() {
        let spec = parse("~> 1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Pessimistic);
        assert_eq!(spec.version, "1.2");
        assert_eq!(spec.operator.as_deref(), Some("~>"));
        assert!(!spec.is_pinned());
        assert!(!spec.kind.is_unbounded());
    }

    #[test]
    fn test_parse_pessimistic_no_space() {
        let spec = parse("~>7.1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Pessimistic);
        assert_eq!(spec.version, "7.1.2");
    }

    #[test]
    fn test_parse_exact() {
        let spec = parse("= 1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert!(spec.is_pinned());

        let spec = parse("1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert!(spec.operator.is_none());
    }

    #[test]
    fn test_parse_lower_bound() {
        let spec = parse(">= 2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert!(spec.kind.is_unbounded());
    }

    #[test]
    fn test_parse_compound_range() {
        let spec = parse(">= 1.0, < 2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0");
        assert_eq!(spec.raw, ">= 1.0, < 2.0");
    }

    #[test]
    fn test_parse_compound_pessimistic() {
        let spec = parse("~> 7.1, >= 7.1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Pessimistic);
        assert_eq!(spec.version, "7.1");
    }

    #[test]
    fn test_parse_quoted_parts() {
        let spec = parse("'>= 1.0', '< 2.0'").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
    }

    #[test]
    fn test_parse_prerelease_gem() {
        let spec = parse("7.1.0.rc1").unwrap();
        assert_eq!(spec.version, "7.1.0.rc1");
        assert!(spec.is_unstable());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("").is_none());
        assert!(parse("~> abc").is_none());
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(RubyVersionParser.ecosystem(), Ecosystem::Ruby);
    }
}
