//! JVM (Maven/Gradle/SBT) version specification parser
//!
//! Handles:
//! - Fixed versions: `1.2.3`, `1.2.3-SNAPSHOT`, `5.3.2.RELEASE`
//! - Strict versions: `1.2.3!!` (Gradle)
//! - Prefix versions: `1.2.+`, `+`
//! - Dynamic versions: `latest.release`, `latest.integration`, `RELEASE`, `LATEST`
//! - Maven/Ivy ranges: `[1.0,2.0]`, `[1.0,)`, `(,2.0]`, `[1.0,2.0[`, `[1.0]`
//!
//! Note: Variable references (e.g., `$version`, `${version}`)
//! are resolved by the manifest parser.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// Parser for JVM version specifications, shared by the three build tools
pub struct JvmVersionParser(pub Ecosystem);

// Standard version: 1.2.3 or 1.2.3-SNAPSHOT or 1.2.3.RELEASE
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)*)$").unwrap());

// Gradle strict version: 1.2.3!!
static STRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)*)!!$").unwrap());

// Prefix version: 1.2.+ or 1.+ or +
static PREFIX_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+(?:\.\d+)*)\.)?\+$").unwrap());

// Dynamic versions
static DYNAMIC_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:latest\.(?:release|integration|milestone)|RELEASE|LATEST)$").unwrap()
});

// Range bound: a version with optional qualifiers
const BOUND: &str = r"\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)*";

// Single Maven/Ivy range: [lower,upper] with any mix of [ ] ( ) as delimiters
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[\[\]\(]\s*({b})?\s*,\s*({b})?\s*[\]\[\)]$",
        b = BOUND
    ))
    .unwrap()
});

// Hard requirement: [1.0]
static HARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\[\s*({})\s*\]$", BOUND)).unwrap());

// Union of ranges: [1.0,1.5),(1.5,)
static UNION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\[\(].*[\]\)]\s*,\s*[\[\(].*[\]\)]$").unwrap());

impl VersionParser for JvmVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        // [1.0] pins exactly
        if let Some(caps) = HARD_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(VersionSpec::new(VersionSpecKind::Exact, trimmed, version));
        }

        // Single range: [1.0,2.0], [1.0,), (,2.0]
        if let Some(caps) = RANGE_RE.captures(trimmed) {
            let lower = caps.get(1).map(|m| m.as_str());
            let upper = caps.get(2).map(|m| m.as_str());
            let (kind, version) = match (lower, upper) {
                (Some(l), Some(_)) => (VersionSpecKind::Range, l),
                (Some(l), None) => (VersionSpecKind::LowerBound, l),
                (None, Some(u)) => (VersionSpecKind::UpperBound, u),
                (None, None) => (VersionSpecKind::Any, ""),
            };
            return Some(VersionSpec::new(kind, trimmed, version));
        }

        // Union of ranges
        if UNION_RE.is_match(trimmed) {
            let version = super::first_version_token(trimmed).unwrap_or_default();
            return Some(VersionSpec::new(VersionSpecKind::Range, trimmed, version));
        }

        // Prefix version: 1.2.+
        if let Some(caps) = PREFIX_VERSION_RE.captures(trimmed) {
            let version = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            return Some(VersionSpec::new(
                VersionSpecKind::Wildcard,
                trimmed,
                version,
            ));
        }

        // Dynamic version: latest.release, latest.integration
        if DYNAMIC_VERSION_RE.is_match(trimmed) {
            return Some(VersionSpec::new(VersionSpecKind::Dynamic, trimmed, ""));
        }

        // Strict version: 1.2.3!!
        if let Some(caps) = STRICT_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(
                VersionSpec::new(VersionSpecKind::Exact, trimmed, version).with_operator("!!"),
            );
        }

        // Standard version (including qualifiers)
        if let Some(caps) = VERSION_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(VersionSpec::new(VersionSpecKind::Exact, trimmed, version));
        }

        None
    }

    fn ecosystem(&self) -> Ecosystem {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(version: &str) -> Option<VersionSpec> {
        JvmVersionParser(Ecosystem::Gradle).parse(version)
    }

    #[test]
    fn test_parse_simple_version() {
        let spec = parse("1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2.3");
        assert!(spec.is_pinned());
    }

    #[test]
    fn test_parse_major_minor() {
        let spec = parse("1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2");
    }

    #[test]
    fn test_parse_qualifiers() {
        let spec = parse("1.2.3-SNAPSHOT").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert!(spec.is_unstable());

        let spec = parse("5.3.2.RELEASE").unwrap();
        assert_eq!(spec.version, "5.3.2.RELEASE");
        assert!(!spec.is_unstable());

        let spec = parse("31.1-jre").unwrap();
        assert_eq!(spec.version, "31.1-jre");
    }

    #[test]
    fn test_parse_strict() {
        let spec = parse("2.0.1!!").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "2.0.1");
        assert_eq!(spec.operator.as_deref(), Some("!!"));
    }

    #[test]
    fn test_parse_prefix_version() {
        let spec = parse("1.2.+").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
        assert_eq!(spec.version, "1.2");

        let spec = parse("+").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
        assert_eq!(spec.version, "");
    }

    #[test]
    fn test_parse_dynamic() {
        assert_eq!(parse("latest.release").unwrap().kind, VersionSpecKind::Dynamic);
        assert_eq!(parse("latest.integration").unwrap().kind, VersionSpecKind::Dynamic);
        assert_eq!(parse("LATEST").unwrap().kind, VersionSpecKind::Dynamic);
    }

    #[test]
    fn test_parse_bounded_range() {
        let spec = parse("[1.0,2.0)").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0");
    }

    #[test]
    fn test_parse_open_ranges() {
        let spec = parse("[1.0,)").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert_eq!(spec.version, "1.0");

        let spec = parse("(,2.0]").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::UpperBound);
        assert_eq!(spec.version, "2.0");
    }

    #[test]
    fn test_parse_ivy_range() {
        let spec = parse("[1.0,2.0[").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
    }

    #[test]
    fn test_parse_hard_requirement() {
        let spec = parse("[1.5]").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.5");
    }

    #[test]
    fn test_parse_union() {
        let spec = parse("[1.0,1.5),(1.5,)").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("").is_none());
        assert!(parse("$springVersion").is_none());
        assert!(parse("abc").is_none());
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(JvmVersionParser(Ecosystem::Sbt).ecosystem(), Ecosystem::Sbt);
    }
}
