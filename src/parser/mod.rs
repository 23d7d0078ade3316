//! Declared version constraint parsers for each package ecosystem
//!
//! This module provides parsers for version constraints in:
//! - Node.js (npm/yarn/pnpm/bun)
//! - Python (pip/poetry/uv/pipenv)
//! - Go (go mod)
//! - Ruby (bundler)
//! - JVM (Maven, Gradle, SBT)

mod go;
mod java;
mod node;
mod python;
mod ruby;

pub use go::{is_pseudo_version, GoVersionParser};
pub use java::JvmVersionParser;
pub use node::NodeVersionParser;
pub use python::PythonVersionParser;
pub use ruby::RubyVersionParser;

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};

/// Trait for parsing declared version constraints
pub trait VersionParser {
    /// Parse a version constraint string
    fn parse(&self, version_str: &str) -> Option<VersionSpec>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;
}

/// Get a version parser for the specified ecosystem
pub fn get_parser(ecosystem: Ecosystem) -> Box<dyn VersionParser> {
    match ecosystem {
        Ecosystem::Go => Box::new(GoVersionParser),
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => {
            Box::new(JvmVersionParser(ecosystem))
        }
        Ecosystem::Node => Box::new(NodeVersionParser),
        Ecosystem::Python => Box::new(PythonVersionParser),
        Ecosystem::Ruby => Box::new(RubyVersionParser),
    }
}

/// Parses a declared constraint, never failing
///
/// Missing or empty constraints become [`VersionSpec::any`]. Strings the
/// ecosystem grammar does not recognise are kept verbatim as a `Range`
/// when they carry a version number, otherwise as `Dynamic`.
pub fn parse_declared(ecosystem: Ecosystem, raw: Option<&str>) -> VersionSpec {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return VersionSpec::any(),
    };

    if let Some(spec) = get_parser(ecosystem).parse(raw) {
        return spec;
    }

    match first_version_token(raw) {
        Some(version) => VersionSpec::new(VersionSpecKind::Range, raw, version),
        None => VersionSpec::new(VersionSpecKind::Dynamic, raw, ""),
    }
}

/// Extracts the first dotted numeric token from a string
pub(crate) fn first_version_token(s: &str) -> Option<String> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let token: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect();
    let token = token.trim_end_matches(['.', '-']).to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Folds the parts of a compound constraint (`>=1.0, <2.0`) into one spec
///
/// A pessimistic or exact part dominates; otherwise a mix of lower and upper
/// bounds is a `Range`, and a list of only lower (or only upper) bounds keeps
/// that kind. The reference version is taken from the first lower bound.
pub(crate) fn combine_parts(raw: &str, parts: Vec<VersionSpec>) -> Option<VersionSpec> {
    if parts.is_empty() {
        return None;
    }
    if parts.len() == 1 {
        let mut only = parts.into_iter().next()?;
        only.raw = raw.to_string();
        return Some(only);
    }

    let raw_owned = raw.to_string();
    for dominant in [VersionSpecKind::Pessimistic, VersionSpecKind::Exact] {
        if let Some(p) = parts.iter().find(|p| p.kind == dominant) {
            let mut spec = p.clone();
            spec.raw = raw_owned;
            return Some(spec);
        }
    }

    let is_lower = |k: VersionSpecKind| {
        matches!(
            k,
            VersionSpecKind::LowerBound | VersionSpecKind::Caret | VersionSpecKind::Tilde
        )
    };
    let is_upper = |k: VersionSpecKind| {
        matches!(
            k,
            VersionSpecKind::UpperBound
                | VersionSpecKind::Caret
                | VersionSpecKind::Tilde
                | VersionSpecKind::Range
        )
    };

    let has_lower = parts.iter().any(|p| is_lower(p.kind));
    let has_upper = parts.iter().any(|p| is_upper(p.kind));
    let reference = parts
        .iter()
        .find(|p| is_lower(p.kind))
        .or_else(|| parts.first())
        .map(|p| p.version.clone())
        .unwrap_or_default();

    let kind = if has_lower && has_upper {
        VersionSpecKind::Range
    } else if parts.iter().all(|p| p.kind == VersionSpecKind::UpperBound) {
        VersionSpecKind::UpperBound
    } else if has_lower {
        VersionSpecKind::LowerBound
    } else {
        VersionSpecKind::Range
    };

    Some(VersionSpec::new(kind, raw_owned, reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parser_ecosystems() {
        for eco in Ecosystem::all() {
            assert_eq!(get_parser(*eco).ecosystem(), *eco);
        }
    }

    #[test]
    fn test_parse_declared_missing() {
        assert_eq!(parse_declared(Ecosystem::Ruby, None).kind, VersionSpecKind::Any);
        assert_eq!(parse_declared(Ecosystem::Node, Some("  ")).kind, VersionSpecKind::Any);
    }

    #[test]
    fn test_parse_declared_unrecognised() {
        let spec = parse_declared(Ecosystem::Node, Some("github:user/repo"));
        assert_eq!(spec.kind, VersionSpecKind::Dynamic);
        assert_eq!(spec.raw, "github:user/repo");

        let spec = parse_declared(Ecosystem::Node, Some("1.2.3 || garbage"));
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.2.3");
    }

    #[test]
    fn test_first_version_token() {
        assert_eq!(first_version_token(">=1.2.3,<2"), Some("1.2.3".to_string()));
        assert_eq!(first_version_token("latest"), None);
    }

    #[test]
    fn test_combine_lower_and_upper() {
        let parts = vec![
            VersionSpec::new(VersionSpecKind::LowerBound, ">=1.0", "1.0"),
            VersionSpec::new(VersionSpecKind::UpperBound, "<2.0", "2.0"),
        ];
        let spec = combine_parts(">=1.0, <2.0", parts).unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0");
        assert_eq!(spec.raw, ">=1.0, <2.0");
    }

    #[test]
    fn test_combine_pessimistic_dominates() {
        let parts = vec![
            VersionSpec::new(VersionSpecKind::Pessimistic, "~> 1.2", "1.2"),
            VersionSpec::new(VersionSpecKind::LowerBound, ">= 1.2.3", "1.2.3"),
        ];
        let spec = combine_parts("~> 1.2, >= 1.2.3", parts).unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Pessimistic);
        assert_eq!(spec.version, "1.2");
    }

    #[test]
    fn test_combine_only_lower() {
        let parts = vec![
            VersionSpec::new(VersionSpecKind::LowerBound, ">=1.0", "1.0"),
            VersionSpec::new(VersionSpecKind::Wildcard, "!=1.5", "1.5"),
        ];
        let spec = combine_parts(">=1.0,!=1.5", parts).unwrap();
        assert_eq!(spec.kind, VersionSpecKind::LowerBound);
        assert!(spec.kind.is_unbounded());
    }
}
