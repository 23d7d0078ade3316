//! Version comparison strategies for each package ecosystem
//!
//! This module provides comparators for:
//! - SemVer-family versions (npm and friends)
//! - Go module versions (pseudo-versions, `+incompatible`, `/vN` paths)
//! - PEP 440 (Python)
//! - RubyGems (with `~>` compatibility)
//! - Maven-style JVM versions (Maven, Gradle, SBT)
//!
//! Every comparator reduces a version to numeric release components plus an
//! optional pre-release tag. Absent trailing components count as zero, so
//! `1.2` equals `1.2.0`.

mod go;
mod jvm;
mod pep440;
mod ruby;
mod semantic;

pub use go::GoComparator;
pub use jvm::JvmComparator;
pub use pep440::Pep440Comparator;
pub use ruby::{pessimistic_constraint, RubyComparator};
pub use semantic::SemverComparator;

use crate::domain::{Compatibility, Direction, Ecosystem, SemverType, VersionDiff};
use std::cmp::Ordering;

/// Trait for comparing two versions of one coordinate
pub trait VersionComparator: Send + Sync {
    /// Returns the ecosystem this comparator handles
    fn ecosystem(&self) -> Ecosystem;

    /// Total order over version strings
    fn order(&self, a: &str, b: &str) -> Ordering;

    /// Classifies the change from `from` to `to`
    fn compare(&self, from: &str, to: &str) -> VersionDiff;
}

/// Get a version comparator for the specified ecosystem
pub fn get_comparator(ecosystem: Ecosystem) -> Box<dyn VersionComparator> {
    match ecosystem {
        Ecosystem::Go => Box::new(GoComparator),
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => Box::new(JvmComparator(ecosystem)),
        Ecosystem::Node => Box::new(SemverComparator),
        Ecosystem::Python => Box::new(Pep440Comparator),
        Ecosystem::Ruby => Box::new(RubyComparator),
    }
}

/// Numeric release components with an optional pre-release tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Release {
    pub parts: Vec<u64>,
    pub pre: Option<String>,
}

impl Release {
    pub fn component(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u64 {
        self.component(0)
    }

    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    pub fn patch(&self) -> u64 {
        self.component(2)
    }
}

/// Compares release components, padding the shorter side with zeros
pub(crate) fn cmp_parts(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Which release component differs first; anything past minor is a patch
pub(crate) fn release_change(a: &[u64], b: &[u64]) -> Option<SemverType> {
    let len = a.len().max(b.len());
    let index = (0..len).find(|&i| a.get(i).copied().unwrap_or(0) != b.get(i).copied().unwrap_or(0))?;
    Some(match index {
        0 => SemverType::Major,
        1 => SemverType::Minor,
        _ => SemverType::Patch,
    })
}

pub(crate) fn direction(order: Ordering) -> Direction {
    match order {
        Ordering::Less => Direction::Upgrade,
        Ordering::Greater => Direction::Downgrade,
        Ordering::Equal => Direction::Same,
    }
}

/// Change type for two parsed releases
pub(crate) fn classify(from: &Release, to: &Release) -> SemverType {
    release_change(&from.parts, &to.parts).unwrap_or(if from.pre != to.pre {
        SemverType::Prerelease
    } else {
        SemverType::Unknown
    })
}

/// Diff for versions the grammar could not parse
///
/// Identical strings compare as unchanged; otherwise the change type is
/// unknown and the direction falls back to string order.
pub(crate) fn unparsed_diff(ecosystem: Ecosystem, from: &str, to: &str) -> VersionDiff {
    let direction = direction(from.cmp(to));
    let mut diff = VersionDiff::new(ecosystem, from, to, SemverType::Unknown, direction);
    if from != to {
        diff.compatibility = Compatibility {
            notes: vec![format!(
                "could not parse {} versions '{}' and '{}'; change type unknown",
                ecosystem, from, to
            )],
            ..Default::default()
        };
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_comparator() {
        assert_eq!(get_comparator(Ecosystem::Go).ecosystem(), Ecosystem::Go);
        assert_eq!(get_comparator(Ecosystem::Sbt).ecosystem(), Ecosystem::Sbt);
        assert_eq!(get_comparator(Ecosystem::Python).ecosystem(), Ecosystem::Python);
    }

    #[test]
    fn test_release_change() {
        assert_eq!(release_change(&[1, 2], &[1, 2, 0]), None);
        assert_eq!(release_change(&[1, 2, 3], &[2, 0, 0]), Some(SemverType::Major));
        assert_eq!(release_change(&[1, 2, 3, 4], &[1, 2, 3, 5]), Some(SemverType::Patch));
    }

    #[test]
    fn test_cmp_parts_pads_with_zero() {
        assert_eq!(cmp_parts(&[1, 2], &[1, 2, 0]), Ordering::Equal);
        assert_eq!(cmp_parts(&[1, 2], &[1, 2, 1]), Ordering::Less);
    }

    #[test]
    fn test_identical_versions_unchanged_everywhere() {
        let samples = [
            (Ecosystem::Go, "v1.4.0"),
            (Ecosystem::Maven, "5.3.20"),
            (Ecosystem::Node, "18.2.0"),
            (Ecosystem::Python, "2.31.0"),
            (Ecosystem::Ruby, "7.1.2"),
            (Ecosystem::Node, "not-a-version"),
        ];
        for (eco, v) in samples {
            let diff = get_comparator(eco).compare(v, v);
            assert_eq!(diff.semver_type, SemverType::Unknown, "{} {}", eco, v);
            assert_eq!(diff.direction, Direction::Same);
            assert!(!diff.major_change && !diff.minor_change && !diff.patch_change);
        }
    }

    #[test]
    fn test_comparison_is_antisymmetric() {
        let pairs = [
            (Ecosystem::Go, "v1.8.1", "v2.0.0"),
            (Ecosystem::Maven, "5.3.20", "5.3.27"),
            (Ecosystem::Node, "1.2.0-beta.1", "1.2.0"),
            (Ecosystem::Python, "1.0.post1", "1.0.post2"),
            (Ecosystem::Ruby, "1.2.3", "1.3.0"),
        ];
        for (eco, a, b) in pairs {
            let comparator = get_comparator(eco);
            let forward = comparator.compare(a, b);
            let backward = comparator.compare(b, a);
            assert_eq!(forward.semver_type, backward.semver_type, "{} {} {}", eco, a, b);
            assert_eq!(forward.major_change, backward.major_change);
            assert_eq!(forward.minor_change, backward.minor_change);
            assert_eq!(forward.patch_change, backward.patch_change);
            assert_eq!(forward.direction, Direction::Upgrade);
            assert_eq!(backward.direction, forward.direction.reversed());
        }
    }

    #[test]
    fn test_trailing_zero_equivalence() {
        for eco in Ecosystem::all() {
            let comparator = get_comparator(*eco);
            assert_eq!(comparator.order("1.2", "1.2.0"), Ordering::Equal, "{}", eco);
            assert!(!comparator.compare("1.2", "1.2.0").has_change());
        }
    }
}
