//! SemVer-family comparator (npm and other `major.minor.patch[-pre]` schemes)

use super::{classify, cmp_parts, direction, unparsed_diff, Release, VersionComparator};
use crate::domain::{Ecosystem, VersionDiff};
use std::cmp::Ordering;

/// Parses `[v]major[.minor[.patch...]][-pre][+build]`
///
/// Build metadata is ignored. A leading `=` or `v` is accepted.
pub(crate) fn parse_release(version: &str) -> Option<Release> {
    let trimmed = version.trim().trim_start_matches('=');
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let without_build = trimmed.split_once('+').map_or(trimmed, |(core, _)| core);
    let (core, pre) = match without_build.split_once('-') {
        Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
        Some(_) => return None,
        None => (without_build, None),
    };
    if core.is_empty() {
        return None;
    }
    let parts = core
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some(Release { parts, pre })
}

/// Orders pre-release tags: a release sorts after any of its pre-releases
pub(crate) fn cmp_prerelease(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match (::semver::Prerelease::new(x), ::semver::Prerelease::new(y)) {
            (Ok(px), Ok(py)) => px.cmp(&py),
            _ => x.cmp(y),
        },
    }
}

pub(crate) fn cmp_release(a: &Release, b: &Release) -> Ordering {
    cmp_parts(&a.parts, &b.parts).then_with(|| cmp_prerelease(a.pre.as_deref(), b.pre.as_deref()))
}

/// Comparator for SemVer-style versions
pub struct SemverComparator;

impl VersionComparator for SemverComparator {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Node
    }

    fn order(&self, a: &str, b: &str) -> Ordering {
        match (parse_release(a), parse_release(b)) {
            (Some(x), Some(y)) => cmp_release(&x, &y),
            _ => a.cmp(b),
        }
    }

    fn compare(&self, from: &str, to: &str) -> VersionDiff {
        let (Some(a), Some(b)) = (parse_release(from), parse_release(to)) else {
            return unparsed_diff(self.ecosystem(), from, to);
        };
        VersionDiff::new(
            self.ecosystem(),
            from,
            to,
            classify(&a, &b),
            direction(cmp_release(&a, &b)),
        )
    }
}
