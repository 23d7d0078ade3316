//! Maven-style version comparator shared by Maven, Gradle and SBT
//!
//! Leading numeric segments form the release; the rest is a qualifier
//! ordered `alpha < beta < milestone < rc < snapshot < release < sp`.
//! `Final`, `GA` and `RELEASE` qualifiers are the release itself, and
//! unknown qualifiers such as `jre` or `android` are flavours of it.

use super::{classify, cmp_parts, direction, unparsed_diff, Release, VersionComparator};
use crate::domain::{Compatibility, Ecosystem, VersionDiff};
use std::cmp::Ordering;

pub struct JvmComparator(pub Ecosystem);

const RELEASE_RANK: u8 = 5;

fn parse(version: &str) -> Option<Release> {
    let trimmed = version.trim();
    let mut parts = Vec::new();
    let mut qualifier = Vec::new();
    for token in trimmed.split(['.', '-']) {
        match token.parse::<u64>() {
            Ok(n) if qualifier.is_empty() => parts.push(n),
            _ if token.is_empty() => return None,
            _ => qualifier.push(token.to_ascii_lowercase()),
        }
    }
    if parts.is_empty() {
        return None;
    }
    let qualifier = qualifier.join("-");
    let pre = match qualifier.as_str() {
        "" | "ga" | "final" | "release" => None,
        _ => Some(qualifier),
    };
    Some(Release { parts, pre })
}

/// `(rank, number)` for a qualifier such as `rc2` or `m1`
fn qualifier_key(qualifier: Option<&str>) -> (u8, u64) {
    let Some(q) = qualifier else {
        return (RELEASE_RANK, 0);
    };
    let first = q.split('-').next().unwrap_or(q);
    let split = first
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(first.len());
    let (label, digits) = first.split_at(split);
    // `beta-2`: number in the next token
    let number = digits
        .parse()
        .ok()
        .or_else(|| q.split('-').nth(1).and_then(|t| t.parse().ok()))
        .unwrap_or(0);
    let rank = match label {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "sp" => 6,
        _ => RELEASE_RANK,
    };
    (rank, number)
}

fn cmp_release(a: &Release, b: &Release) -> Ordering {
    cmp_parts(&a.parts, &b.parts)
        .then_with(|| qualifier_key(a.pre.as_deref()).cmp(&qualifier_key(b.pre.as_deref())))
        .then_with(|| a.pre.cmp(&b.pre))
}

fn is_snapshot(release: &Release) -> bool {
    release.pre.as_deref().is_some_and(|q| q.contains("snapshot"))
}

impl VersionComparator for JvmComparator {
    fn ecosystem(&self) -> Ecosystem {
        self.0
    }

    fn order(&self, a: &str, b: &str) -> Ordering {
        match (parse(a), parse(b)) {
            (Some(x), Some(y)) => cmp_release(&x, &y),
            _ => a.cmp(b),
        }
    }

    fn compare(&self, from: &str, to: &str) -> VersionDiff {
        let (Some(a), Some(b)) = (parse(from), parse(to)) else {
            return unparsed_diff(self.0, from, to);
        };
        let mut compat = Compatibility::default();
        if is_snapshot(&b) {
            compat
                .notes
                .push(format!("{} is a SNAPSHOT; builds against it are not reproducible", to));
        }
        VersionDiff::new(self.0, from, to, classify(&a, &b), direction(cmp_release(&a, &b)))
            .with_compatibility(compat)
    }
}
