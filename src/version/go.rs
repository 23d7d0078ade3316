//! Go module version comparator

use super::semantic::{cmp_release, parse_release};
use super::{classify, direction, unparsed_diff, Release, VersionComparator};
use crate::domain::{Compatibility, Ecosystem, SemverType, VersionDiff};
use crate::parser::is_pseudo_version;
use std::cmp::Ordering;

const INCOMPATIBLE: &str = "+incompatible";

pub struct GoComparator;

struct GoVersion {
    release: Release,
    pseudo: bool,
    incompatible: bool,
}

fn parse(version: &str) -> Option<GoVersion> {
    let trimmed = version.trim();
    let (base, incompatible) = match trimmed.strip_suffix(INCOMPATIBLE) {
        Some(base) => (base, true),
        None => (trimmed, false),
    };
    Some(GoVersion {
        release: parse_release(base)?,
        pseudo: is_pseudo_version(base),
        incompatible,
    })
}

/// Module path suffix a major version needs (`/v2` and up)
pub(crate) fn major_suffix(major: u64) -> Option<String> {
    (major >= 2).then(|| format!("/v{}", major))
}

fn compatibility(from: &GoVersion, to: &GoVersion, semver_type: SemverType) -> Compatibility {
    let mut compat = Compatibility {
        from_pseudo_version: Some(from.pseudo),
        to_pseudo_version: Some(to.pseudo),
        incompatible: Some(from.incompatible || to.incompatible),
        ..Default::default()
    };

    if semver_type == SemverType::Major {
        let from_suffix = major_suffix(from.release.major());
        let to_suffix = major_suffix(to.release.major());
        // +incompatible modules keep the unsuffixed path
        let path_changes = from_suffix != to_suffix && !to.incompatible;
        compat.requires_import_path_change = Some(path_changes);
        compat.import_path_suffix = to_suffix.clone();
        if let (true, Some(to_s)) = (path_changes, &to_suffix) {
            compat.notes.push(format!(
                "major version {} lives at a new module path: append {} to the module path and update every import",
                to.release.major(),
                to_s
            ));
        } else if let (true, Some(from_s)) = (path_changes, &from_suffix) {
            compat.notes.push(format!(
                "major version {} drops the {} module path suffix: update every import",
                to.release.major(),
                from_s
            ));
        } else if to.incompatible {
            compat.notes.push(format!(
                "v{} is published without go.mod (+incompatible); the import path stays the same",
                to.release.major()
            ));
        }
    }

    if from.pseudo || to.pseudo {
        compat.notes.push(
            "pseudo-version pins an untagged commit; prefer a tagged release".to_string(),
        );
    }
    compat
}

impl VersionComparator for GoComparator {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn order(&self, a: &str, b: &str) -> Ordering {
        match (parse(a), parse(b)) {
            (Some(x), Some(y)) => cmp_release(&x.release, &y.release),
            _ => a.cmp(b),
        }
    }

    fn compare(&self, from: &str, to: &str) -> VersionDiff {
        let (Some(a), Some(b)) = (parse(from), parse(to)) else {
            return unparsed_diff(Ecosystem::Go, from, to);
        };
        let semver_type = classify(&a.release, &b.release);
        VersionDiff::new(
            Ecosystem::Go,
            from,
            to,
            semver_type,
            direction(cmp_release(&a.release, &b.release)),
        )
        .with_compatibility(compatibility(&a, &b, semver_type))
    }
}
