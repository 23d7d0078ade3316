//! RubyGems version comparator
//!
//! Gem versions are dot-separated segments; the first segment containing a
//! letter starts the pre-release part (`1.2.0.rc1`, `2.0.0.pre`). A `-` is
//! read as `.pre.` the way RubyGems does.

use super::{classify, cmp_parts, direction, unparsed_diff, Release, VersionComparator};
use crate::domain::{Compatibility, Ecosystem, VersionDiff};
use std::cmp::Ordering;

pub struct RubyComparator;

fn parse(version: &str) -> Option<Release> {
    let normalized = version.trim().replace('-', ".pre.");
    let mut parts = Vec::new();
    let mut pre = Vec::new();
    for segment in normalized.split('.') {
        if segment.is_empty() {
            return None;
        }
        match segment.parse::<u64>() {
            Ok(n) if pre.is_empty() => parts.push(n),
            _ if segment.chars().all(|c| c.is_ascii_alphanumeric()) => pre.push(segment),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(Release {
        parts,
        pre: (!pre.is_empty()).then(|| pre.join(".")),
    })
}

// Pre-release segments compare numerically when both are numbers, otherwise
// as strings; numbers sort after letters
fn cmp_pre(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let mut xs = x.split('.');
            let mut ys = y.split('.');
            loop {
                match (xs.next(), ys.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(p), Some(q)) => {
                        let order = match (p.parse::<u64>(), q.parse::<u64>()) {
                            (Ok(m), Ok(n)) => m.cmp(&n),
                            (Ok(_), Err(_)) => Ordering::Greater,
                            (Err(_), Ok(_)) => Ordering::Less,
                            (Err(_), Err(_)) => p.cmp(q),
                        };
                        if order.is_ne() {
                            return order;
                        }
                    }
                }
            }
        }
    }
}

fn cmp_release(a: &Release, b: &Release) -> Ordering {
    cmp_parts(&a.parts, &b.parts).then_with(|| cmp_pre(a.pre.as_deref(), b.pre.as_deref()))
}

/// Recommended `~>` constraint for a version
///
/// `~> major.minor.patch` when the patch component is non-zero, otherwise
/// `~> major.minor`.
pub fn pessimistic_constraint(version: &str) -> Option<String> {
    let release = parse(version)?;
    Some(pessimistic_for(&release))
}

fn pessimistic_for(release: &Release) -> String {
    if release.patch() > 0 {
        format!("~> {}.{}.{}", release.major(), release.minor(), release.patch())
    } else {
        format!("~> {}.{}", release.major(), release.minor())
    }
}

/// Whether `target` satisfies the `~>` constraint built from `current`
///
/// `~> 1.2.3` allows `>= 1.2.3, < 1.3`; `~> 1.2` allows `>= 1.2, < 2.0`.
fn satisfies_pessimistic(current: &Release, target: &Release) -> bool {
    let bound: Vec<u64> = if current.patch() > 0 {
        vec![current.major(), current.minor(), current.patch()]
    } else {
        vec![current.major(), current.minor()]
    };
    let mut upper = bound[..bound.len() - 1].to_vec();
    if let Some(last) = upper.last_mut() {
        *last += 1;
    }
    cmp_parts(&target.parts, &bound).is_ge() && cmp_parts(&target.parts, &upper).is_lt()
}

impl VersionComparator for RubyComparator {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
    }

    fn order(&self, a: &str, b: &str) -> Ordering {
        match (parse(a), parse(b)) {
            (Some(x), Some(y)) => cmp_release(&x, &y),
            _ => a.cmp(b),
        }
    }

    fn compare(&self, from: &str, to: &str) -> VersionDiff {
        let (Some(a), Some(b)) = (parse(from), parse(to)) else {
            return unparsed_diff(Ecosystem::Ruby, from, to);
        };
        let compatible = satisfies_pessimistic(&a, &b);
        let mut compat = Compatibility {
            pessimistic_constraint: Some(pessimistic_for(&b)),
            is_pessimistic_compatible: Some(compatible),
            ..Default::default()
        };
        if !compatible {
            compat.notes.push(format!(
                "{} falls outside {}; update the Gemfile constraint",
                to,
                pessimistic_for(&a)
            ));
        }
        VersionDiff::new(
            Ecosystem::Ruby,
            from,
            to,
            classify(&a, &b),
            direction(cmp_release(&a, &b)),
        )
        .with_compatibility(compat)
    }
}
