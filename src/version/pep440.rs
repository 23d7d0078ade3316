//! PEP 440 version comparator
//!
//! Recognises epochs (`1!2.0`), pre-releases (`a`, `b`, `rc` and their
//! spellings), post-releases (`.post1`, `-1`), dev releases (`.dev3`) and
//! local labels (`+ubuntu1`, ignored for ordering). Anything outside the
//! grammar still gets best-effort numeric extraction but is reported as
//! non-compliant.

use super::{cmp_parts, direction, release_change, VersionComparator};
use crate::domain::{Compatibility, Ecosystem, SemverType, VersionDiff};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static PEP440_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^
        v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_n1>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .unwrap()
});

// Best effort for non-compliant strings: leading dotted numbers
static LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)*)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pep440Version {
    epoch: u64,
    release: Vec<u64>,
    /// (rank, number): a=0, b=1, rc=2
    pre: Option<(u8, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    compliant: bool,
}

fn number(caps: &regex::Captures, name: &str) -> u64 {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn parse_release_parts(text: &str) -> Vec<u64> {
    text.split('.').filter_map(|p| p.parse().ok()).collect()
}

fn parse(version: &str) -> Option<Pep440Version> {
    let trimmed = version.trim();
    if let Some(caps) = PEP440_RE.captures(trimmed) {
        let pre = caps.name("pre_l").map(|l| {
            let rank = match l.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => 0,
                "b" | "beta" => 1,
                _ => 2,
            };
            (rank, number(&caps, "pre_n"))
        });
        let post = if caps.name("post_n1").is_some() {
            Some(number(&caps, "post_n1"))
        } else {
            caps.name("post_l").map(|_| number(&caps, "post_n2"))
        };
        return Some(Pep440Version {
            epoch: number(&caps, "epoch"),
            release: parse_release_parts(&caps["release"]),
            pre,
            post,
            dev: caps.name("dev_l").map(|_| number(&caps, "dev_n")),
            compliant: true,
        });
    }

    let caps = LOOSE_RE.captures(trimmed)?;
    Some(Pep440Version {
        epoch: 0,
        release: parse_release_parts(&caps[1]),
        pre: None,
        post: None,
        dev: None,
        compliant: false,
    })
}

// Sort keys following PEP 440: a dev-only release sorts before its
// pre-releases, a missing post sorts first, a missing dev sorts last.
fn pre_key(v: &Pep440Version) -> (i8, u64) {
    match (v.pre, v.post, v.dev) {
        (None, None, Some(_)) => (-1, 0),
        (Some((rank, n)), _, _) => (rank as i8, n),
        _ => (i8::MAX, 0),
    }
}

fn post_key(v: &Pep440Version) -> (i8, u64) {
    v.post.map_or((-1, 0), |n| (0, n))
}

fn dev_key(v: &Pep440Version) -> (i8, u64) {
    v.dev.map_or((i8::MAX, 0), |n| (0, n))
}

fn cmp_versions(a: &Pep440Version, b: &Pep440Version) -> Ordering {
    a.epoch
        .cmp(&b.epoch)
        .then_with(|| cmp_parts(&a.release, &b.release))
        .then_with(|| pre_key(a).cmp(&pre_key(b)))
        .then_with(|| post_key(a).cmp(&post_key(b)))
        .then_with(|| dev_key(a).cmp(&dev_key(b)))
}

fn classify(a: &Pep440Version, b: &Pep440Version) -> SemverType {
    if a.epoch != b.epoch {
        return SemverType::Major;
    }
    if let Some(change) = release_change(&a.release, &b.release) {
        return change;
    }
    if a.pre != b.pre || a.dev != b.dev {
        return SemverType::Prerelease;
    }
    if a.post != b.post {
        return SemverType::Patch;
    }
    SemverType::Unknown
}

/// Returns true if `version` matches the full PEP 440 grammar
pub fn is_pep440_compliant(version: &str) -> bool {
    PEP440_RE.is_match(version.trim())
}

pub struct Pep440Comparator;

impl VersionComparator for Pep440Comparator {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }

    fn order(&self, a: &str, b: &str) -> Ordering {
        match (parse(a), parse(b)) {
            (Some(x), Some(y)) => cmp_versions(&x, &y),
            _ => a.cmp(b),
        }
    }

    fn compare(&self, from: &str, to: &str) -> VersionDiff {
        let (Some(a), Some(b)) = (parse(from), parse(to)) else {
            let mut diff = super::unparsed_diff(Ecosystem::Python, from, to);
            diff.compatibility.pep440_compliant = Some(false);
            return diff;
        };

        let compliant = a.compliant && b.compliant;
        let mut compat = Compatibility {
            pep440_compliant: Some(compliant),
            ..Default::default()
        };
        if !compliant {
            let offending: Vec<&str> = [(from, a.compliant), (to, b.compliant)]
                .iter()
                .filter(|(_, ok)| !ok)
                .map(|(v, _)| *v)
                .collect();
            compat.notes.push(format!(
                "not PEP 440 compliant: {}; change type is a best-effort guess",
                offending.join(", ")
            ));
        }
        if a.epoch != b.epoch {
            compat
                .notes
                .push(format!("epoch changes from {} to {}", a.epoch, b.epoch));
        }

        VersionDiff::new(
            Ecosystem::Python,
            from,
            to,
            classify(&a, &b),
            direction(cmp_versions(&a, &b)),
        )
        .with_compatibility(compat)
    }
}
