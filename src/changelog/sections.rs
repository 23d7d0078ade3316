//! Splitting markdown changelogs into per-version sections

use super::classify::classify;
use crate::domain::ChangelogSection;
use crate::version::VersionComparator;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

// `## [1.2.3] - 2024-01-01`, `### v1.2.3`, `# Version 1.2.3 (2024-01-01)`
static ATX_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#{1,6}\s+(?:(?:version|release)\s+)?\[?v?(\d+(?:\.\d+)+[0-9A-Za-z.\-+]*)\]?").unwrap()
});

// `1.2.3 (2024-01-01)` above an `===` or `---` underline
static PLAIN_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:version|release)\s+)?\[?v?(\d+(?:\.\d+)+[0-9A-Za-z.\-+]*)\]?(?:\s|$)").unwrap()
});

static UNDERLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:=+|-{3,})\s*$").unwrap());

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

// Any other heading closes the current section's body
static OTHER_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#{1,2}\s+\[?unreleased\]?").unwrap());

struct Heading {
    version: String,
    date: Option<String>,
}

fn heading(line: &str, next: Option<&str>) -> Option<(Heading, bool)> {
    let date = || DATE_RE.captures(line).map(|c| c[1].to_string());
    if let Some(caps) = ATX_HEADING_RE.captures(line) {
        return Some((
            Heading {
                version: caps[1].to_string(),
                date: date(),
            },
            false,
        ));
    }
    let underlined = next.is_some_and(|n| UNDERLINE_RE.is_match(n.trim()));
    if underlined {
        if let Some(caps) = PLAIN_VERSION_RE.captures(line) {
            return Some((
                Heading {
                    version: caps[1].to_string(),
                    date: date(),
                },
                true,
            ));
        }
    }
    None
}

fn finish(version: String, date: Option<String>, body: &[&str]) -> ChangelogSection {
    let raw = body.join("\n").trim().to_string();
    let mut section = ChangelogSection::new(version, raw);
    section.date = date;
    section.classification = classify(&section.raw);
    section
}

/// Splits `text` on version headings, in document order
///
/// Text before the first version heading and under an `Unreleased` heading
/// belongs to no section.
pub fn parse_sections(text: &str) -> Vec<ChangelogSection> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();
    let mut current: Option<Heading> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();
        if let Some((found, underlined)) = heading(line.trim_start(), lines.get(i + 1).copied()) {
            if let Some(prev) = current.take() {
                sections.push(finish(prev.version, prev.date, &body));
            }
            body.clear();
            current = Some(found);
            i += if underlined { 2 } else { 1 };
            continue;
        }
        if OTHER_HEADING_RE.is_match(line) {
            if let Some(prev) = current.take() {
                sections.push(finish(prev.version, prev.date, &body));
            }
            body.clear();
        } else if current.is_some() {
            body.push(line);
        }
        i += 1;
    }
    if let Some(prev) = current {
        sections.push(finish(prev.version, prev.date, &body));
    }
    sections
}

/// Sections whose version lies in `(from, to]`, in document order
///
/// A downgrade reads the same range from the other end.
pub fn sections_in_range<'a>(
    sections: &'a [ChangelogSection],
    comparator: &dyn VersionComparator,
    from: &str,
    to: &str,
) -> Vec<&'a ChangelogSection> {
    let (low, high) = match comparator.order(from, to) {
        Ordering::Greater => (to, from),
        _ => (from, to),
    };
    sections
        .iter()
        .filter(|s| {
            comparator.order(low, &s.version) == Ordering::Less
                && comparator.order(&s.version, high) != Ordering::Greater
        })
        .collect()
}
