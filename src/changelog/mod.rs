//! Changelog mining
//!
//! Changelog text is split into per-version sections, restricted to the
//! `(from, to]` range of an upgrade and classified line by line into
//! breaking changes, security fixes, features, bug fixes and deprecations.

mod classify;
mod sections;

pub use classify::{classify, classify_line, ChangeKind};
pub use sections::{parse_sections, sections_in_range};

use crate::domain::{ChangelogClassification, ChangelogSection};
use crate::version::VersionComparator;
use tracing::debug;

/// Classification of the changelog entries covering one upgrade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogDigest {
    /// Versions whose sections contributed, in document order
    pub versions: Vec<String>,
    pub classification: ChangelogClassification,
    /// True when the text had no version headings and was classified whole
    pub unsectioned: bool,
}

/// Classifies pre-split sections in order, merging their buckets
pub fn classify_sections<'a, I>(sections: I) -> ChangelogClassification
where
    I: IntoIterator<Item = &'a ChangelogSection>,
{
    let mut merged = ChangelogClassification::default();
    for section in sections {
        merged.merge(&section.classification);
    }
    merged
}

/// Mines `text` for the changes between `from` and `to`
pub fn mine(
    text: &str,
    comparator: &dyn VersionComparator,
    from: &str,
    to: &str,
) -> ChangelogDigest {
    let sections = parse_sections(text);
    if sections.is_empty() {
        debug!("Changelog has no version headings, classifying the whole text");
        return ChangelogDigest {
            versions: Vec::new(),
            classification: classify(text),
            unsectioned: true,
        };
    }

    let selected = sections_in_range(&sections, comparator, from, to);
    debug!(
        "Changelog: {} of {} sections in ({}, {}]",
        selected.len(),
        sections.len(),
        from,
        to
    );
    ChangelogDigest {
        versions: selected.iter().map(|s| s.version.clone()).collect(),
        classification: classify_sections(selected.iter().copied()),
        unsectioned: false,
    }
}
