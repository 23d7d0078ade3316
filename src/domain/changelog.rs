//! Changelog classification types

use serde::{Deserialize, Serialize};

/// Changelog lines bucketed by kind of change
///
/// Each bucket keeps verbatim (trimmed) lines in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogClassification {
    pub breaking_changes: Vec<String>,
    pub new_features: Vec<String>,
    pub bug_fixes: Vec<String>,
    pub deprecations: Vec<String>,
    pub security_fixes: Vec<String>,
}

impl ChangelogClassification {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of classified lines across all buckets
    pub fn total(&self) -> usize {
        self.breaking_changes.len()
            + self.new_features.len()
            + self.bug_fixes.len()
            + self.deprecations.len()
            + self.security_fixes.len()
    }

    /// Appends another classification, keeping first-seen order and dropping duplicates
    pub fn merge(&mut self, other: &ChangelogClassification) {
        extend_unique(&mut self.breaking_changes, &other.breaking_changes);
        extend_unique(&mut self.new_features, &other.new_features);
        extend_unique(&mut self.bug_fixes, &other.bug_fixes);
        extend_unique(&mut self.deprecations, &other.deprecations);
        extend_unique(&mut self.security_fixes, &other.security_fixes);
    }
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

/// One version's entry in a changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogSection {
    /// Version label as written in the heading, without a leading `v`
    pub version: String,
    /// Release date, when the heading carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Body text below the heading
    pub raw: String,
    /// Buckets derived from `raw`
    #[serde(flatten)]
    pub classification: ChangelogClassification,
}

impl ChangelogSection {
    pub fn new(version: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: None,
            raw: raw.into(),
            classification: ChangelogClassification::default(),
        }
    }
}
