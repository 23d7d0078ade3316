//! Keyword classification of changelog lines

use crate::domain::ChangelogClassification;
use regex::Regex;
use std::sync::LazyLock;

/// Bucket a changelog line falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Breaking,
    Security,
    Feature,
    Fix,
    Deprecation,
}

// Deprecation phrases mention removal without removing anything yet
static DEPRECATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)deprecat|\bobsolete\b|\bwill be removed\b|\bto be removed\b|\bscheduled for removal\b")
        .unwrap()
});

static BREAKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bbreaking\b|\bincompatib|\bno longer\b|\bdropp?(?:ed|s)? support\b|^\W*\w+(?:\([^)]*\))?!:",
    )
    .unwrap()
});

// "removed" only reads as a removal when it leads the entry or is stated as done;
// "could not be removed" and the verb "remove" describe fixes and helpers
static REMOVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\W*(?:\w+(?:\([^)]*\))?:\s*)?(?:removed|removal of)\b|\b(?:was|were|has been|have been|is now|are now)\s+removed\b",
    )
    .unwrap()
});

static SECURITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcve-\d|\bcve\b|\bghsa-|vulnerab|\bsecurity\b|\bxss\b|\bcsrf\b|\binjection\b").unwrap()
});

static FEATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\badd(?:s|ed|ing)?\b|\bnew\b|\bfeat(?:ure)?s?\b|\bintroduc|\bimplement(?:s|ed)?\b|\bsupport(?:s)? for\b")
        .unwrap()
});

static FIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfix(?:es|ed|ing)?\b|\bbugs?\b|\bresolved?s?\b|\bcorrect(?:s|ed)?\b|\bcrash(?:es)?\b")
        .unwrap()
});

fn is_structural(line: &str) -> bool {
    line.starts_with('#')
        || line.chars().all(|c| matches!(c, '=' | '-' | '*' | '_' | ' '))
        || line.starts_with("[") && line.contains("]: http")
}

/// Classifies one trimmed line, honouring breaking > security > feature > fix > deprecation
pub fn classify_line(line: &str) -> Option<ChangeKind> {
    let line = line.trim();
    if line.is_empty() || is_structural(line) {
        return None;
    }
    let deprecation = DEPRECATION_RE.is_match(line);
    let without_deprecation = DEPRECATION_RE.replace_all(line, "");
    if BREAKING_RE.is_match(&without_deprecation) || REMOVAL_RE.is_match(&without_deprecation) {
        Some(ChangeKind::Breaking)
    } else if SECURITY_RE.is_match(line) {
        Some(ChangeKind::Security)
    } else if FEATURE_RE.is_match(line) {
        Some(ChangeKind::Feature)
    } else if FIX_RE.is_match(line) {
        Some(ChangeKind::Fix)
    } else if deprecation {
        Some(ChangeKind::Deprecation)
    } else {
        None
    }
}

fn push_unique(bucket: &mut Vec<String>, line: &str) {
    if !bucket.iter().any(|l| l == line) {
        bucket.push(line.to_string());
    }
}

/// Buckets every line of `text`; unmatched lines are dropped
pub fn classify(text: &str) -> ChangelogClassification {
    let mut result = ChangelogClassification::default();
    for line in text.lines().map(str::trim) {
        let Some(kind) = classify_line(line) else {
            continue;
        };
        let bucket = match kind {
            ChangeKind::Breaking => &mut result.breaking_changes,
            ChangeKind::Security => &mut result.security_fixes,
            ChangeKind::Feature => &mut result.new_features,
            ChangeKind::Fix => &mut result.bug_fixes,
            ChangeKind::Deprecation => &mut result.deprecations,
        };
        push_unique(bucket, line);
    }
    result
}
