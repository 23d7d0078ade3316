//! Criticality bucket assigned to a dependency

use serde::{Deserialize, Serialize};
use std::fmt;

/// Importance of a dependency to the project, independent of any upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Criticality {
    #[default]
    Low,
    Medium,
    High,
}

impl Criticality {
    /// Buckets a score against ordered thresholds (`medium < high`)
    pub fn from_score(score: i32, medium_threshold: i32, high_threshold: i32) -> Self {
        if score >= high_threshold {
            Criticality::High
        } else if score >= medium_threshold {
            Criticality::Medium
        } else {
            Criticality::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Low => "LOW",
            Criticality::Medium => "MEDIUM",
            Criticality::High => "HIGH",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_score_boundaries() {
        assert_eq!(Criticality::from_score(5, 3, 5), Criticality::High);
        assert_eq!(Criticality::from_score(4, 3, 5), Criticality::Medium);
        assert_eq!(Criticality::from_score(3, 3, 5), Criticality::Medium);
        assert_eq!(Criticality::from_score(2, 3, 5), Criticality::Low);
        assert_eq!(Criticality::from_score(-1, 3, 5), Criticality::Low);
    }

    #[test]
    fn test_ordering() {
        assert!(Criticality::High > Criticality::Medium);
        assert!(Criticality::Medium > Criticality::Low);
    }

    #[test]
    fn test_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Criticality::High).unwrap(), "\"HIGH\"");
        let parsed: Criticality = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, Criticality::Medium);
    }
}
