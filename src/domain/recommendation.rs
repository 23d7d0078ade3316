//! Upgrade recommendation types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a proposed upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Buckets an accumulated risk score: >=5 critical, >=3 high, >=1 medium
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 5 => RiskLevel::Critical,
            s if s >= 3 => RiskLevel::High,
            s if s >= 1 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected effort of an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    High,
    Medium,
    Low,
    Unknown,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::High => "high",
            Complexity::Medium => "medium",
            Complexity::Low => "low",
            Complexity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contribution to the risk score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub description: String,
    pub weight: i32,
}

impl RiskFactor {
    pub fn new(description: impl Into<String>, weight: i32) -> Self {
        Self {
            description: description.into(),
            weight,
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:+})", self.description, self.weight)
    }
}

/// Generated upgrade advice; never mutated after generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Ordered advice lines
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub risk_score: i32,
    pub complexity: Complexity,
    /// Factors that contributed to `risk_score`, in evaluation order
    pub factors: Vec<RiskFactor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_from_score() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(-1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(12), RiskLevel::Critical);
    }

    #[test]
    fn test_factor_display() {
        assert_eq!(RiskFactor::new("major version change", 3).to_string(), "major version change (+3)");
        assert_eq!(RiskFactor::new("official package", -1).to_string(), "official package (-1)");
    }

    #[test]
    fn test_serialize_enums() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&Complexity::Unknown).unwrap(), "\"unknown\"");
    }
}
