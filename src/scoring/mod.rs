//! Criticality scoring
//!
//! A single weighted-rule evaluator runs the ecosystem's rule table (see
//! [`rules`]) against each graph node. Triggered rules add their weight to
//! the score and a reason to the node, in table order. The score is then
//! bucketed with the configured thresholds.

mod allowlist;
mod rules;

pub use allowlist::{critical_match, default_critical, is_extended_stdlib};
pub use rules::{rules_for, Rule, RuleContext, HIGH_USAGE, MEDIUM_USAGE};

use crate::domain::{Criticality, Dependency, Ecosystem};
use crate::graph::DependencyGraph;
use std::collections::BTreeMap;

pub const DEFAULT_MEDIUM_THRESHOLD: i32 = 3;
pub const DEFAULT_HIGH_THRESHOLD: i32 = 5;

/// Scoring thresholds and critical-package extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub medium_threshold: i32,
    pub high_threshold: i32,
    /// Extra critical-package entries per ecosystem, matched like the built-ins
    pub critical: BTreeMap<Ecosystem, Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            medium_threshold: DEFAULT_MEDIUM_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            critical: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    pub fn extra_critical(&self, ecosystem: Ecosystem) -> &[String] {
        self.critical
            .get(&ecosystem)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Outcome of evaluating one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: i32,
    pub criticality: Criticality,
    pub reasons: Vec<String>,
}

/// Weighted-rule evaluator shared by every ecosystem
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn evaluate(&self, dep: &Dependency) -> Assessment {
        let ctx = RuleContext {
            extra_critical: self.config.extra_critical(dep.ecosystem),
        };
        let mut score = 0;
        let mut reasons = Vec::new();
        for rule in rules_for(dep.ecosystem) {
            if let Some(reason) = rule.check(dep, &ctx) {
                score += rule.weight;
                reasons.push(format!("{} ({:+})", reason, rule.weight));
            }
        }
        Assessment {
            score,
            criticality: Criticality::from_score(
                score,
                self.config.medium_threshold,
                self.config.high_threshold,
            ),
            reasons,
        }
    }

    /// Returns `dep` with its criticality fields filled in
    pub fn score(&self, mut dep: Dependency) -> Dependency {
        let assessment = self.evaluate(&dep);
        dep.criticality = assessment.criticality;
        dep.criticality_score = assessment.score;
        dep.criticality_reasons = assessment.reasons;
        dep
    }

    pub fn score_graph(&self, graph: DependencyGraph) -> DependencyGraph {
        graph.map_nodes(|dep| self.score(dep))
    }
}
