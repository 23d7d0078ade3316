//! Recommendation generation
//!
//! Upgrade recommendations are a pure function of the version diff, the
//! package's criticality, the mined changelog and any runtime requirement
//! change. Usage-analysis recommendations are derived from scored graph
//! nodes (see [`usage`]).

mod templates;
pub mod usage;

pub use templates::{families, PackageFamily};
pub use usage::recommend_usage;

use crate::domain::{
    ChangelogClassification, Complexity, Criticality, Ecosystem, Recommendation, RiskFactor,
    RiskLevel, RuntimeChange, SemverType, VersionDiff,
};
use crate::scoring::{critical_match, is_extended_stdlib};
use crate::version::{SemverComparator, VersionComparator};
use regex::Regex;
use std::sync::LazyLock;

static MAJOR_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/v\d+$").unwrap());

/// Everything the generator looks at for one upgrade
#[derive(Debug, Clone, Copy)]
pub struct UpgradeContext<'a> {
    pub package: &'a str,
    pub diff: &'a VersionDiff,
    pub criticality: Option<Criticality>,
    pub changelog: &'a ChangelogClassification,
    pub runtime_change: Option<&'a RuntimeChange>,
    /// Extra critical-package entries configured for the ecosystem
    pub extra_critical: &'a [String],
}

impl UpgradeContext<'_> {
    fn ecosystem(&self) -> Ecosystem {
        self.diff.ecosystem
    }
}

/// True when the required runtime/toolchain version goes up
pub fn is_runtime_bump(change: Option<&RuntimeChange>) -> bool {
    change.is_some_and(|c| SemverComparator.order(&c.from, &c.to).is_lt())
}

pub fn assess_complexity(ctx: &UpgradeContext) -> Complexity {
    let diff = ctx.diff;
    if is_runtime_bump(ctx.runtime_change)
        || diff.major_change
        || !ctx.changelog.breaking_changes.is_empty()
    {
        Complexity::High
    } else if diff.minor_change || ctx.changelog.new_features.len() > 3 {
        Complexity::Medium
    } else if diff.patch_change {
        Complexity::Low
    } else {
        Complexity::Unknown
    }
}

/// Risk factors in evaluation order
pub fn risk_factors(ctx: &UpgradeContext) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    match ctx.diff.semver_type {
        SemverType::Major => factors.push(RiskFactor::new("major version change", 3)),
        SemverType::Minor => factors.push(RiskFactor::new("minor version change", 1)),
        _ => {}
    }
    let breaking = ctx.changelog.breaking_changes.len();
    if breaking > 0 {
        factors.push(RiskFactor::new(
            format!("{} breaking change(s) in the changelog", breaking),
            breaking as i32,
        ));
    }
    if is_runtime_bump(ctx.runtime_change) {
        if let Some(change) = ctx.runtime_change {
            factors.push(RiskFactor::new(
                format!("runtime requirement {} -> {}", change.from, change.to),
                2,
            ));
        }
    }
    if let Some(entry) = critical_match(ctx.ecosystem(), ctx.package, ctx.extra_critical) {
        factors.push(RiskFactor::new(format!("critical package ({})", entry), 2));
    }
    if is_extended_stdlib(ctx.ecosystem(), ctx.package) {
        factors.push(RiskFactor::new("officially maintained extended standard library", -1));
    }
    factors
}

fn go_import_path_advice(ctx: &UpgradeContext) -> Option<String> {
    let compat = &ctx.diff.compatibility;
    if compat.requires_import_path_change != Some(true) {
        return None;
    }
    let base = MAJOR_SUFFIX_RE.replace(ctx.package, "");
    Some(match &compat.import_path_suffix {
        Some(suffix) => format!(
            "Check import paths: after the upgrade {} must be required and imported as {}{} (the {} suffix)",
            base, base, suffix, suffix
        ),
        None => format!(
            "Check import paths: after the downgrade {} is imported without a /vN suffix",
            base
        ),
    })
}

fn compatibility_advice(ctx: &UpgradeContext, out: &mut Vec<String>) {
    let compat = &ctx.diff.compatibility;
    match ctx.ecosystem() {
        Ecosystem::Go => out.extend(go_import_path_advice(ctx)),
        Ecosystem::Ruby => {
            if let Some(constraint) = &compat.pessimistic_constraint {
                out.push(format!(
                    "Suggested Gemfile constraint: gem '{}', '{}'",
                    ctx.package, constraint
                ));
            }
        }
        _ => {}
    }
    out.extend(compat.notes.iter().cloned());
}

fn changelog_advice(changelog: &ChangelogClassification, out: &mut Vec<String>) {
    if !changelog.breaking_changes.is_empty() {
        let examples: Vec<&str> = changelog
            .breaking_changes
            .iter()
            .take(3)
            .map(|l| l.trim_start_matches(['-', '*', '+', ' ']))
            .collect();
        out.push(format!(
            "Address {} breaking change(s) before upgrading: {}",
            changelog.breaking_changes.len(),
            examples.join("; ")
        ));
    }
    if !changelog.security_fixes.is_empty() {
        out.push(format!(
            "Includes {} security fix(es): prioritise this upgrade",
            changelog.security_fixes.len()
        ));
    }
    if !changelog.deprecations.is_empty() {
        out.push(format!(
            "{} deprecation(s): move off deprecated APIs now to ease the next major upgrade",
            changelog.deprecations.len()
        ));
    }
    if changelog.new_features.len() > 3 {
        out.push(format!(
            "{} new features available; consider adopting them after the upgrade",
            changelog.new_features.len()
        ));
    }
}

/// Builds the recommendation for one upgrade
pub fn recommend_upgrade(ctx: &UpgradeContext) -> Recommendation {
    let complexity = assess_complexity(ctx);
    let factors = risk_factors(ctx);
    let risk_score: i32 = factors.iter().map(|f| f.weight).sum();
    let risk_level = RiskLevel::from_score(risk_score);

    let mut recommendations = vec![templates::headline(ctx.package, ctx.diff)];
    if is_runtime_bump(ctx.runtime_change) {
        if let Some(change) = ctx.runtime_change {
            recommendations.push(format!(
                "Requires runtime {} -> {}: upgrade the toolchain first (CI images, Dockerfiles, version files)",
                change.from, change.to
            ));
        }
    }
    compatibility_advice(ctx, &mut recommendations);
    changelog_advice(ctx.changelog, &mut recommendations);
    if ctx.criticality == Some(Criticality::High) {
        recommendations.push(format!(
            "{} is HIGH criticality in this project: stage the rollout and watch error rates",
            ctx.package
        ));
    }
    if ctx.diff.has_change() {
        for family in families(ctx.package) {
            recommendations.push(templates::family_advice(family).to_string());
        }
    }
    recommendations.extend(templates::closing(risk_level).map(str::to_string));

    Recommendation {
        recommendations,
        risk_level,
        risk_score,
        complexity,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::get_comparator;

    fn context<'a>(
        package: &'a str,
        diff: &'a VersionDiff,
        changelog: &'a ChangelogClassification,
    ) -> UpgradeContext<'a> {
        UpgradeContext {
            package,
            diff,
            criticality: None,
            changelog,
            runtime_change: None,
            extra_critical: &[],
        }
    }

    #[test]
    fn test_go_major_mentions_suffix() {
        let diff = get_comparator(Ecosystem::Go).compare("v1.8.1", "v2.0.0");
        let changelog = ChangelogClassification::default();
        let rec = recommend_upgrade(&context("github.com/example/lib", &diff, &changelog));
        assert_eq!(rec.complexity, Complexity::High);
        assert!(rec
            .recommendations
            .iter()
            .any(|r| r.contains("github.com/example/lib/v2") && r.contains("/v2 suffix")));
    }

    #[test]
    fn test_ruby_patch_is_low() {
        let diff = get_comparator(Ecosystem::Ruby).compare("1.2.3", "1.2.5");
        let changelog = ChangelogClassification::default();
        let rec = recommend_upgrade(&context("faraday", &diff, &changelog));
        assert_eq!(rec.complexity, Complexity::Low);
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert!(rec.recommendations.iter().any(|r| r.contains("'~> 1.2.5'")));
    }

    #[test]
    fn test_risk_accumulates() {
        let diff = get_comparator(Ecosystem::Node).compare("4.18.2", "5.0.0");
        let changelog = ChangelogClassification {
            breaking_changes: vec!["- Removed app.del()".to_string(), "- Dropped Node 16".to_string()],
            ..Default::default()
        };
        let runtime = RuntimeChange {
            from: "16".to_string(),
            to: "18".to_string(),
        };
        let mut ctx = context("express", &diff, &changelog);
        ctx.runtime_change = Some(&runtime);
        let rec = recommend_upgrade(&ctx);
        // 3 major + 2 breaking + 2 runtime + 2 critical
        assert_eq!(rec.risk_score, 9);
        assert_eq!(rec.risk_level, RiskLevel::Critical);
        assert_eq!(rec.factors.len(), 4);
        assert!(rec.recommendations.iter().any(|r| r.starts_with("Web framework")));
        assert!(rec.recommendations.iter().any(|r| r.starts_with("Address 2 breaking")));
    }

    #[test]
    fn test_extended_stdlib_lowers_risk() {
        let diff = get_comparator(Ecosystem::Go).compare("v0.14.0", "v0.15.0");
        let changelog = ChangelogClassification::default();
        let rec = recommend_upgrade(&context("golang.org/x/net", &diff, &changelog));
        assert_eq!(rec.risk_score, 0);
        assert_eq!(rec.complexity, Complexity::Medium);
    }

    #[test]
    fn test_complexity_rules() {
        let changelog = ChangelogClassification {
            new_features: (0..4).map(|i| format!("- Added feature {}", i)).collect(),
            ..Default::default()
        };
        let prerelease = get_comparator(Ecosystem::Node).compare("1.0.0-rc.1", "1.0.0-rc.2");
        assert_eq!(assess_complexity(&context("x", &prerelease, &changelog)), Complexity::Medium);
        let empty = ChangelogClassification::default();
        assert_eq!(assess_complexity(&context("x", &prerelease, &empty)), Complexity::Unknown);

        let same_runtime = RuntimeChange {
            from: "1.21".to_string(),
            to: "1.21".to_string(),
        };
        assert!(!is_runtime_bump(Some(&same_runtime)));
    }
}
