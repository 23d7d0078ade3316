//! Per-ecosystem rule tables
//!
//! Every table starts with the shared rules, in this order:
//!
//! 1. usage band: high (10+ sites, +3), medium (3-9, +2), low (1-2, +1)
//! 2. direct dependency (+2)
//! 3. runtime-shaping scope (+1) or non-production/provided/optional scope (-1)
//! 4. well-known critical package (+2)
//! 5. unstable version (+1)
//! 6. version conflict (+2), then eviction or replacement (+1)
//!
//! followed by the ecosystem's red flags:
//!
//! - Go: cgo (+2), dot-imports (+1)
//! - Maven: system scope (+2), wildcard imports (+1), unbounded constraint (+1)
//! - Gradle, SBT: wildcard imports (+1), unbounded constraint (+1)
//! - Node.js: unbounded constraint (+1), non-registry source (+1)
//! - Python: wildcard imports (+1), unbounded constraint (+1), non-registry source (+1)
//! - Ruby: missing constraint (+1), git/path source (+1)

use super::allowlist::critical_match;
use crate::domain::{is_unstable_version, Dependency, DependencyOrigin, Ecosystem, Scope};

pub const HIGH_USAGE: usize = 10;
pub const MEDIUM_USAGE: usize = 3;

/// Inputs a rule may consult besides the dependency itself
pub struct RuleContext<'a> {
    /// Extra critical-package entries for the dependency's ecosystem
    pub extra_critical: &'a [String],
}

type Check = fn(&Dependency, &RuleContext) -> Option<String>;

/// One weighted rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub weight: i32,
    check: Check,
}

impl Rule {
    const fn new(id: &'static str, weight: i32, check: Check) -> Self {
        Self { id, weight, check }
    }

    /// Returns the reason text when the rule triggers
    pub fn check(&self, dep: &Dependency, ctx: &RuleContext) -> Option<String> {
        (self.check)(dep, ctx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .finish()
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn usage_high(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (dep.usage_count >= HIGH_USAGE)
        .then(|| format!("high usage: {}", plural(dep.usage_count, "reference site")))
}

fn usage_medium(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (MEDIUM_USAGE..HIGH_USAGE)
        .contains(&dep.usage_count)
        .then(|| format!("moderate usage: {}", plural(dep.usage_count, "reference site")))
}

fn usage_low(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (1..MEDIUM_USAGE)
        .contains(&dep.usage_count)
        .then(|| format!("low usage: {}", plural(dep.usage_count, "reference site")))
}

fn direct(dep: &Dependency, _: &RuleContext) -> Option<String> {
    dep.is_direct.then(|| "direct dependency".to_string())
}

fn runtime_scope(dep: &Dependency, _: &RuleContext) -> Option<String> {
    dep.scope
        .is_runtime_shaping()
        .then(|| format!("{} scope", dep.scope))
}

fn limited_scope(dep: &Dependency, _: &RuleContext) -> Option<String> {
    matches!(
        dep.scope,
        Scope::Test | Scope::Dev | Scope::Provided | Scope::Optional | Scope::Plugin
    )
    .then(|| format!("{} scope only", dep.scope))
}

fn critical_package(dep: &Dependency, ctx: &RuleContext) -> Option<String> {
    critical_match(dep.ecosystem, &dep.coordinate, ctx.extra_critical)
        .map(|entry| format!("well-known critical package ({})", entry))
}

fn unstable(dep: &Dependency, _: &RuleContext) -> Option<String> {
    dep.effective_version()
        .filter(|v| is_unstable_version(v))
        .map(|v| format!("unstable version {}", v))
}

fn conflict(dep: &Dependency, _: &RuleContext) -> Option<String> {
    if !dep.version_conflict {
        return None;
    }
    Some(if dep.declared_versions.len() > 1 {
        format!("conflicting declared versions: {}", dep.declared_versions.join(", "))
    } else {
        "resolver reported a version conflict".to_string()
    })
}

fn evicted_or_replaced(dep: &Dependency, _: &RuleContext) -> Option<String> {
    if dep.evicted {
        Some(format!("evicted versions: {}", dep.evicted_versions.join(", ")))
    } else {
        dep.replaced_by
            .as_ref()
            .map(|target| format!("replaced by {}", target))
    }
}

fn cgo(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (dep.usage.cgo_files > 0)
        .then(|| format!("used from {} with cgo", plural(dep.usage.cgo_files, "file")))
}

fn dot_import(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (dep.usage.dot_imports > 0).then(|| plural(dep.usage.dot_imports, "dot-import"))
}

fn wildcard_import(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (dep.usage.wildcard_imports > 0).then(|| plural(dep.usage.wildcard_imports, "wildcard import"))
}

fn system_scope(dep: &Dependency, _: &RuleContext) -> Option<String> {
    (dep.scope == Scope::System).then(|| "system scope with a local jar".to_string())
}

fn unbounded(dep: &Dependency, _: &RuleContext) -> Option<String> {
    dep.unconstrained.then(|| match &dep.declared_version {
        Some(v) => format!("unbounded version constraint {}", v),
        None => "no version constraint".to_string(),
    })
}

fn non_registry(dep: &Dependency, _: &RuleContext) -> Option<String> {
    match dep.origin {
        DependencyOrigin::Registry => None,
        DependencyOrigin::Git => Some("installed from git".to_string()),
        DependencyOrigin::Path => Some("installed from a local path".to_string()),
        DependencyOrigin::Url => Some("installed from a URL".to_string()),
    }
}

fn ruby_source(dep: &Dependency, ctx: &RuleContext) -> Option<String> {
    match dep.origin {
        DependencyOrigin::Git | DependencyOrigin::Path => non_registry(dep, ctx),
        _ => None,
    }
}

const COMMON: [Rule; 10] = [
    Rule::new("usage-high", 3, usage_high),
    Rule::new("usage-medium", 2, usage_medium),
    Rule::new("usage-low", 1, usage_low),
    Rule::new("direct", 2, direct),
    Rule::new("runtime-scope", 1, runtime_scope),
    Rule::new("limited-scope", -1, limited_scope),
    Rule::new("critical-package", 2, critical_package),
    Rule::new("unstable-version", 1, unstable),
    Rule::new("version-conflict", 2, conflict),
    Rule::new("evicted-or-replaced", 1, evicted_or_replaced),
];

const CGO: Rule = Rule::new("cgo", 2, cgo);
const DOT_IMPORT: Rule = Rule::new("dot-import", 1, dot_import);
const WILDCARD: Rule = Rule::new("wildcard-import", 1, wildcard_import);
const SYSTEM_SCOPE: Rule = Rule::new("system-scope", 2, system_scope);
const UNBOUNDED: Rule = Rule::new("unbounded-constraint", 1, unbounded);
const NON_REGISTRY: Rule = Rule::new("non-registry-source", 1, non_registry);
const RUBY_SOURCE: Rule = Rule::new("git-or-path-source", 1, ruby_source);

/// Rule table for an ecosystem, in evaluation order
pub fn rules_for(ecosystem: Ecosystem) -> Vec<Rule> {
    let flags: &[Rule] = match ecosystem {
        Ecosystem::Go => &[CGO, DOT_IMPORT],
        Ecosystem::Maven => &[SYSTEM_SCOPE, WILDCARD, UNBOUNDED],
        Ecosystem::Gradle | Ecosystem::Sbt => &[WILDCARD, UNBOUNDED],
        Ecosystem::Node => &[UNBOUNDED, NON_REGISTRY],
        Ecosystem::Python => &[WILDCARD, UNBOUNDED, NON_REGISTRY],
        Ecosystem::Ruby => &[UNBOUNDED, RUBY_SOURCE],
    };
    COMMON.iter().chain(flags).copied().collect()
}
