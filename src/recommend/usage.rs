//! Recommendations for a dependency-usage analysis

use crate::domain::{is_unstable_version, Criticality, Dependency, DependencyOrigin, Ecosystem, Scope};
use std::collections::BTreeSet;

fn removal_candidate(dep: &Dependency) -> Option<String> {
    if !dep.is_unused_direct() || matches!(dep.scope, Scope::Plugin | Scope::Peer) {
        return None;
    }
    let declared_in = dep
        .declared_in
        .first()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default();
    let mut line = format!(
        "Remove unused dependency {} ({}): declared{} but never imported",
        dep.coordinate, dep.ecosystem, declared_in
    );
    if dep.ecosystem == Ecosystem::Ruby {
        line.push_str("; Bundler.require may load it implicitly, so check initializers first");
    } else if dep.scope.is_non_production() {
        line.push_str("; dev tools are often run from scripts or config rather than imported");
    }
    Some(line)
}

fn conflict(dep: &Dependency) -> Option<String> {
    if !dep.version_conflict {
        return None;
    }
    Some(if dep.declared_versions.len() > 1 {
        format!(
            "Align versions of {}: declared as {}",
            dep.coordinate,
            dep.declared_versions.join(", ")
        )
    } else {
        format!(
            "Align versions of {}: the resolver reported a conflict",
            dep.coordinate
        )
    })
}

fn evicted(dep: &Dependency) -> Option<String> {
    if !dep.evicted {
        return None;
    }
    Some(format!(
        "{}: {} evicted in favour of {}; declare the winning version explicitly",
        dep.coordinate,
        dep.evicted_versions.join(", "),
        dep.effective_version().unwrap_or("another version")
    ))
}

fn unstable_critical(dep: &Dependency) -> Option<String> {
    if dep.criticality != Criticality::High {
        return None;
    }
    let version = dep.effective_version().filter(|v| is_unstable_version(v))?;
    Some(format!(
        "{} is HIGH criticality but on unstable version {}; move to a stable release",
        dep.coordinate, version
    ))
}

fn red_flags(dep: &Dependency) -> Vec<String> {
    let mut flags = Vec::new();
    if dep.usage.cgo_files > 0 {
        flags.push(format!(
            "{} needs cgo; cross-compilation and static builds require a C toolchain",
            dep.coordinate
        ));
    }
    if dep.usage.dot_imports > 0 {
        flags.push(format!(
            "{} is dot-imported in {} place(s); prefer qualified imports",
            dep.coordinate, dep.usage.dot_imports
        ));
    }
    if dep.scope == Scope::System {
        flags.push(format!(
            "{} uses Maven system scope; install it into a repository instead",
            dep.coordinate
        ));
    }
    if dep.is_direct && dep.unconstrained && dep.criticality >= Criticality::Medium {
        flags.push(format!(
            "Pin {} to a bounded version constraint; it is {} criticality",
            dep.coordinate, dep.criticality
        ));
    }
    match dep.origin {
        DependencyOrigin::Git | DependencyOrigin::Path | DependencyOrigin::Url
            if dep.is_direct =>
        {
            flags.push(format!(
                "{} is installed from outside the registry; builds depend on that source staying reachable",
                dep.coordinate
            ));
        }
        _ => {}
    }
    flags
}

/// Recommendations for scored dependencies, grouped by kind
///
/// Removal candidates are only reported for ecosystems in `scanned`, the
/// ecosystems whose source files were actually read.
pub fn recommend_usage(deps: &[Dependency], scanned: &BTreeSet<Ecosystem>) -> Vec<String> {
    let mut out: Vec<String> = deps
        .iter()
        .filter(|d| scanned.contains(&d.ecosystem))
        .filter_map(removal_candidate)
        .collect();
    out.extend(deps.iter().filter_map(conflict));
    out.extend(deps.iter().filter_map(evicted));
    out.extend(deps.iter().filter_map(unstable_critical));
    out.extend(deps.iter().flat_map(red_flags));

    let declared: BTreeSet<Ecosystem> = deps
        .iter()
        .filter(|d| d.is_direct)
        .map(|d| d.ecosystem)
        .collect();
    for eco in declared.difference(scanned) {
        out.push(format!(
            "No {} source files were scanned; usage counts for its dependencies are unavailable",
            eco
        ));
    }
    out
}
