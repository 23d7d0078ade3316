//! Package manager selection
//!
//! An explicit `packageManager` field or `[tool.*]` section wins; otherwise
//! lock files decide in order of preference, falling back to the
//! ecosystem's default tool.

use super::evidence::Signals;
use crate::domain::{Ecosystem, PackageManager};

/// Node lock files in order of preference
const NODE_LOCKS: [(&str, PackageManager); 6] = [
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
    ("npm-shrinkwrap.json", PackageManager::Npm),
];

/// Python lock files and manifests in order of preference
const PYTHON_FILES: [(&str, PackageManager); 6] = [
    ("uv.lock", PackageManager::Uv),
    ("poetry.lock", PackageManager::Poetry),
    ("pdm.lock", PackageManager::Pdm),
    ("Pipfile.lock", PackageManager::Pipenv),
    ("Pipfile", PackageManager::Pipenv),
    ("requirements.txt", PackageManager::Pip),
];

/// Chooses the package manager; the second value is a consistency warning
pub(crate) fn select(ecosystem: Ecosystem, signals: &Signals) -> (PackageManager, Option<String>) {
    match ecosystem {
        Ecosystem::Node => detect_node(signals),
        Ecosystem::Python => (detect_python(signals), None),
        other => (PackageManager::default_for(other), None),
    }
}

fn detect_node(signals: &Signals) -> (PackageManager, Option<String>) {
    let locks: Vec<(&str, PackageManager)> = NODE_LOCKS
        .iter()
        .filter(|(name, _)| signals.has(name))
        .copied()
        .collect();

    let declared = signals
        .facts
        .get("packageManager")
        .and_then(|v| PackageManager::from_node_field(v));

    if let Some(declared) = declared {
        let warning = match locks.first() {
            Some((name, pm)) if *pm != declared && !locks.iter().any(|(_, p)| *p == declared) => {
                Some(format!(
                    "packageManager field names {} but {} is present",
                    declared, name
                ))
            }
            _ => None,
        };
        return (declared, warning);
    }

    let mut managers: Vec<PackageManager> = locks.iter().map(|(_, pm)| *pm).collect();
    managers.dedup();
    let warning = (managers.len() > 1).then(|| {
        let names: Vec<&str> = locks.iter().map(|(name, _)| *name).collect();
        format!("multiple Node.js lock files found: {}", names.join(", "))
    });
    let selected = locks
        .first()
        .map(|(_, pm)| *pm)
        .unwrap_or(PackageManager::Npm);
    (selected, warning)
}

fn detect_python(signals: &Signals) -> PackageManager {
    if let Some((_, pm)) = PYTHON_FILES[..4].iter().find(|(name, _)| signals.has(name)) {
        return *pm;
    }
    // build tool sections in pyproject.toml
    for (tool, pm) in [
        ("uv", PackageManager::Uv),
        ("poetry", PackageManager::Poetry),
        ("pdm", PackageManager::Pdm),
    ] {
        if signals.facts.contains_key(&format!("tool:{}", tool)) {
            return pm;
        }
    }
    PYTHON_FILES[4..]
        .iter()
        .find(|(name, _)| signals.has(name))
        .map(|(_, pm)| *pm)
        .unwrap_or(PackageManager::Pip)
}
