//! Merges declarations, usage and tool output into a [`DependencyGraph`]

use super::DependencyGraph;
use crate::domain::{
    DeclarationSource, DeclaredDependency, Dependency, DependencyOrigin, Ecosystem, ManifestFile,
    ManifestFormat, Scope,
};
use crate::tools::ToolFindings;
use crate::usage::UsageReport;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

type Key = (Ecosystem, String);

/// Accumulation state for one coordinate
#[derive(Debug)]
struct Node {
    dep: Dependency,
    /// Best scope from a primary manifest
    manifest_scope: Option<Scope>,
    /// Best scope from lock files or tools
    fallback_scope: Option<Scope>,
    /// Direct manifest declarations seen / how many had no bounded constraint
    direct_declarations: usize,
    unconstrained_declarations: usize,
}

impl Node {
    fn new(coordinate: &str, ecosystem: Ecosystem) -> Self {
        Self {
            dep: Dependency::new(coordinate, ecosystem),
            manifest_scope: None,
            fallback_scope: None,
            direct_declarations: 0,
            unconstrained_declarations: 0,
        }
    }
}

fn better_scope(current: Option<Scope>, candidate: Scope) -> Option<Scope> {
    match current {
        Some(scope) if scope.runtime_rank() >= candidate.runtime_rank() => Some(scope),
        _ => Some(candidate),
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Builder for [`DependencyGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<Key, Node>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, ecosystem: Ecosystem, coordinate: &str) -> &mut Node {
        self.nodes
            .entry((ecosystem, coordinate.to_string()))
            .or_insert_with(|| Node::new(coordinate, ecosystem))
    }

    /// Adds every declaration of a parsed file, plus lock-file `requires:` edges
    pub fn add_manifest(&mut self, file: &ManifestFile) -> &mut Self {
        // catalog entries only matter through the build files that reference them
        if file.format == ManifestFormat::VersionCatalog {
            return self;
        }
        for decl in &file.declarations {
            self.add_declaration(&file.path, decl);
        }

        let ecosystem = file.ecosystem();
        for (key, value) in &file.metadata.facts {
            let Some(parent) = key.strip_prefix("requires:") else {
                continue;
            };
            for child in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                let node = self.node(ecosystem, child);
                push_unique(&mut node.dep.required_by, parent.to_string());
            }
        }
        self
    }

    /// Adds one declaration read from `path`
    pub fn add_declaration(&mut self, path: &Path, decl: &DeclaredDependency) -> &mut Self {
        // unresolved `libs.x` catalog accessors have no group:artifact
        if decl.ecosystem.is_jvm() && !decl.coordinate.contains(':') {
            return self;
        }
        let node = self.node(decl.ecosystem, &decl.coordinate);
        let dep = &mut node.dep;

        push_unique(&mut dep.declared_in, path.to_path_buf());
        if let Some(group) = &decl.group {
            push_unique(&mut dep.groups, group.clone());
        }
        if let Some(raw) = decl.declared_raw() {
            if dep.declared_version.is_none() {
                dep.declared_version = Some(raw.to_string());
            }
            push_unique(&mut dep.declared_versions, raw.to_string());
        }
        if let Some(resolved) = &decl.resolved_version {
            dep.resolved_version.get_or_insert_with(|| resolved.clone());
        }
        if decl.origin != DependencyOrigin::Registry {
            dep.origin = decl.origin;
        }
        for exclusion in &decl.exclusions {
            push_unique(&mut dep.exclusions, exclusion.clone());
        }
        if let Some(replacement) = &decl.replacement {
            dep.replaced_by = Some(replacement.clone());
        }

        match decl.source {
            DeclarationSource::Manifest => {
                node.manifest_scope = better_scope(node.manifest_scope, decl.scope);
                if decl.is_direct {
                    dep.is_direct = true;
                    node.direct_declarations += 1;
                    let bounded = decl.version.as_ref().is_some_and(|v| !v.kind.is_unbounded());
                    if !bounded {
                        node.unconstrained_declarations += 1;
                    }
                }
            }
            DeclarationSource::Lockfile => {
                node.fallback_scope = better_scope(node.fallback_scope, decl.scope);
            }
        }
        self
    }

    /// Records measured usage for declared coordinates
    pub fn add_usage(&mut self, ecosystem: Ecosystem, report: &UsageReport) -> &mut Self {
        for (coordinate, usage) in &report.by_coordinate {
            if let Some(node) = self.nodes.get_mut(&(ecosystem, coordinate.clone())) {
                node.dep.usage_count += usage.count;
                let facts = &mut node.dep.usage;
                for file in &usage.facts.files {
                    push_unique(&mut facts.files, file.clone());
                }
                facts.wildcard_imports += usage.facts.wildcard_imports;
                facts.dot_imports += usage.facts.dot_imports;
                facts.cgo_files += usage.facts.cgo_files;
            }
        }
        self
    }

    /// Merges toolchain findings; tool versions override lock-file versions
    pub fn add_tool_findings(&mut self, ecosystem: Ecosystem, findings: &ToolFindings) -> &mut Self {
        for resolved in &findings.nodes {
            let node = self.node(ecosystem, &resolved.coordinate);
            let dep = &mut node.dep;
            if let Some(version) = &resolved.version {
                dep.resolved_version = Some(version.clone());
            }
            if let Some(scope) = resolved.scope {
                node.fallback_scope = better_scope(node.fallback_scope, scope);
            }
            for evicted in &resolved.evicted_versions {
                push_unique(&mut dep.evicted_versions, evicted.clone());
            }
            if resolved.conflict {
                dep.version_conflict = true;
            }
            if let Some(replacement) = &resolved.replaced_by {
                dep.replaced_by = Some(replacement.clone());
            }
        }
        for edge in &findings.edges {
            let node = self.node(ecosystem, &edge.to);
            push_unique(&mut node.dep.required_by, edge.from.clone());
        }
        self
    }

    /// Finalises derived fields and freezes the graph
    pub fn build(self) -> DependencyGraph {
        let mut dependencies: Vec<Dependency> = self
            .nodes
            .into_values()
            .map(|node| {
                let mut dep = node.dep;
                dep.scope = node
                    .manifest_scope
                    .or(node.fallback_scope)
                    .unwrap_or(Scope::Compile);
                dep.is_transitive = !dep.is_direct;
                dep.evicted = !dep.evicted_versions.is_empty();
                if dep.declared_versions.len() > 1 {
                    dep.version_conflict = true;
                }
                dep.unconstrained = node.direct_declarations > 0
                    && node.unconstrained_declarations == node.direct_declarations;
                dep.groups.sort();
                dep.required_by.sort();
                dep.declared_in.sort();
                dep
            })
            .collect();
        dependencies.sort_by(|a, b| {
            a.coordinate
                .cmp(&b.coordinate)
                .then(a.ecosystem.cmp(&b.ecosystem))
        });
        debug!("Built dependency graph with {} nodes", dependencies.len());
        DependencyGraph::from_sorted(dependencies)
    }
}
