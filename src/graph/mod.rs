//! Canonical dependency graph
//!
//! [`GraphBuilder`] folds parser output, usage counts and optional toolchain
//! reports into one node per `(ecosystem, coordinate)`. [`DependencyGraph`]
//! is the finished snapshot: sorted by coordinate and never mutated in place.

mod builder;

pub use builder::GraphBuilder;

use crate::domain::{Dependency, Ecosystem};
use std::collections::BTreeSet;

/// Immutable set of dependency nodes sorted by coordinate, then ecosystem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    dependencies: Vec<Dependency>,
}

impl DependencyGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub(crate) fn from_sorted(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// First node with this coordinate in any ecosystem
    pub fn find(&self, coordinate: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.coordinate == coordinate)
    }

    pub fn get(&self, ecosystem: Ecosystem, coordinate: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.ecosystem == ecosystem && d.coordinate == coordinate)
    }

    pub fn direct(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.is_direct)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.version_conflict)
    }

    /// Coordinates of one ecosystem, in graph order
    pub fn coordinates(&self, ecosystem: Ecosystem) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|d| d.ecosystem == ecosystem)
            .map(|d| d.coordinate.clone())
            .collect()
    }

    pub fn ecosystems(&self) -> BTreeSet<Ecosystem> {
        self.dependencies.iter().map(|d| d.ecosystem).collect()
    }

    /// Returns a new snapshot with every node passed through `f`
    pub fn map_nodes<F>(self, f: F) -> Self
    where
        F: FnMut(Dependency) -> Dependency,
    {
        Self {
            dependencies: self.dependencies.into_iter().map(f).collect(),
        }
    }

    pub fn into_dependencies(self) -> Vec<Dependency> {
        self.dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeclaredDependency, ManifestFile, ManifestFormat, Scope};
    use std::path::Path;

    fn sample() -> DependencyGraph {
        let mut builder = DependencyGraph::builder();
        let path = Path::new("go.mod");
        builder
            .add_declaration(
                path,
                &DeclaredDependency::new("github.com/spf13/cobra", Ecosystem::Go, Scope::Compile),
            )
            .add_declaration(
                path,
                &DeclaredDependency::new("golang.org/x/sys", Ecosystem::Go, Scope::Compile).indirect(),
            );
        let mut package_json = ManifestFile::new("web/package.json", ManifestFormat::PackageJson);
        package_json
            .declarations
            .push(DeclaredDependency::new("axios", Ecosystem::Node, Scope::Compile));
        builder.add_manifest(&package_json);
        builder.build()
    }

    #[test]
    fn test_sorted_by_coordinate() {
        let graph = sample();
        let coords: Vec<&str> = graph.iter().map(|d| d.coordinate.as_str()).collect();
        assert_eq!(coords, vec!["axios", "github.com/spf13/cobra", "golang.org/x/sys"]);
    }

    #[test]
    fn test_queries() {
        let graph = sample();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.direct().count(), 2);
        assert!(graph.get(Ecosystem::Node, "github.com/spf13/cobra").is_none());
        assert_eq!(graph.coordinates(Ecosystem::Go).len(), 2);
        assert_eq!(graph.ecosystems().len(), 2);
    }

    #[test]
    fn test_map_nodes_returns_new_snapshot() {
        let graph = sample();
        let before = graph.clone();
        let mapped = graph.map_nodes(|mut d| {
            d.usage_count = 7;
            d
        });
        assert!(mapped.iter().all(|d| d.usage_count == 7));
        assert!(before.iter().all(|d| d.usage_count == 0));
    }
}
