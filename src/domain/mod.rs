//! Core domain models for depscope
//!
//! This module contains the fundamental types used throughout the application:
//! - Ecosystem and package-manager identities
//! - Declared version constraint types
//! - Declared dependencies and canonical graph nodes
//! - Parsed manifest files
//! - Detection, version-diff, changelog and recommendation results
//! - Analysis output structures

mod analysis;
mod changelog;
mod criticality;
mod dependency;
mod detection;
mod ecosystem;
mod manifest_file;
mod recommendation;
mod version_diff;
mod version_spec;

pub use analysis::{
    DependencyUsageAnalysis, ManifestSummary, RuntimeChange, ToolReport, UsageSummary,
    VersionComparisonAnalysis,
};
pub use changelog::{ChangelogClassification, ChangelogSection};
pub use criticality::Criticality;
pub use dependency::{
    DeclarationSource, DeclaredDependency, Dependency, DependencyOrigin, Scope, UsageFacts,
};
pub use detection::{Confidence, DetectionReport, EcosystemDetection, Evidence, EvidenceTier};
pub use ecosystem::{Ecosystem, PackageManager};
pub use manifest_file::{is_requirements_name, ManifestFile, ManifestFormat, ManifestMetadata};
pub use recommendation::{Complexity, Recommendation, RiskFactor, RiskLevel};
pub use version_diff::{Compatibility, Direction, SemverType, VersionDiff};
pub use version_spec::{is_unstable_version, VersionSpec, VersionSpecKind};
