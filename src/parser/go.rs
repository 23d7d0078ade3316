//! Go (go mod) version specification parser
//!
//! Handles version formats:
//! - Semantic version: `v1.2.3`
//! - Prerelease: `v1.2.3-beta.1`
//! - Pseudo-version: `v0.0.0-20210101120000-abcdef123456`
//! - Incompatible major: `v2.0.0+incompatible`
//!
//! go.mod has no ranges: every requirement is a minimum that the
//! resolver treats as the selected version unless something newer wins.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// Go module version specification parser
pub struct GoVersionParser;

// Standard semver: v1.2.3, v1.2.3-beta.1
static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)(\+incompatible)?$").unwrap()
});

// Pseudo-versions, in their three shapes:
//   vX.0.0-yyyymmddhhmmss-abcdefabcdef
//   vX.Y.Z-pre.0.yyyymmddhhmmss-abcdefabcdef
//   vX.Y.(Z+1)-0.yyyymmddhhmmss-abcdefabcdef
static PSEUDO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+\.\d+\.\d+-(?:[0-9A-Za-z.-]*\.)?(?:0\.)?\d{14}-[a-f0-9]{12})(\+incompatible)?$")
        .unwrap()
});

/// Returns true if a Go version string is a commit-derived pseudo-version
pub fn is_pseudo_version(version: &str) -> bool {
    PSEUDO_VERSION_RE.is_match(version.trim())
}

impl VersionParser for GoVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        // Pseudo-versions pin a commit
        if let Some(caps) = PSEUDO_VERSION_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(
                VersionSpec::new(VersionSpecKind::Pseudo, trimmed, version).with_operator("v"),
            );
        }

        if let Some(caps) = SEMVER_RE.captures(trimmed) {
            let version = caps.get(1)?.as_str();
            return Some(
                VersionSpec::new(VersionSpecKind::Exact, trimmed, version).with_operator("v"),
            );
        }

        None
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }
}
