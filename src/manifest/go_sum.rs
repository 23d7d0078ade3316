//! go.sum parser
//!
//! Each module version appears with a content hash and/or a `/go.mod` hash.
//! Only content-hash lines mean the module was downloaded; go.sum is sorted
//! by version, so the last content line per module is the highest one.

use crate::domain::{DeclaredDependency, Ecosystem, ManifestFormat};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;

/// Parser for go.sum files
pub struct GoSumParser;

impl ManifestParser for GoSumParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::GoSum
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let mut entries: Vec<DeclaredDependency> = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let [module, version, hash] = fields[..] else {
                return Err(ManifestError::line_error(
                    "go.sum",
                    idx + 1,
                    "expected '<module> <version> <hash>'",
                ));
            };
            if !hash.starts_with("h1:") && !hash.contains(':') {
                return Err(ManifestError::line_error("go.sum", idx + 1, "malformed hash"));
            }
            if version.ends_with("/go.mod") {
                continue;
            }

            let entry = DeclaredDependency::locked(module, Ecosystem::Go, version).at_line(idx + 1);
            match entries.iter_mut().find(|e| e.coordinate == module) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        Ok(entries)
    }
}
