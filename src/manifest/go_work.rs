//! go.work parser for Go workspaces
//!
//! A workspace file declares no dependencies of its own; it lists the
//! module directories in use and may carry workspace-wide replacements.

use crate::domain::{DeclaredDependency, ManifestFormat, ManifestMetadata};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

/// Parser for go.work files
pub struct GoWorkParser;

static USE_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^use\s+(\S+)$").unwrap());
static USE_BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^use\s*\($").unwrap());
static VERSION_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(go|toolchain)\s+(\S+)$").unwrap());

impl ManifestParser for GoWorkParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::GoWork
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let mut depth = 0usize;
        for (idx, line) in content.lines().enumerate() {
            let text = line.split("//").next().unwrap_or("").trim();
            if text.ends_with('(') {
                depth += 1;
            } else if text == ")" {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ManifestError::line_error("go.work", idx + 1, "unbalanced ')'")
                })?;
            }
        }
        Ok(Vec::new())
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let mut in_use_block = false;

        for line in content.lines() {
            let text = line.split("//").next().unwrap_or("").trim();
            if text.is_empty() {
                continue;
            }

            if in_use_block {
                if text == ")" {
                    in_use_block = false;
                } else {
                    meta.includes.push(text.trim_matches('"').to_string());
                }
                continue;
            }

            if USE_BLOCK_START_RE.is_match(text) {
                in_use_block = true;
            } else if let Some(caps) = USE_SINGLE_RE.captures(text) {
                meta.includes.push(caps[1].trim_matches('"').to_string());
            } else if let Some(caps) = VERSION_DIRECTIVE_RE.captures(text) {
                meta.facts.insert(caps[1].to_string(), caps[2].to_string());
            }
        }

        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKSPACE: &str = r#"
go 1.22

use (
	./api
	./worker // background jobs
)

use ./tools
"#;

    #[test]
    fn test_parse_declares_nothing() {
        assert!(GoWorkParser.parse(WORKSPACE).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_use_entries() {
        let meta = GoWorkParser.metadata(WORKSPACE);
        assert_eq!(meta.includes, vec!["./api", "./worker", "./tools"]);
        assert_eq!(meta.fact("go"), Some("1.22"));
    }

    #[test]
    fn test_unbalanced_paren() {
        let err = GoWorkParser.parse("go 1.22\n)\n").unwrap_err();
        assert!(err.to_string().contains("unbalanced"));
    }
}
