//! Go import scanner
//!
//! Handles single-line imports, parenthesised import blocks, named, blank
//! (`_`) and dot (`.`) imports, and the cgo pseudo-package `"C"`.

use super::{FileImports, Import, ImportScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Scanner for `.go` files
pub struct GoImportScanner;

// import "fmt" | import f "fmt" | import . "fmt"
static SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+([A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]+)""#).unwrap());

// a line inside an import block
static SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]+)""#).unwrap());

fn push(imports: &mut FileImports, alias: Option<&str>, path: &str, line: usize) {
    if path == "C" {
        imports.cgo = true;
        return;
    }
    imports.imports.push(Import {
        path: path.to_string(),
        line,
        wildcard: false,
        dot: alias.map(str::trim) == Some("."),
    });
}

impl ImportScanner for GoImportScanner {
    fn scan(&self, content: &str) -> FileImports {
        let mut imports = FileImports::default();
        let mut in_block = false;
        let mut in_comment = false;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let mut line = raw.trim();

            if in_comment {
                match line.find("*/") {
                    Some(end) => {
                        in_comment = false;
                        line = line[end + 2..].trim();
                    }
                    None => continue,
                }
            }
            if let Some(start) = line.find("/*") {
                if !line[start..].contains("*/") {
                    in_comment = true;
                }
                line = line[..start].trim();
            }
            let line = line.split("//").next().unwrap_or(line).trim();
            if line.is_empty() {
                continue;
            }

            if in_block {
                if line.starts_with(')') {
                    in_block = false;
                } else if let Some(caps) = SPEC_RE.captures(line) {
                    push(&mut imports, caps.get(1).map(|m| m.as_str()), &caps[2], line_no);
                }
                continue;
            }

            if line == "import (" || line.starts_with("import (") {
                in_block = true;
                continue;
            }
            if let Some(caps) = SINGLE_RE.captures(line) {
                push(&mut imports, caps.get(1).map(|m| m.as_str()), &caps[2], line_no);
                continue;
            }

            // imports precede every other top-level declaration
            if line.starts_with("func ")
                || line.starts_with("type ")
                || line.starts_with("var ")
                || line.starts_with("const ")
            {
                break;
            }
        }
        imports
    }
}

/// Standard-library paths have no dot in their first element
pub(crate) fn is_std_import(path: &str) -> bool {
    !path.split('/').next().unwrap_or(path).contains('.')
}
