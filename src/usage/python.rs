//! Python import scanner

use super::{FileImports, Import, ImportScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Scanner for `.py` files
pub struct PythonImportScanner;

// import a.b as c, d
static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+([\w., ]+?)\s*(?:#.*)?$").unwrap());

// from a.b import x, y | from a import * | from . import x
static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from\s+(\.*[\w.]*)\s+import\s+(.+)$").unwrap());

/// Toggles triple-quoted string state for every unescaped `"""` or `'''` on the line
fn toggles_docstring(line: &str) -> usize {
    line.matches("\"\"\"").count() + line.matches("'''").count()
}

impl ImportScanner for PythonImportScanner {
    fn scan(&self, content: &str) -> FileImports {
        let mut imports = FileImports::default();
        let mut in_docstring = false;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            let quotes = toggles_docstring(line);
            if in_docstring {
                if quotes % 2 == 1 {
                    in_docstring = false;
                }
                continue;
            }
            if quotes % 2 == 1 {
                in_docstring = true;
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            if let Some(caps) = FROM_RE.captures(line) {
                let module = &caps[1];
                // relative imports never name a distribution
                if module.starts_with('.') {
                    continue;
                }
                let names = caps[2].split('#').next().unwrap_or_default().trim();
                imports.imports.push(Import {
                    path: module.to_string(),
                    line: idx + 1,
                    wildcard: names == "*",
                    dot: false,
                });
                continue;
            }

            if let Some(caps) = IMPORT_RE.captures(line) {
                for part in caps[1].split(',') {
                    let module = part.split_whitespace().next().unwrap_or_default();
                    if module.is_empty() {
                        continue;
                    }
                    imports.imports.push(Import {
                        path: module.to_string(),
                        line: idx + 1,
                        wildcard: false,
                        dot: false,
                    });
                }
            }
        }
        imports
    }
}

/// Modules shipped with CPython
const STDLIB: &[&str] = &[
    "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect", "builtins", "calendar",
    "collections", "concurrent", "configparser", "contextlib", "copy", "csv", "ctypes",
    "dataclasses", "datetime", "decimal", "difflib", "email", "enum", "errno", "functools", "gc",
    "getpass", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http", "importlib", "inspect",
    "io", "ipaddress", "itertools", "json", "logging", "math", "mimetypes", "multiprocessing",
    "operator", "os", "pathlib", "pickle", "platform", "pprint", "queue", "random", "re",
    "secrets", "select", "shlex", "shutil", "signal", "socket", "sqlite3", "ssl", "stat",
    "statistics", "string", "struct", "subprocess", "sys", "tempfile", "textwrap", "threading",
    "time", "timeit", "tomllib", "traceback", "types", "typing", "unittest", "urllib", "uuid",
    "warnings", "weakref", "xml", "zipfile", "zlib", "zoneinfo", "__future__",
];

/// True for CPython standard-library modules
pub(crate) fn is_std_import(path: &str) -> bool {
    let top = path.split('.').next().unwrap_or(path);
    STDLIB.contains(&top)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#""""Module docstring.

import not_an_import
"""
import os, sys
import numpy as np
from requests.adapters import HTTPAdapter
from yaml import *
from . import sibling
from .models import User

def handler():
    import boto3  # lazy
    from sklearn.linear_model import (
        LinearRegression,
    )
"#;

    #[test]
    fn test_scan_imports() {
        let scanned = PythonImportScanner.scan(SOURCE);
        let paths: Vec<&str> = scanned.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "os",
                "sys",
                "numpy",
                "requests.adapters",
                "yaml",
                "boto3",
                "sklearn.linear_model",
            ]
        );
        let yaml = scanned.imports.iter().find(|i| i.path == "yaml").unwrap();
        assert!(yaml.wildcard);
        assert_eq!(yaml.line, 8);
    }

    #[test]
    fn test_std_import() {
        assert!(is_std_import("os.path"));
        assert!(is_std_import("collections"));
        assert!(!is_std_import("requests"));
    }
}
