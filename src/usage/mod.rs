//! Source-level usage scanning
//!
//! Each ecosystem has an [`ImportScanner`] that extracts import/require
//! statements from one source file. [`measure`] runs the scanner over every
//! located source file, maps import paths to dependency coordinates with a
//! [`CoordinateMatcher`] and counts distinct reference sites.

mod go;
mod jvm;
mod matcher;
mod node;
mod python;
mod ruby;

pub use go::GoImportScanner;
pub use jvm::JvmImportScanner;
pub use matcher::{normalize_python_name, CoordinateMatcher};
pub use node::NodeImportScanner;
pub use python::PythonImportScanner;
pub use ruby::RubyImportScanner;

use crate::domain::{Ecosystem, UsageFacts};
use crate::locator::LocatedFiles;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tracing::{debug, warn};

/// One import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported module, package or require path
    pub path: String,
    /// 1-based line number
    pub line: usize,
    /// `import a.b.*`, `import a._`, `from a import *`
    pub wildcard: bool,
    /// Go `import . "pkg"`
    pub dot: bool,
}

/// Imports found in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileImports {
    pub imports: Vec<Import>,
    /// The file imports the cgo pseudo-package
    pub cgo: bool,
}

/// Trait for extracting imports from source text
pub trait ImportScanner: Send + Sync {
    fn scan(&self, content: &str) -> FileImports;
}

/// Get the import scanner for an ecosystem
pub fn get_scanner(ecosystem: Ecosystem) -> Box<dyn ImportScanner> {
    match ecosystem {
        Ecosystem::Go => Box::new(GoImportScanner),
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => Box::new(JvmImportScanner),
        Ecosystem::Node => Box::new(NodeImportScanner),
        Ecosystem::Python => Box::new(PythonImportScanner),
        Ecosystem::Ruby => Box::new(RubyImportScanner),
    }
}

/// True when an import path belongs to the language's standard library
pub fn is_std_import(ecosystem: Ecosystem, path: &str) -> bool {
    match ecosystem {
        Ecosystem::Go => go::is_std_import(path),
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => jvm::is_std_import(path),
        Ecosystem::Node => node::is_std_import(path),
        Ecosystem::Python => python::is_std_import(path),
        Ecosystem::Ruby => ruby::is_std_import(path),
    }
}

/// Usage measured for one coordinate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateUsage {
    /// Distinct (file, line) reference sites
    pub count: usize,
    pub facts: UsageFacts,
}

/// Result of scanning an ecosystem's sources
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub by_coordinate: BTreeMap<String, CoordinateUsage>,
    /// Non-standard imports that matched no declared coordinate
    pub unresolved: BTreeSet<String>,
    pub files_scanned: usize,
    pub warnings: Vec<String>,
}

impl UsageReport {
    /// Reference-site count for a coordinate (0 when never imported)
    pub fn count(&self, coordinate: &str) -> usize {
        self.by_coordinate.get(coordinate).map_or(0, |u| u.count)
    }
}

/// Scans the ecosystem's source files and attributes imports to `coordinates`
pub fn measure(located: &LocatedFiles, ecosystem: Ecosystem, coordinates: &[String]) -> UsageReport {
    let scanner = get_scanner(ecosystem);
    let matcher = CoordinateMatcher::new(ecosystem, coordinates);
    let mut report = UsageReport::default();

    for file in located.sources_for(ecosystem) {
        let content = match fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", file.path.display(), e);
                report
                    .warnings
                    .push(format!("could not read {}: {}", file.relative.display(), e));
                continue;
            }
        };
        report.files_scanned += 1;

        let scanned = scanner.scan(&content);
        let mut sites: BTreeSet<(usize, &str)> = BTreeSet::new();
        let mut touched: BTreeSet<&str> = BTreeSet::new();

        for import in &scanned.imports {
            // declared coordinates win over stdlib names (`net/http/persistent`)
            let matches = matcher.resolve(&import.path);
            if matches.is_empty() {
                if !is_std_import(ecosystem, &import.path) {
                    report.unresolved.insert(import.path.clone());
                }
                continue;
            }
            for coordinate in matches {
                let usage = report.by_coordinate.entry(coordinate.to_string()).or_default();
                if sites.insert((import.line, coordinate)) {
                    usage.count += 1;
                }
                if import.wildcard {
                    usage.facts.wildcard_imports += 1;
                }
                if import.dot {
                    usage.facts.dot_imports += 1;
                }
                touched.insert(coordinate);
            }
        }

        for coordinate in touched {
            let usage = report.by_coordinate.entry(coordinate.to_string()).or_default();
            usage.facts.files.push(file.relative.clone());
            if scanned.cgo {
                usage.facts.cgo_files += 1;
            }
        }
    }

    debug!(
        "{}: scanned {} files, {} coordinates referenced, {} unresolved imports",
        ecosystem,
        report.files_scanned,
        report.by_coordinate.len(),
        report.unresolved.len()
    );
    report
}
