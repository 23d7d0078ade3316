//! Manifest and source file discovery
//!
//! Walks a project tree depth-first with `walkdir`, skipping version-control,
//! build-output and dependency-cache directories, and classifies every file
//! the later stages care about:
//! - manifests and lock files (anything [`ManifestFormat::from_path`] knows)
//! - marker files that only count as detection evidence (`mvnw`, `.nvmrc`)
//! - source files whose imports are scanned for usage

use crate::domain::{Ecosystem, ManifestFormat};
use crate::error::InputError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Default number of directory levels walked below the root
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Directories never descended into
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "node_modules",
    "bower_components",
    ".yarn",
    ".pnpm-store",
    ".next",
    ".nuxt",
    "target",
    "build",
    "dist",
    "out",
    "vendor",
    ".bundle",
    ".gradle",
    ".venv",
    "venv",
    ".tox",
    ".nox",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "site-packages",
    ".eggs",
    "coverage",
    ".bsp",
    ".metals",
];

/// Files that say something about the toolchain without declaring dependencies
const MARKER_FILES: &[&str] = &[
    "mvnw",
    "mvnw.cmd",
    "gradlew",
    "gradlew.bat",
    "gradle.properties",
    "gradle-wrapper.properties",
    "gradle.lockfile",
    ".nvmrc",
    ".node-version",
    ".npmrc",
    ".yarnrc",
    ".yarnrc.yml",
    "bun.lockb",
    "bun.lock",
    "pnpm-workspace.yaml",
    "lerna.json",
    "tsconfig.json",
    ".python-version",
    "setup.py",
    "setup.cfg",
    "pdm.lock",
    "tox.ini",
    ".ruby-version",
    "Rakefile",
    "config.ru",
    ".tool-versions",
    "go.work.sum",
];

/// What a located file is useful for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A parseable manifest or lock file
    Manifest(ManifestFormat),
    /// Toolchain marker, used only as detection evidence
    Marker,
    /// Source file in one of the supported languages
    Source,
}

/// A file found under the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    pub path: PathBuf,
    /// Path relative to the project root
    pub relative: PathBuf,
    pub kind: FileKind,
}

impl LocatedFile {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// True for a file sitting directly in the project root
    pub fn is_top_level(&self) -> bool {
        self.relative.components().count() == 1
    }
}

/// Everything the locator found, sorted by relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedFiles {
    pub root: PathBuf,
    pub files: Vec<LocatedFile>,
    /// Unreadable directories and entries, skipped
    pub warnings: Vec<String>,
}

impl LocatedFiles {
    /// Manifests with their formats
    pub fn manifests(&self) -> impl Iterator<Item = (&LocatedFile, ManifestFormat)> {
        self.files.iter().filter_map(|f| match f.kind {
            FileKind::Manifest(format) => Some((f, format)),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &LocatedFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Marker)
    }

    /// Source files whose extension belongs to `ecosystem`
    pub fn sources_for(&self, ecosystem: Ecosystem) -> impl Iterator<Item = &LocatedFile> {
        let extensions = ecosystem.source_extensions();
        self.files.iter().filter(move |f| {
            f.kind == FileKind::Source && f.extension().is_some_and(|e| extensions.contains(&e))
        })
    }

    pub fn has_format(&self, format: ManifestFormat) -> bool {
        self.manifests().any(|(_, f)| f == format)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Bounded-depth project walker
#[derive(Debug, Clone)]
pub struct Locator {
    max_depth: usize,
    ignored: BTreeSet<String>,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Locator {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            ignored: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Adds directory names to the ignore set
    pub fn with_ignored<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.ignored.contains(name))
    }

    /// Walks `root` and classifies every interesting file
    ///
    /// Only a missing root or a root that is not a directory is an error.
    /// Entries deeper than the depth limit are skipped silently; unreadable
    /// entries are skipped with a warning.
    pub fn locate(&self, root: &Path) -> Result<LocatedFiles, InputError> {
        if !root.exists() {
            return Err(InputError::project_not_found(root));
        }
        if !root.is_dir() {
            return Err(InputError::not_a_directory(root));
        }

        let mut located = LocatedFiles {
            root: root.to_path_buf(),
            ..Default::default()
        };

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    warn!(path = %path, error = %e, "skipping unreadable entry");
                    located.warnings.push(format!("skipped {}: {}", path, e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(kind) = classify(entry.path()) else {
                continue;
            };
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            located.files.push(LocatedFile {
                path: entry.path().to_path_buf(),
                relative,
                kind,
            });
        }

        located.files.sort_by(|a, b| a.relative.cmp(&b.relative));
        debug!(
            root = %root.display(),
            files = located.files.len(),
            "located project files"
        );
        Ok(located)
    }
}

/// Classifies a single path, or `None` when nothing downstream needs it
pub fn classify(path: &Path) -> Option<FileKind> {
    if let Some(format) = ManifestFormat::from_path(path) {
        return Some(FileKind::Manifest(format));
    }
    let name = path.file_name()?.to_str()?;
    if MARKER_FILES.contains(&name) || name.ends_with(".gemspec") {
        return Some(FileKind::Marker);
    }
    let extension = path.extension()?.to_str()?;
    Ecosystem::all()
        .iter()
        .any(|eco| eco.source_extensions().contains(&extension))
        .then_some(FileKind::Source)
}
