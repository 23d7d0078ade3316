//! Application error types using thiserror
//!
//! Error hierarchy:
//! - InputError: project path, manifests or requested package missing (fails the call)
//! - ManifestError: a single file failed to parse (recorded per file)
//! - ToolUnavailable: an external toolchain could not be consulted (degrades to warnings)
//! - ConfigError: configuration file or CLI value problems

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing project or package
    #[error(transparent)]
    Input(#[from] InputError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that abort an analysis
#[derive(Error, Debug)]
pub enum InputError {
    /// Project path does not exist
    #[error("project path not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// Project path is a file
    #[error("project path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Project contains no supported manifest
    #[error("no supported manifest found in {path}")]
    NoManifest { path: PathBuf },

    /// Package is not declared by the analyzed project
    #[error("'{package}' is not a dependency of {project}")]
    PackageNotFound { package: String, project: PathBuf },

    /// Requested version string is empty
    #[error("empty {which} version for '{package}'")]
    EmptyVersion { package: String, which: &'static str },

    /// Ecosystem could not be determined for a comparison
    #[error("cannot determine ecosystem for '{package}': pass --ecosystem or run inside a project")]
    UnknownEcosystem { package: String },

    /// Changelog file missing or unreadable
    #[error("failed to read changelog {path}: {source}")]
    ChangelogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to manifest file parsing
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (package.json, package-lock.json, Pipfile.lock)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (pyproject.toml, Pipfile, poetry.lock, uv.lock, libs.versions.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// XML parsing error (pom.xml)
    #[error("failed to parse XML in {path}: {message}")]
    XmlParseError { path: PathBuf, message: String },

    /// Line-oriented format error (go.mod, Gemfile, requirements.txt, build scripts)
    #[error("{path}:{line}: {message}")]
    LineError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Unsupported manifest format
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Reasons an external tool could not contribute data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolUnavailable {
    /// Tool use was switched off
    #[error("external tools disabled")]
    Disabled,

    /// Binary not on PATH
    #[error("'{tool}' is not installed or not on PATH")]
    BinaryMissing { tool: String },

    /// Exceeded the configured timeout
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// Non-zero exit status
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Output could not be interpreted
    #[error("could not parse output of '{command}': {message}")]
    Unparseable { command: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown types
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// A value failed validation
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    /// Invalid ecosystem name
    #[error("invalid ecosystem '{value}': expected go, maven, gradle, sbt, node, python or ruby")]
    InvalidEcosystem { value: String },
}

impl InputError {
    /// Creates a new ProjectNotFound error
    pub fn project_not_found(path: impl Into<PathBuf>) -> Self {
        InputError::ProjectNotFound { path: path.into() }
    }

    /// Creates a new NotADirectory error
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        InputError::NotADirectory { path: path.into() }
    }
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new XmlParseError
    pub fn xml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::XmlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new LineError
    pub fn line_error(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        ManifestError::LineError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Replaces the placeholder path set by content-only parsers with the real file path
    pub fn with_path(self, real: impl Into<PathBuf>) -> Self {
        let real = real.into();
        match self {
            ManifestError::NotFound { .. } => ManifestError::NotFound { path: real },
            ManifestError::ReadError { source, .. } => ManifestError::ReadError { path: real, source },
            ManifestError::JsonParseError { message, .. } => {
                ManifestError::JsonParseError { path: real, message }
            }
            ManifestError::TomlParseError { message, .. } => {
                ManifestError::TomlParseError { path: real, message }
            }
            ManifestError::XmlParseError { message, .. } => {
                ManifestError::XmlParseError { path: real, message }
            }
            ManifestError::LineError { line, message, .. } => ManifestError::LineError {
                path: real,
                line,
                message,
            },
            ManifestError::UnsupportedFormat { .. } => {
                ManifestError::UnsupportedFormat { path: real }
            }
        }
    }
}

impl ToolUnavailable {
    /// Creates a new BinaryMissing error
    pub fn binary_missing(tool: impl Into<String>) -> Self {
        ToolUnavailable::BinaryMissing { tool: tool.into() }
    }

    /// Creates a new Unparseable error
    pub fn unparseable(command: impl Into<String>, message: impl Into<String>) -> Self {
        ToolUnavailable::Unparseable {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new Invalid error
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }
}
