//! Configuration loading
//!
//! Settings come from, in order of precedence:
//!
//! 1. CLI flags ([`ConfigOverrides`])
//! 2. the file passed with `--config`
//! 3. `<project>/.depscope.toml`
//! 4. built-in defaults
//!
//! ```toml
//! [scan]
//! max_depth = 6
//! extra_ignore_dirs = ["fixtures"]
//!
//! [tools]
//! enabled = true
//! timeout_secs = 90
//!
//! [scoring]
//! high_threshold = 5
//! medium_threshold = 3
//!
//! [scoring.critical]
//! node = ["@acme/"]
//! go = ["github.com/acme/platform"]
//! ```

use crate::domain::Ecosystem;
use crate::error::ConfigError;
use crate::locator::{Locator, DEFAULT_MAX_DEPTH};
use crate::scoring::ScoringConfig;
use crate::tools::DEFAULT_TOOL_TIMEOUT;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Project-level config file name
pub const CONFIG_FILE_NAME: &str = ".depscope.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    scan: ScanSection,
    tools: ToolsSection,
    scoring: ScoringSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScanSection {
    max_depth: Option<usize>,
    extra_ignore_dirs: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ToolsSection {
    enabled: Option<bool>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScoringSection {
    high_threshold: Option<i32>,
    medium_threshold: Option<i32>,
    /// Ecosystem name -> extra critical-package entries
    critical: BTreeMap<String, Vec<String>>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub max_depth: Option<usize>,
    pub no_tools: bool,
    pub tool_timeout_secs: Option<u64>,
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_depth: usize,
    pub extra_ignore_dirs: Vec<String>,
    pub tools_enabled: bool,
    pub tool_timeout: Duration,
    pub scoring: ScoringConfig,
    /// File the settings were read from
    pub source: Option<PathBuf>,
    /// Problems with an implicitly discovered config file
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extra_ignore_dirs: Vec::new(),
            tools_enabled: true,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            scoring: ScoringConfig::default(),
            source: None,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the explicit file, else the project file, else defaults
    ///
    /// An explicit file that is missing or malformed is an error. A malformed
    /// project file falls back to defaults with a warning.
    pub fn load(project: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let implicit = project.join(CONFIG_FILE_NAME);
        if !implicit.is_file() {
            return Ok(Self::default());
        }
        match Self::from_file(&implicit) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Ignoring {}: {}", implicit.display(), e);
                Ok(Self {
                    warnings: vec![format!("ignored {}: {}", implicit.display(), e)],
                    ..Self::default()
                })
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content, path)?;
        config.source = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates config file content
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let defaults = Self::default();
        let mut critical = BTreeMap::new();
        for (name, entries) in file.scoring.critical {
            let ecosystem: Ecosystem = name
                .parse()
                .map_err(|_| ConfigError::InvalidEcosystem { value: name.clone() })?;
            critical
                .entry(ecosystem)
                .or_insert_with(Vec::new)
                .extend(entries);
        }

        let config = Self {
            max_depth: file.scan.max_depth.unwrap_or(defaults.max_depth),
            extra_ignore_dirs: file.scan.extra_ignore_dirs,
            tools_enabled: file.tools.enabled.unwrap_or(defaults.tools_enabled),
            tool_timeout: file
                .tools
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.tool_timeout),
            scoring: ScoringConfig {
                medium_threshold: file
                    .scoring
                    .medium_threshold
                    .unwrap_or(defaults.scoring.medium_threshold),
                high_threshold: file
                    .scoring
                    .high_threshold
                    .unwrap_or(defaults.scoring.high_threshold),
                critical,
            },
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Applies CLI values on top of the loaded settings
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(depth) = overrides.max_depth {
            self.max_depth = depth;
        }
        if overrides.no_tools {
            self.tools_enabled = false;
        }
        if let Some(secs) = overrides.tool_timeout_secs {
            self.tool_timeout = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 {
            return Err(ConfigError::invalid("scan.max_depth must be at least 1"));
        }
        if self.tool_timeout.as_secs() < 1 {
            return Err(ConfigError::invalid("tools.timeout_secs must be at least 1"));
        }
        if self.scoring.medium_threshold >= self.scoring.high_threshold {
            return Err(ConfigError::invalid(format!(
                "scoring.medium_threshold ({}) must be below scoring.high_threshold ({})",
                self.scoring.medium_threshold, self.scoring.high_threshold
            )));
        }
        Ok(())
    }

    pub fn locator(&self) -> Locator {
        Locator::new(self.max_depth).with_ignored(self.extra_ignore_dirs.iter().cloned())
    }
}
