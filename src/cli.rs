//! CLI argument parsing module for depscope

use crate::config::ConfigOverrides;
use crate::domain::{Ecosystem, RuntimeChange};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse an ecosystem name (`go`, `maven`, `gradle`, `sbt`, `node`, `python`, `ruby`)
fn parse_ecosystem(s: &str) -> Result<Ecosystem, String> {
    s.trim().parse()
}

/// Parse a version argument, rejecting blank values
fn parse_version(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty version string".to_string());
    }
    Ok(s.to_string())
}

/// Polyglot dependency analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depscope",
    version,
    about = "Dependency usage and upgrade-risk analyzer for polyglot projects"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    // Output options
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    // Configuration
    /// Config file (default: <project>/.depscope.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum directory depth to scan
    #[arg(long, global = true, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Never run external toolchains (go, mvn, gradle, sbt)
    #[arg(long, global = true)]
    pub no_tools: bool,

    /// Timeout for each toolchain command, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub tool_timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Detect ecosystems and package managers
    Detect {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Analyze dependency usage and criticality
    Analyze {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Assess the risk of moving a package between two versions
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CompareArgs {
    /// Project to look the package up in
    pub path: Option<PathBuf>,

    /// Package coordinate (`lodash`, `github.com/gin-gonic/gin`, `org.slf4j:slf4j-api`)
    #[arg(short, long)]
    pub package: String,

    /// Current version
    #[arg(long, value_parser = parse_version)]
    pub from: String,

    /// Target version
    #[arg(long, value_parser = parse_version)]
    pub to: String,

    /// Ecosystem of the package (default: from the project)
    #[arg(short, long, value_parser = parse_ecosystem)]
    pub ecosystem: Option<Ecosystem>,

    /// Changelog or release notes to mine
    #[arg(long, value_name = "FILE")]
    pub changelog: Option<PathBuf>,

    /// Runtime/toolchain version required before the upgrade
    #[arg(long, requires = "runtime_to")]
    pub runtime_from: Option<String>,

    /// Runtime/toolchain version required after the upgrade
    #[arg(long, requires = "runtime_from")]
    pub runtime_to: Option<String>,
}

impl CompareArgs {
    pub fn runtime_change(&self) -> Option<RuntimeChange> {
        match (&self.runtime_from, &self.runtime_to) {
            (Some(from), Some(to)) => Some(RuntimeChange {
                from: from.clone(),
                to: to.clone(),
            }),
            _ => None,
        }
    }
}

impl CliArgs {
    /// Project directory the command works on, if any
    pub fn project_path(&self) -> Option<&PathBuf> {
        match &self.command {
            Command::Detect { path } | Command::Analyze { path } => Some(path),
            Command::Compare(args) => args.path.as_ref(),
        }
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_depth: self.max_depth,
            no_tools: self.no_tools,
            tool_timeout_secs: self.tool_timeout,
        }
    }
}
