//! Process execution for toolchain commands

use crate::error::ToolUnavailable;
use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default limit for one toolchain invocation
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Keep at most this many trailing stderr lines in error messages
const STDERR_TAIL_LINES: usize = 5;

/// A program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for running toolchain commands
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs `command` in `cwd` and returns its stdout
    async fn run(&self, command: &ToolCommand, cwd: &Path) -> Result<String, ToolUnavailable>;
}

/// Runner that executes real processes with a timeout
#[derive(Debug, Clone)]
pub struct SystemToolRunner {
    timeout: Duration,
}

impl Default for SystemToolRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_TIMEOUT)
    }
}

impl SystemToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, command: &ToolCommand, cwd: &Path) -> Result<String, ToolUnavailable> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ToolUnavailable::binary_missing(command.program.clone()),
                _ => ToolUnavailable::Failed {
                    command: command.to_string(),
                    status: "spawn error".to_string(),
                    stderr: e.to_string(),
                },
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolUnavailable::Failed {
                    command: command.to_string(),
                    status: "io error".to_string(),
                    stderr: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ToolUnavailable::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(ToolUnavailable::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runner used when external tools are switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRunner;

#[async_trait]
impl ToolRunner for DisabledRunner {
    async fn run(&self, _command: &ToolCommand, _cwd: &Path) -> Result<String, ToolUnavailable> {
        Err(ToolUnavailable::Disabled)
    }
}
