//! Progress display on stderr
//!
//! The analysis runs as a fixed sequence of [`Stage`]s. Each stage shows a
//! spinner, except manifest parsing which shows a bar over the located files.
//! Nothing is drawn when disabled (quiet, JSON or non-terminal stderr).

use crate::domain::Ecosystem;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// One step of the analysis workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detecting,
    Scanning,
    Measuring(Ecosystem),
    Consulting(Ecosystem),
    Scoring,
}

impl Stage {
    pub fn message(&self) -> String {
        match self {
            Stage::Detecting => "Detecting ecosystems...".to_string(),
            Stage::Scanning => "Scanning project files...".to_string(),
            Stage::Measuring(ecosystem) => format!("Measuring {} usage...", ecosystem),
            Stage::Consulting(ecosystem) => format!("Consulting {} tooling...", ecosystem),
            Stage::Scoring => "Scoring dependencies...".to_string(),
        }
    }
}

/// Progress reporter for the analysis workflow
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
    /// Stages started so far, shown as a step counter
    step: usize,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: None,
            step: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Replaces the current display with a spinner for `stage`
    pub fn stage(&mut self, stage: Stage) {
        self.clear();
        self.step += 1;
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{prefix:.dim} {spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.set_prefix(format!("[{}]", self.step));
        spinner.set_message(stage.message());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Starts the parsing bar over `total` manifests
    pub fn parsing(&mut self, total: usize) {
        self.clear();
        self.step += 1;
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.dim} {spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .expect("Invalid template")
                .progress_chars("█▓▒░"),
        );
        bar.set_prefix(format!("[{}]", self.step));
        bar.set_message("Parsing manifests");
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Advances the parsing bar past `relative`
    pub fn parsed(&self, relative: &Path) {
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("Parsed {}", relative.display()));
            bar.inc(1);
        }
    }

    /// Removes whatever is currently drawn
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_messages() {
        assert_eq!(Stage::Detecting.message(), "Detecting ecosystems...");
        assert_eq!(Stage::Measuring(Ecosystem::Go).message(), "Measuring Go usage...");
        assert_eq!(
            Stage::Consulting(Ecosystem::Node).message(),
            "Consulting Node.js tooling..."
        );
    }

    #[test]
    fn test_disabled_progress_counts_steps() {
        let mut progress = Progress::disabled();
        progress.stage(Stage::Scanning);
        progress.parsing(2);
        progress.parsed(Path::new("go.mod"));
        progress.stage(Stage::Scoring);
        assert_eq!(progress.step(), 3);
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_enabled_progress_replaces_bar() {
        let mut progress = Progress::new(true);
        progress.parsing(2);
        progress.parsed(Path::new("go.mod"));
        progress.parsed(Path::new("go.sum"));
        progress.stage(Stage::Consulting(Ecosystem::Go));
        assert!(progress.bar.is_some());
        progress.clear();
        assert!(progress.bar.is_none());
        assert_eq!(progress.step(), 2);
    }
}
