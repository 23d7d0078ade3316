//! depscope - Dependency usage and upgrade-risk analyzer CLI tool
//!
//! Supported ecosystems:
//! - Go (go.mod, go.sum, go.work)
//! - JVM (Maven, Gradle, SBT)
//! - Node.js (package.json and lock files)
//! - Python (pyproject.toml, requirements, Pipfile, lock files)
//! - Ruby (Gemfile, Gemfile.lock)

use clap::Parser;
use depscope::analyzer::{Analyzer, CompareRequest};
use depscope::cli::{CliArgs, Command};
use depscope::config::Config;
use depscope::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG wins; otherwise --verbose selects debug, --quiet error, default warn
fn init_tracing(args: &CliArgs) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let project = args
        .project_path()
        .map(|p| p.as_path())
        .unwrap_or_else(|| Path::new("."));
    let config = Config::load(project, args.config.as_deref())?.with_overrides(&args.overrides())?;

    if args.verbose {
        eprintln!("depscope v{}", env!("CARGO_PKG_VERSION"));
        if let Some(source) = &config.source {
            eprintln!("Config: {}", source.display());
        }
    }

    let show_progress = !args.quiet && !args.json && io::stderr().is_terminal();
    let analyzer = Analyzer::new(config).with_progress(show_progress);

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet)
        .with_color(io::stdout().is_terminal());
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();

    let partial = match &args.command {
        Command::Detect { path } => {
            let report = analyzer.detect(path)?;
            formatter.format_detection(&report, &mut stdout)?;
            !report.warnings.is_empty()
        }
        Command::Analyze { path } => {
            let analysis = analyzer.analyze(path).await?;
            formatter.format_usage(&analysis, &mut stdout)?;
            analysis.has_errors()
        }
        Command::Compare(compare) => {
            let request = CompareRequest {
                project: compare.path.clone(),
                package: compare.package.clone(),
                from: compare.from.clone(),
                to: compare.to.clone(),
                ecosystem: compare.ecosystem,
                changelog: compare.changelog.clone(),
                runtime: compare.runtime_change(),
            };
            let comparison = analyzer.compare(&request).await?;
            formatter.format_comparison(&comparison, &mut stdout)?;
            !comparison.warnings.is_empty()
        }
    };
    stdout.flush()?;

    if partial {
        // Partial success - the run completed with warnings
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
