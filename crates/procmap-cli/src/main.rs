#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod loader;
mod render;

use std::fs;
use std::io::{self, Write};
use std::process;

use anyhow::Context;
use procmap_hierarchy::engine::{Hierarchy, HierarchyBuilder};

use crate::config::{Cli, OutputConfig};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "procmap_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "procmap_cli::config";
pub const TRACING_TARGET_LOADER: &str = "procmap_cli::loader";
pub const TRACING_TARGET_OUTPUT: &str = "procmap_cli::output";

/// Exit status when `--deny-diagnostics` is set and the build reported any.
const EXIT_DIAGNOSTICS: i32 = 2;

/// How a successful run ended.
enum Outcome {
    /// The view was written.
    Completed,
    /// The view was written, but diagnostics were denied.
    DiagnosticsDenied { count: usize },
}

fn main() {
    let error = match run() {
        Ok(Outcome::Completed) => process::exit(0),
        Ok(Outcome::DiagnosticsDenied { count }) => {
            tracing::warn!(
                target: TRACING_TARGET_OUTPUT,
                diagnostics = count,
                "build reported diagnostics"
            );
            process::exit(EXIT_DIAGNOSTICS);
        }
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %format!("{error:#}"),
            "build failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
fn run() -> anyhow::Result<Outcome> {
    let cli = Cli::init();
    cli.init_tracing()?;
    cli.log();

    let config = cli
        .input
        .build_config()
        .context("invalid build configuration")?;

    let definitions =
        loader::load_definitions(&cli.input.input).context("failed to load definitions")?;
    let overrides = match &cli.input.overrides {
        Some(path) => loader::load_overrides(path).context("failed to load override table")?,
        None => Default::default(),
    };

    let hierarchy = HierarchyBuilder::new(config)
        .build(definitions, &overrides)
        .context("hierarchy build failed")?;

    write_view(&hierarchy, &cli.output)?;

    let count = hierarchy.diagnostics().len();
    if cli.output.deny_diagnostics && count > 0 {
        return Ok(Outcome::DiagnosticsDenied { count });
    }
    Ok(Outcome::Completed)
}

/// Renders the requested view to the output file or stdout.
fn write_view(hierarchy: &Hierarchy, output: &OutputConfig) -> anyhow::Result<()> {
    let rendered = render::render(hierarchy, output.view, output.pretty)?;

    match &output.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                target: TRACING_TARGET_OUTPUT,
                path = %path.display(),
                view = %output.view,
                bytes = rendered.len(),
                "view written"
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("failed to write to stdout")?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n").context("failed to write to stdout")?;
            }
        }
    }

    Ok(())
}
