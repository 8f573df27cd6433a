//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── input: InputConfig    # Definition paths, overrides, root, resolution
//! ├── output: OutputConfig  # View, formatting, destination, exit policy
//! └── log_format: LogFormat # Pretty or JSON logs on stderr
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Build from a directory and print the outline
//! procmap --input ./definitions --view outline
//!
//! # Or via environment variables
//! PROCMAP_INPUT=./definitions PROCMAP_VIEW=outline procmap
//! ```

mod input;
mod output;

use std::io;
use std::process;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
pub use input::InputConfig;
pub use output::{OutputConfig, View};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Complete CLI configuration.
///
/// Combines all configuration groups:
/// - [`InputConfig`]: What to load and how to resolve it
/// - [`OutputConfig`]: What to write and where
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "procmap")]
#[command(about = "Builds process hierarchies from JSON process definitions")]
#[command(version)]
pub struct Cli {
    /// Input and build configuration.
    #[clap(flatten)]
    pub input: InputConfig,

    /// Output configuration.
    #[clap(flatten)]
    pub output: OutputConfig,

    /// Log line format; logs always go to stderr.
    #[arg(long, env = "PROCMAP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing on stderr with environment-based filtering.
    ///
    /// The level defaults to `info` and can be overridden with `RUST_LOG`.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| anyhow!("failed to create env filter: {e}"))?;
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Pretty => registry
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr))
                .try_init(),
        }
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
    }

    /// Logs build information and logging setup at debug level, then the
    /// input and output configuration at info level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            log_format = ?self.log_format,
            "logging configuration"
        );

        self.input.log();
        self.output.log();
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["procmap", "--input", "defs"]).expect("valid arguments");
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert_eq!(cli.output.view, View::Tree);
        assert!(!cli.output.pretty);
        assert!(!cli.output.deny_diagnostics);
        assert!(!cli.input.no_name_heuristic);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["procmap"]).is_err());
    }
}
