//! Input and build configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use procmap_hierarchy::engine::BuildConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// What to load and how to resolve it.
///
/// # Environment Variables
///
/// - `PROCMAP_INPUT` - Comma-separated definition files or directories
/// - `PROCMAP_OVERRIDES` - Override table file
/// - `PROCMAP_ROOT` - Root source identifier or process id
/// - `PROCMAP_NO_NAME_HEURISTIC` - Disable normalized-name resolution
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct InputConfig {
    /// Definition files or directories.
    ///
    /// A file holds one definition or an array of definitions. Directories
    /// are scanned recursively for `*.json` files in lexical order.
    #[arg(long, env = "PROCMAP_INPUT", value_delimiter = ',', required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Override table: a JSON list of `{ source, element_id, target }`.
    #[arg(long, env = "PROCMAP_OVERRIDES")]
    pub overrides: Option<PathBuf>,

    /// Root of the tree, matched against source identifiers and then
    /// process ids. Defaults to the first loaded definition.
    #[arg(long, env = "PROCMAP_ROOT")]
    pub root: Option<String>,

    /// Only resolve call activities by override or exact process id.
    #[arg(long, env = "PROCMAP_NO_NAME_HEURISTIC")]
    #[serde(default)]
    pub no_name_heuristic: bool,
}

impl InputConfig {
    /// Builds the library configuration from the CLI options.
    pub fn build_config(&self) -> anyhow::Result<BuildConfig> {
        let mut builder = BuildConfig::builder().with_name_heuristic(!self.no_name_heuristic);
        if let Some(root) = &self.root {
            builder = builder.with_root(root.clone());
        }
        builder.build().context("root must name a source or process id")
    }

    /// Logs input configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            inputs = ?self.input,
            overrides = ?self.overrides,
            root = ?self.root,
            name_heuristic = !self.no_name_heuristic,
            "input configuration"
        );
    }
}
