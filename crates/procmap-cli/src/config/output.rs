//! Output configuration.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Which view of the build to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Nodes, edges and diagnostics.
    Graph,
    /// The rooted tree and diagnostics.
    #[default]
    Tree,
    /// Diagnostics with per-kind counts.
    Diagnostics,
    /// Indented plain-text outline.
    Outline,
    /// Pre-order rows with ordering attributes.
    Timeline,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Graph => "graph",
            Self::Tree => "tree",
            Self::Diagnostics => "diagnostics",
            Self::Outline => "outline",
            Self::Timeline => "timeline",
        };
        f.write_str(name)
    }
}

/// What to write and where.
///
/// # Environment Variables
///
/// - `PROCMAP_VIEW` - View to write (default: tree)
/// - `PROCMAP_PRETTY` - Pretty-print JSON
/// - `PROCMAP_OUTPUT` - Output file (default: stdout)
/// - `PROCMAP_DENY_DIAGNOSTICS` - Exit with status 2 on any diagnostic
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct OutputConfig {
    /// View to write.
    #[arg(long, env = "PROCMAP_VIEW", value_enum, default_value_t = View::Tree)]
    #[serde(default)]
    pub view: View,

    /// Pretty-print JSON output.
    #[arg(long, env = "PROCMAP_PRETTY")]
    #[serde(default)]
    pub pretty: bool,

    /// File to write the view to instead of stdout.
    #[arg(long, env = "PROCMAP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Exit with status 2 when the build reports any diagnostic.
    #[arg(long, env = "PROCMAP_DENY_DIAGNOSTICS")]
    #[serde(default)]
    pub deny_diagnostics: bool,
}

impl OutputConfig {
    /// Logs output configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            view = %self.view,
            pretty = self.pretty,
            output = ?self.output,
            deny_diagnostics = self.deny_diagnostics,
            "output configuration"
        );
    }
}
