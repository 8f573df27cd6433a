//! Rendering of build views.

use anyhow::Context;
use procmap_hierarchy::engine::Hierarchy;
use procmap_hierarchy::graph::{Diagnostic, DiagnosticSummary};
use serde::Serialize;

use crate::config::View;

/// Diagnostics view payload.
#[derive(Serialize)]
struct DiagnosticsView<'a> {
    summary: DiagnosticSummary,
    diagnostics: &'a [Diagnostic],
}

/// Renders one view of the build.
///
/// Every view except [`View::Outline`] is JSON.
pub fn render(hierarchy: &Hierarchy, view: View, pretty: bool) -> anyhow::Result<String> {
    match view {
        View::Graph => to_json(&hierarchy.graph.snapshot(), pretty),
        View::Tree => to_json(&hierarchy.tree, pretty),
        View::Diagnostics => to_json(
            &DiagnosticsView {
                summary: hierarchy.diagnostic_summary(),
                diagnostics: hierarchy.diagnostics(),
            },
            pretty,
        ),
        View::Outline => Ok(hierarchy.tree.outline()),
        View::Timeline => to_json(&hierarchy.tree.timeline(), pretty),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize view")
}
