//! Hierarchy builder running index, graph, order and tree in sequence.

use serde::Serialize;

use super::config::BuildConfig;
use crate::TRACING_TARGET_ENGINE;
use crate::definition::{ProcessDefinition, ProcessDefinitionIndex};
use crate::error::{Error, Result};
use crate::graph::{Diagnostic, DiagnosticSummary, GraphBuilder, ProcessGraph};
use crate::resolve::OverrideTable;
use crate::tree::{ProcessTree, TreeBuilder};

/// Output of one build: an immutable snapshot of graph and tree.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    /// The definitions the build ran on.
    pub definitions: ProcessDefinitionIndex,
    /// Every process, element and edge.
    pub graph: ProcessGraph,
    /// The rooted, cycle-safe expansion of the graph.
    pub tree: ProcessTree,
}

impl Hierarchy {
    /// Returns every diagnostic of the build: graph diagnostics followed by
    /// cycles truncated during tree expansion.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.tree.diagnostics()
    }

    /// Returns diagnostic counts grouped by kind.
    pub fn diagnostic_summary(&self) -> DiagnosticSummary {
        DiagnosticSummary::from_diagnostics(self.diagnostics())
    }

    /// Returns build statistics.
    pub fn stats(&self) -> BuildStats {
        BuildStats {
            definitions: self.definitions.len(),
            graph_nodes: self.graph.node_count(),
            graph_edges: self.graph.edge_count(),
            tree_nodes: self.tree.node_count(),
            diagnostics: self.diagnostics().len(),
        }
    }
}

/// Build statistics, logged after each build and available to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Loaded definitions.
    pub definitions: usize,
    /// Graph nodes.
    pub graph_nodes: usize,
    /// Graph edges.
    pub graph_edges: usize,
    /// Tree nodes.
    pub tree_nodes: usize,
    /// Diagnostics of the build.
    pub diagnostics: usize,
}

/// Runs a full hierarchy build.
///
/// Every call owns its inputs and outputs; nothing is shared between builds,
/// so identical inputs always yield identical output.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    config: BuildConfig,
}

impl HierarchyBuilder {
    /// Creates a new hierarchy builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Returns the build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Builds the graph and tree of the given definitions.
    ///
    /// Fails only on invocation misuse: no definitions, or a designated root
    /// matching nothing.
    pub fn build(
        &self,
        definitions: Vec<ProcessDefinition>,
        overrides: &OverrideTable,
    ) -> Result<Hierarchy> {
        if definitions.is_empty() {
            return Err(Error::NoDefinitions);
        }

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            definitions = definitions.len(),
            overrides = overrides.len(),
            root = ?self.config.root,
            name_heuristic = self.config.name_heuristic,
            "starting hierarchy build"
        );

        let definitions = ProcessDefinitionIndex::new(definitions);
        let graph = GraphBuilder::new(&definitions, overrides)
            .with_name_heuristic(self.config.name_heuristic)
            .build();
        let tree = TreeBuilder::new(&graph)
            .with_sort_children(self.config.sort_children)
            .build(self.config.root.as_deref())?;

        let hierarchy = Hierarchy {
            definitions,
            graph,
            tree,
        };

        let stats = hierarchy.stats();
        tracing::info!(
            target: TRACING_TARGET_ENGINE,
            definitions = stats.definitions,
            graph_nodes = stats.graph_nodes,
            graph_edges = stats.graph_edges,
            tree_nodes = stats.tree_nodes,
            diagnostics = stats.diagnostics,
            "hierarchy build completed"
        );

        Ok(hierarchy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Element, EventKind};
    use crate::graph::{DiagnosticKind, GraphSnapshot};

    fn definitions() -> Vec<ProcessDefinition> {
        vec![
            ProcessDefinition::new("onboarding.bpmn", "onboarding")
                .with_name("Customer Onboarding")
                .with_element(Element::event("start", EventKind::Start))
                .with_element(Element::call_activity("call_kyc", Some("KYC Check")))
                .with_element(Element::call_activity("call_offer", Some("offer")))
                .with_element(Element::call_activity("call_self", Some("onboarding")))
                .with_flow("f1", "start", "call_kyc")
                .with_flow("f2", "call_kyc", "call_offer")
                .with_flow("f3", "call_offer", "call_self"),
            ProcessDefinition::new("processes/kyc-check.bpmn", "kyc_v2")
                .with_element(Element::user_task("collect"))
                .with_element(Element::call_activity("back", Some("onboarding"))),
        ]
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = HierarchyBuilder::default().build(Vec::new(), &OverrideTable::new());
        assert!(matches!(result, Err(Error::NoDefinitions)));
    }

    #[test]
    fn test_unknown_root_is_error() {
        let config = BuildConfig::builder()
            .with_root("missing.bpmn")
            .build()
            .expect("config is valid");
        let result = HierarchyBuilder::new(config).build(definitions(), &OverrideTable::new());
        assert!(matches!(result, Err(Error::RootNotFound { .. })));
    }

    #[test]
    fn test_full_build() {
        let hierarchy = HierarchyBuilder::default()
            .build(definitions(), &OverrideTable::new())
            .expect("build should succeed");

        let summary = hierarchy.diagnostic_summary();
        assert_eq!(summary.count(DiagnosticKind::MissingDependency), 1);
        // onboarding -> onboarding and onboarding -> kyc -> onboarding
        assert_eq!(summary.count(DiagnosticKind::CycleTruncated), 2);
        assert_eq!(summary.total, 3);

        let outline = hierarchy.tree.outline();
        assert_eq!(
            outline,
            "Customer Onboarding\n  start\n  call_kyc\n    kyc_v2\n      collect\n      back [cycle_truncated]\n  call_offer [missing_dependency]\n  call_self [cycle_truncated]\n"
        );
    }

    #[test]
    fn test_name_heuristic_disabled() {
        let config = BuildConfig::builder()
            .with_name_heuristic(false)
            .build()
            .expect("config is valid");
        let hierarchy = HierarchyBuilder::new(config)
            .build(definitions(), &OverrideTable::new())
            .expect("build should succeed");

        let summary = hierarchy.diagnostic_summary();
        assert_eq!(summary.count(DiagnosticKind::MissingDependency), 2);
    }

    #[test]
    fn test_root_by_process_id() {
        let config = BuildConfig::builder()
            .with_root("kyc_v2")
            .build()
            .expect("config is valid");
        let hierarchy = HierarchyBuilder::new(config)
            .build(definitions(), &OverrideTable::new())
            .expect("build should succeed");
        assert_eq!(hierarchy.tree.root.label, "kyc_v2");
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let builder = HierarchyBuilder::default();
        let overrides = OverrideTable::new();
        let first = builder.build(definitions(), &overrides).expect("build");
        let second = builder.build(definitions(), &overrides).expect("build");

        let graph = |h: &Hierarchy| -> GraphSnapshot { h.graph.snapshot() };
        assert_eq!(
            serde_json::to_string(&graph(&first)).expect("serialization failed"),
            serde_json::to_string(&graph(&second)).expect("serialization failed")
        );
        assert_eq!(
            serde_json::to_string(&first.tree).expect("serialization failed"),
            serde_json::to_string(&second.tree).expect("serialization failed")
        );
        assert_eq!(first.stats(), second.stats());
    }
}
