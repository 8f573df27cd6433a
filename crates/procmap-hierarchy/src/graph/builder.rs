//! Graph builder assembling definitions into one process graph.
//!
//! The builder takes a [`ProcessDefinitionIndex`] and an [`OverrideTable`]
//! and produces a [`ProcessGraph`].
//!
//! # Build Process
//!
//! 1. **Nodes**: One process node per definition, one node per element
//! 2. **Sequence flows**: One edge per flow whose endpoints both exist
//! 3. **Subprocess calls**: Resolve every call activity to a process node
//! 4. **Ordering**: Index each process and attach the order to its nodes
//!
//! No phase can fail. Malformed input is skipped and recorded as a
//! [`Diagnostic`].

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;

use super::diagnostic::Diagnostic;
use super::edge::GraphEdge;
use super::node::{GraphNode, NodeKey};
use super::process_graph::ProcessGraph;
use crate::TRACING_TARGET_GRAPH;
use crate::definition::{DefinitionId, ProcessDefinition, ProcessDefinitionIndex};
use crate::order::OrderIndexer;
use crate::resolve::{OverrideTable, ReferenceResolver, Resolution};

/// Nodes a single definition contributed to the graph.
struct LocalNodes<'d> {
    process: NodeIndex,
    elements: HashMap<&'d str, NodeIndex>,
}

/// Builds a [`ProcessGraph`] from a loaded definition set.
pub struct GraphBuilder<'a> {
    /// Definitions to assemble.
    index: &'a ProcessDefinitionIndex,
    /// Resolver for cross-definition call activity links.
    resolver: ReferenceResolver<'a>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a new graph builder.
    pub fn new(index: &'a ProcessDefinitionIndex, overrides: &'a OverrideTable) -> Self {
        Self {
            index,
            resolver: ReferenceResolver::new(index, overrides),
        }
    }

    /// Enables or disables normalized-name matching of call references.
    pub fn with_name_heuristic(mut self, enabled: bool) -> Self {
        self.resolver = self.resolver.with_name_heuristic(enabled);
        self
    }

    /// Builds the graph. Always returns a graph, even for empty input.
    pub fn build(&self) -> ProcessGraph {
        let mut graph = ProcessGraph::default();

        // Phase 1: Emit process and element nodes
        let locals: Vec<_> = self
            .index
            .iter()
            .map(|(id, definition)| self.add_nodes(&mut graph, id, definition))
            .collect();

        // Phase 2: Emit sequence flows within each definition
        for ((_, definition), local) in self.index.iter().zip(&locals) {
            if let Some(local) = local {
                self.add_flows(&mut graph, definition, local);
            }
        }

        // Phase 3: Resolve call activities into subprocess calls
        for ((_, definition), local) in self.index.iter().zip(&locals) {
            if let Some(local) = local {
                self.add_calls(&mut graph, definition, local);
            }
        }

        // Phase 4: Attach execution order to element nodes
        for ((_, definition), local) in self.index.iter().zip(&locals) {
            if let Some(local) = local {
                self.apply_order(&mut graph, definition, local);
            }
        }

        tracing::info!(
            target: TRACING_TARGET_GRAPH,
            definitions = self.index.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            diagnostics = graph.diagnostics().len(),
            "process graph built"
        );

        graph
    }

    /// Emits the process node and element nodes of one definition.
    ///
    /// Returns `None` when the process identity is already taken.
    fn add_nodes<'d>(
        &self,
        graph: &mut ProcessGraph,
        id: DefinitionId,
        definition: &'d ProcessDefinition,
    ) -> Option<LocalNodes<'d>> {
        let process_ref = definition.process_ref();
        if graph.contains_node(&NodeKey::from(process_ref.clone())) {
            graph.skip_definition(id);
            Self::record(
                graph,
                Diagnostic::DuplicateElement {
                    parent_file: definition.source.clone(),
                    element_id: definition.process_id.clone(),
                },
            );
            return None;
        }

        let process = graph.add_process(id, GraphNode::process(process_ref, definition.label(), id));
        let mut elements = HashMap::with_capacity(definition.elements.len());

        for element in &definition.elements {
            let node = GraphNode::element(&definition.source, element);
            if graph.contains_node(&node.key) {
                Self::record(
                    graph,
                    Diagnostic::DuplicateElement {
                        parent_file: definition.source.clone(),
                        element_id: element.id.clone(),
                    },
                );
                continue;
            }
            elements.insert(element.id.as_str(), graph.add_member(process, node));
        }

        tracing::debug!(
            target: TRACING_TARGET_GRAPH,
            source = %definition.source,
            process_id = %definition.process_id,
            elements = elements.len(),
            "added process nodes"
        );

        Some(LocalNodes { process, elements })
    }

    /// Emits one sequence-flow edge per flow with two known endpoints.
    fn add_flows(&self, graph: &mut ProcessGraph, definition: &ProcessDefinition, local: &LocalNodes<'_>) {
        for flow in &definition.flows {
            let from = local.elements.get(flow.source_ref.as_str()).copied();
            let to = local.elements.get(flow.target_ref.as_str()).copied();

            if let (Some(from), Some(to)) = (from, to) {
                graph.add_edge(
                    from,
                    to,
                    GraphEdge::SequenceFlow {
                        flow_id: flow.id.clone(),
                    },
                );
                continue;
            }

            for (endpoint, reference) in [(from, &flow.source_ref), (to, &flow.target_ref)] {
                if endpoint.is_none() {
                    Self::record(
                        graph,
                        Diagnostic::DanglingSequenceFlow {
                            parent_file: definition.source.clone(),
                            flow_id: flow.id.clone(),
                            missing_ref: reference.clone(),
                        },
                    );
                }
            }
        }
    }

    /// Resolves every call activity and emits its subprocess call edge.
    fn add_calls(&self, graph: &mut ProcessGraph, definition: &ProcessDefinition, local: &LocalNodes<'_>) {
        let mut seen = HashSet::new();

        for call in definition.call_activities() {
            if !seen.insert(call.element_id) {
                continue;
            }
            let Some(&node) = local.elements.get(call.element_id) else {
                continue;
            };
            // The kept node is the first declaration of the id, which may not
            // be this call activity.
            if !graph
                .node_at(node)
                .is_some_and(|kept| kept.kind.is_call_activity())
            {
                continue;
            }

            let resolution =
                self.resolver
                    .resolve(&definition.source, call.element_id, call.called_element);

            match resolution {
                Resolution::Resolved(target) => match graph.process_node(target.definition) {
                    Some(process) => {
                        tracing::debug!(
                            target: TRACING_TARGET_GRAPH,
                            source = %definition.source,
                            element_id = call.element_id,
                            definition = %target.definition,
                            strategy = %target.strategy,
                            "resolved subprocess call"
                        );
                        graph.add_edge(
                            node,
                            process,
                            GraphEdge::SubprocessCall {
                                strategy: target.strategy,
                            },
                        );
                    }
                    None => {
                        let attempted_target = self
                            .index
                            .get(target.definition)
                            .map(|target| target.process_ref().to_string());
                        Self::record_unresolved(
                            graph,
                            node,
                            Diagnostic::MissingDependency {
                                parent_file: definition.source.clone(),
                                element_id: call.element_id.to_owned(),
                                attempted_target,
                            },
                        );
                    }
                },
                Resolution::Unresolved(Diagnostic::AmbiguousReference {
                    parent_file,
                    element_id,
                    reference,
                    candidates,
                }) => {
                    Self::record(
                        graph,
                        Diagnostic::AmbiguousReference {
                            parent_file: parent_file.clone(),
                            element_id: element_id.clone(),
                            reference: reference.clone(),
                            candidates,
                        },
                    );
                    Self::record_unresolved(
                        graph,
                        node,
                        Diagnostic::MissingDependency {
                            parent_file,
                            element_id,
                            attempted_target: Some(reference),
                        },
                    );
                }
                Resolution::Unresolved(diagnostic) => {
                    Self::record_unresolved(graph, node, diagnostic);
                }
            }
        }
    }

    /// Attaches order index, branch id and visual order to element nodes.
    fn apply_order(&self, graph: &mut ProcessGraph, definition: &ProcessDefinition, local: &LocalNodes<'_>) {
        let order = OrderIndexer::new(definition).index();
        for (element_id, &node) in &local.elements {
            if let Some(node_order) = order.get(element_id) {
                graph.set_order(node, node_order.clone());
            }
        }

        tracing::debug!(
            target: TRACING_TARGET_GRAPH,
            source = %definition.source,
            process = ?local.process,
            ordered = order.len(),
            starts = order.starts().len(),
            "attached execution order"
        );
    }

    fn record(graph: &mut ProcessGraph, diagnostic: Diagnostic) {
        tracing::warn!(
            target: TRACING_TARGET_GRAPH,
            kind = %diagnostic.kind(),
            source = %diagnostic.parent_file(),
            "{diagnostic}"
        );
        graph.push_diagnostic(diagnostic);
    }

    fn record_unresolved(graph: &mut ProcessGraph, call: NodeIndex, diagnostic: Diagnostic) {
        tracing::warn!(
            target: TRACING_TARGET_GRAPH,
            kind = %diagnostic.kind(),
            source = %diagnostic.parent_file(),
            "{diagnostic}"
        );
        graph.push_unresolved(call, diagnostic);
    }
}
