//! Process graph representation.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::diagnostic::{Diagnostic, DiagnosticSummary};
use super::edge::{EdgeRecord, GraphEdge};
use super::node::{GraphNode, NodeKey};
use crate::definition::DefinitionId;
use crate::order::NodeOrder;

/// All processes, elements, flows and subprocess calls of one build.
///
/// Internally uses petgraph's `DiGraph` as the node arena; nodes are
/// addressed by [`NodeIndex`] or by their stable [`NodeKey`]. A graph is
/// an immutable snapshot once returned by [`GraphBuilder`].
///
/// [`GraphBuilder`]: super::GraphBuilder
#[derive(Debug, Clone, Default)]
pub struct ProcessGraph {
    /// The underlying directed graph.
    graph: DiGraph<GraphNode, GraphEdge>,
    /// Mapping from node identity to petgraph's index.
    node_indices: HashMap<NodeKey, NodeIndex>,
    /// Process node per definition, `None` when the definition was skipped.
    processes: Vec<Option<NodeIndex>>,
    /// Elements of each process node in declaration order.
    members: HashMap<NodeIndex, Vec<NodeIndex>>,
    /// Owning process node of each element.
    owners: HashMap<NodeIndex, NodeIndex>,
    /// The `MissingDependency` recorded for each unresolved call activity.
    unresolved: HashMap<NodeIndex, usize>,
    /// Diagnostics in the order they were found.
    diagnostics: Vec<Diagnostic>,
}

impl ProcessGraph {
    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the index of a node by identity.
    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_indices.get(key).copied()
    }

    /// Returns a node by identity.
    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.node_at(self.index_of(key)?)
    }

    /// Returns a node by index.
    pub fn node_at(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(index)
    }

    /// Returns whether a node exists.
    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.node_indices.contains_key(key)
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.graph
            .node_indices()
            .filter_map(|index| Some((index, self.graph.node_weight(index)?)))
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRecord> + '_ {
        self.graph.edge_references().filter_map(|edge_ref| {
            Some(EdgeRecord {
                from: self.graph.node_weight(edge_ref.source())?.key.clone(),
                to: self.graph.node_weight(edge_ref.target())?.key.clone(),
                edge: edge_ref.weight().clone(),
            })
        })
    }

    /// Returns the process node of a definition.
    pub fn process_node(&self, definition: DefinitionId) -> Option<NodeIndex> {
        self.processes.get(definition.index()).copied().flatten()
    }

    /// Iterates over all process nodes in load order.
    pub fn process_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.processes.iter().filter_map(|process| *process)
    }

    /// Returns the elements of a process node in declaration order.
    pub fn members(&self, process: NodeIndex) -> &[NodeIndex] {
        self.members
            .get(&process)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the process node a call activity resolves to.
    pub fn call_target(&self, call: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(call, Direction::Outgoing)
            .find(|edge_ref| edge_ref.weight().is_subprocess_call())
            .map(|edge_ref| edge_ref.target())
    }

    /// Returns the call activities resolving to a process node, in
    /// insertion order.
    pub fn callers(&self, process: NodeIndex) -> Vec<NodeIndex> {
        let mut callers: Vec<_> = self
            .graph
            .edges_directed(process, Direction::Incoming)
            .filter(|edge_ref| edge_ref.weight().is_subprocess_call())
            .map(|edge_ref| edge_ref.source())
            .collect();
        callers.sort_unstable();
        callers.dedup();
        callers
    }

    /// Returns the process nodes no other process calls, in load order.
    ///
    /// Self-calls do not count; these are candidates for a root.
    pub fn entry_processes(&self) -> Vec<NodeIndex> {
        self.process_nodes()
            .filter(|&process| {
                self.callers(process)
                    .into_iter()
                    .all(|caller| self.owner_of(caller) == Some(process))
            })
            .collect()
    }

    /// Returns the process node an element belongs to.
    pub fn owner_of(&self, element: NodeIndex) -> Option<NodeIndex> {
        self.owners.get(&element).copied()
    }

    /// Returns the diagnostic recorded for an unresolved call activity.
    pub fn unresolved_diagnostic(&self, call: NodeIndex) -> Option<&Diagnostic> {
        self.diagnostics.get(*self.unresolved.get(&call)?)
    }

    /// Returns all diagnostics in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns diagnostic counts grouped by kind.
    pub fn diagnostic_summary(&self) -> DiagnosticSummary {
        DiagnosticSummary::from_diagnostics(&self.diagnostics)
    }

    /// Returns a serializable snapshot of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self.edges().collect(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Returns a reference to the underlying petgraph.
    pub fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }

    pub(crate) fn add_process(&mut self, definition: DefinitionId, node: GraphNode) -> NodeIndex {
        let index = self.add_node(node);
        if self.processes.len() <= definition.index() {
            self.processes.resize(definition.index() + 1, None);
        }
        self.processes[definition.index()] = Some(index);
        self.members.insert(index, Vec::new());
        index
    }

    pub(crate) fn add_member(&mut self, process: NodeIndex, node: GraphNode) -> NodeIndex {
        let index = self.add_node(node);
        self.members.entry(process).or_default().push(index);
        self.owners.insert(index, process);
        index
    }

    pub(crate) fn skip_definition(&mut self, definition: DefinitionId) {
        if self.processes.len() <= definition.index() {
            self.processes.resize(definition.index() + 1, None);
        }
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) {
        self.graph.add_edge(from, to, edge);
    }

    pub(crate) fn set_order(&mut self, index: NodeIndex, order: NodeOrder) {
        if let Some(node) = self.graph.node_weight_mut(index) {
            node.order = order;
        }
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn push_unresolved(&mut self, call: NodeIndex, diagnostic: Diagnostic) {
        self.unresolved.insert(call, self.diagnostics.len());
        self.diagnostics.push(diagnostic);
    }

    fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let key = node.key.clone();
        let index = self.graph.add_node(node);
        self.node_indices.insert(key, index);
        index
    }
}

/// Serializable snapshot of a [`ProcessGraph`].
///
/// Nodes and edges appear in insertion order, so identical inputs produce
/// identical snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes in insertion order.
    pub nodes: Vec<GraphNode>,
    /// Edges in insertion order.
    pub edges: Vec<EdgeRecord>,
    /// Diagnostics in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}
