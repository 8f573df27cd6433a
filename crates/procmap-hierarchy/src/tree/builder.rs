//! Tree builder expanding a process graph from a root process.

use petgraph::graph::NodeIndex;

use super::{ProcessTree, ProcessTreeNode, sort_siblings};
use crate::TRACING_TARGET_TREE;
use crate::error::{Error, Result};
use crate::graph::{Diagnostic, GraphNode, ProcessGraph};

/// Expands a [`ProcessGraph`] into a [`ProcessTree`].
///
/// Call activities with a resolved target are expanded recursively. The
/// processes on the active expansion path are tracked, and a call that would
/// re-enter one of them becomes a leaf carrying a `CycleTruncated`
/// diagnostic, so expansion terminates for any input.
pub struct TreeBuilder<'a> {
    graph: &'a ProcessGraph,
    sort_children: bool,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a tree builder that sorts children.
    pub fn new(graph: &'a ProcessGraph) -> Self {
        Self {
            graph,
            sort_children: true,
        }
    }

    /// Enables or disables sibling sorting; unsorted children keep
    /// declaration order.
    pub fn with_sort_children(mut self, sort_children: bool) -> Self {
        self.sort_children = sort_children;
        self
    }

    /// Builds the tree rooted at `root`, or at the first-loaded process.
    ///
    /// `root` matches a source identifier first, then a declared process id.
    pub fn build(&self, root: Option<&str>) -> Result<ProcessTree> {
        let (root_index, root_node) = self.find_root(root)?;

        tracing::debug!(
            target: TRACING_TARGET_TREE,
            root = %root_node.key,
            "expanding process tree"
        );

        let mut expansion = Expansion {
            graph: self.graph,
            sort_children: self.sort_children,
            path: Vec::new(),
            truncated: Vec::new(),
        };
        let root = expansion.expand_process(root_index, root_node);

        let mut diagnostics = self.graph.diagnostics().to_vec();
        diagnostics.extend(expansion.truncated);

        let tree = ProcessTree { root, diagnostics };
        tracing::info!(
            target: TRACING_TARGET_TREE,
            root = %tree.root.key,
            nodes = tree.node_count(),
            max_depth = tree.max_depth(),
            diagnostics = tree.diagnostics.len(),
            "process tree built"
        );

        Ok(tree)
    }

    fn find_root(&self, root: Option<&str>) -> Result<(NodeIndex, &'a GraphNode)> {
        let graph = self.graph;
        let mut processes = graph
            .process_nodes()
            .filter_map(|index| Some((index, graph.node_at(index)?)));

        let Some(root) = root.map(str::trim) else {
            return processes.next().ok_or(Error::NoDefinitions);
        };

        let processes: Vec<_> = processes.collect();
        if processes.is_empty() {
            return Err(Error::NoDefinitions);
        }

        processes
            .iter()
            .find(|(_, node)| node.key.source.as_str() == root)
            .or_else(|| processes.iter().find(|(_, node)| node.key.element_id == root))
            .copied()
            .ok_or_else(|| Error::RootNotFound {
                root: root.to_owned(),
            })
    }
}

/// State of one expansion run.
struct Expansion<'a> {
    graph: &'a ProcessGraph,
    sort_children: bool,
    /// Process nodes on the active expansion path, outermost first.
    path: Vec<NodeIndex>,
    /// Cycles found so far, without duplicates.
    truncated: Vec<Diagnostic>,
}

impl<'a> Expansion<'a> {
    fn expand_process(&mut self, process: NodeIndex, node: &'a GraphNode) -> ProcessTreeNode {
        let graph = self.graph;
        let mut tree_node = ProcessTreeNode::from(node);

        self.path.push(process);
        tree_node.children = graph
            .members(process)
            .iter()
            .filter_map(|&member| Some(self.expand_member(member, graph.node_at(member)?)))
            .collect();
        self.path.pop();

        if self.sort_children {
            sort_siblings(&mut tree_node.children);
        }
        tree_node
    }

    fn expand_member(&mut self, member: NodeIndex, node: &'a GraphNode) -> ProcessTreeNode {
        let graph = self.graph;
        let mut tree_node = ProcessTreeNode::from(node);
        if !node.kind.is_call_activity() {
            return tree_node;
        }

        let Some(target) = graph.call_target(member) else {
            tree_node.diagnostic = graph.unresolved_diagnostic(member).cloned();
            return tree_node;
        };

        if let Some(position) = self.path.iter().position(|&process| process == target) {
            let cycle_path = self.path[position..]
                .iter()
                .chain([&target])
                .filter_map(|&process| graph.node_at(process)?.process_ref())
                .collect();
            let diagnostic = Diagnostic::CycleTruncated {
                parent_file: node.key.source.clone(),
                element_id: node.key.element_id.clone(),
                cycle_path,
            };

            if !self.truncated.contains(&diagnostic) {
                tracing::warn!(
                    target: TRACING_TARGET_TREE,
                    kind = %diagnostic.kind(),
                    source = %node.key.source,
                    element_id = %node.key.element_id,
                    "{diagnostic}"
                );
                self.truncated.push(diagnostic.clone());
            }
            tree_node.diagnostic = Some(diagnostic);
            return tree_node;
        }

        if let Some(target_node) = graph.node_at(target) {
            tree_node.children.push(self.expand_process(target, target_node));
        }
        tree_node
    }
}
