//! Rooted, cycle-safe process hierarchy.
//!
//! This module expands a [`ProcessGraph`] into a single tree:
//! - [`ProcessTree`]: The root node plus every diagnostic of the build
//! - [`ProcessTreeNode`]: A node with its ordered children
//! - [`TreeBuilder`]: Expands the graph from a designated root process
//! - [`compare_siblings`]: Total comparator used to order siblings
//!
//! [`ProcessGraph`]: crate::graph::ProcessGraph

mod builder;
mod sort;
mod walk;

use serde::{Deserialize, Serialize};

pub use builder::TreeBuilder;
pub use sort::{compare_siblings, sort_siblings};
pub use walk::{TimelineRow, Walk};

use crate::graph::{Diagnostic, DiagnosticKind, GraphNode, NodeKey, NodeKind};
use crate::order::NodeOrder;

/// A node of the process tree.
///
/// A call activity node either holds the expanded target process as its
/// only child, or is a leaf carrying exactly one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTreeNode {
    /// Identity of the graph node this node was expanded from.
    pub key: NodeKey,
    /// Display label.
    pub label: String,
    /// Variant and variant-specific fields.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Ordering attributes within the owning process.
    #[serde(flatten)]
    pub order: NodeOrder,
    /// Why a call activity was not expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProcessTreeNode>,
}

impl ProcessTreeNode {
    /// Returns whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns whether expansion stopped here because of a cycle.
    pub fn is_truncated(&self) -> bool {
        self.diagnostic
            .as_ref()
            .is_some_and(|d| d.kind() == DiagnosticKind::CycleTruncated)
    }

    /// Sorts children at every level with [`compare_siblings`].
    pub fn sort_recursive(&mut self) {
        for child in &mut self.children {
            child.sort_recursive();
        }
        sort_siblings(&mut self.children);
    }

    /// Returns the first node with the given identity in pre-order.
    pub fn find(&self, key: &NodeKey) -> Option<&ProcessTreeNode> {
        self.walk().map(|(_, node)| node).find(|node| &node.key == key)
    }
}

impl From<&GraphNode> for ProcessTreeNode {
    fn from(node: &GraphNode) -> Self {
        Self {
            key: node.key.clone(),
            label: node.label.clone(),
            kind: node.kind.clone(),
            order: node.order.clone(),
            diagnostic: None,
            children: Vec::new(),
        }
    }
}

/// Output of one tree build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTree {
    /// The designated root process.
    pub root: ProcessTreeNode,
    /// Graph diagnostics followed by cycles found during expansion.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessTree {
    /// Returns the root node.
    pub fn root(&self) -> &ProcessTreeNode {
        &self.root
    }

    /// Returns all diagnostics of the build.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
