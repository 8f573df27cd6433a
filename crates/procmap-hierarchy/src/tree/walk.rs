//! Tree traversal for documentation and timeline views.

use serde::{Deserialize, Serialize};

use super::{ProcessTree, ProcessTreeNode};
use crate::graph::{Diagnostic, NodeKey};
use crate::order::BranchId;

/// Pre-order iterator over a tree, yielding `(depth, node)`.
///
/// The root has depth 0. Children are visited in their stored order.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a ProcessTreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a ProcessTreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// One row of the flattened timeline view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Nesting depth; the root process is 0.
    pub depth: usize,
    /// Identity of the node.
    pub key: NodeKey,
    /// Display label.
    pub label: String,
    /// Position along the sequence-flow traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
    /// Position derived from the diagram layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_order_index: Option<u32>,
    /// Concurrent path the node sits on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<BranchId>,
}

impl ProcessTreeNode {
    /// Walks this subtree in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    /// Returns the number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Returns the depth of the deepest node below this one.
    pub fn max_depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or_default()
    }

    /// Returns the diagnostics carried by leaves, in pre-order.
    pub fn leaf_diagnostics(&self) -> Vec<&Diagnostic> {
        self.walk()
            .filter_map(|(_, node)| node.diagnostic.as_ref())
            .collect()
    }
}

impl ProcessTree {
    /// Walks the tree in pre-order, which is documentation generation order.
    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    /// Returns the number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Returns the depth of the deepest node.
    pub fn max_depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Returns the diagnostics carried by leaves, in pre-order.
    pub fn leaf_diagnostics(&self) -> Vec<&Diagnostic> {
        self.root.leaf_diagnostics()
    }

    /// Renders an indented outline, two spaces per level.
    ///
    /// Leaves carrying a diagnostic are suffixed with its kind.
    pub fn outline(&self) -> String {
        let mut outline = String::new();
        for (depth, node) in self.walk() {
            outline.push_str(&" ".repeat(depth * 2));
            outline.push_str(&node.label);
            if let Some(diagnostic) = &node.diagnostic {
                outline.push_str(&format!(" [{}]", diagnostic.kind()));
            }
            outline.push('\n');
        }
        outline
    }

    /// Flattens the tree into timeline rows in pre-order.
    pub fn timeline(&self) -> Vec<TimelineRow> {
        self.walk()
            .map(|(depth, node)| TimelineRow {
                depth,
                key: node.key.clone(),
                label: node.label.clone(),
                order_index: node.order.order_index,
                visual_order_index: node.order.visual_order_index,
                branch_id: node.order.branch_id.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SourceId;
    use crate::graph::NodeKind;
    use crate::order::NodeOrder;

    fn node(id: &str, order: NodeOrder, children: Vec<ProcessTreeNode>) -> ProcessTreeNode {
        ProcessTreeNode {
            key: NodeKey::new("p.bpmn", id),
            label: id.to_owned(),
            kind: NodeKind::UserTask,
            order,
            diagnostic: None,
            children,
        }
    }

    fn tree() -> ProcessTree {
        let mut missing = node("call", NodeOrder::indexed(2), Vec::new());
        missing.kind = NodeKind::CallActivity {
            called_element: Some("ghost".to_owned()),
        };
        missing.diagnostic = Some(Diagnostic::MissingDependency {
            parent_file: SourceId::from("p.bpmn"),
            element_id: "call".to_owned(),
            attempted_target: Some("ghost".to_owned()),
        });

        let root = node(
            "p",
            NodeOrder::default(),
            vec![
                node(
                    "a",
                    NodeOrder::indexed(0),
                    vec![node("a1", NodeOrder::indexed(0).with_branch_id("g#0"), Vec::new())],
                ),
                node("b", NodeOrder::indexed(1).with_visual_order_index(3), Vec::new()),
                missing,
            ],
        );

        ProcessTree {
            root,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_walk_pre_order_with_depth() {
        let tree = tree();
        let visited: Vec<_> = tree
            .walk()
            .map(|(depth, node)| (depth, node.key.element_id.as_str()))
            .collect();
        assert_eq!(
            visited,
            [(0, "p"), (1, "a"), (2, "a1"), (1, "b"), (1, "call")]
        );
    }

    #[test]
    fn test_counts() {
        let tree = tree();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.leaf_diagnostics().len(), 1);
    }

    #[test]
    fn test_outline() {
        let tree = tree();
        assert_eq!(
            tree.outline(),
            "p\n  a\n    a1\n  b\n  call [missing_dependency]\n"
        );
    }

    #[test]
    fn test_timeline_rows() {
        let rows = tree().timeline();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].depth, 2);
        assert_eq!(rows[2].branch_id, Some(BranchId::from("g#0")));
        assert_eq!(rows[3].order_index, Some(1));
        assert_eq!(rows[3].visual_order_index, Some(3));
        assert_eq!(rows[0].order_index, None);
    }
}
