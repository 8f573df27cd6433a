//! Process graph structures and construction.
//!
//! This module provides the graph representation of a definition set:
//! - [`ProcessGraph`]: Processes, elements and the edges between them
//! - [`GraphBuilder`]: Assembles a [`ProcessGraph`] from loaded definitions
//! - [`GraphNode`]: Data associated with each node
//! - [`NodeKey`]: Stable node identity, `source#element_id`
//! - [`GraphEdge`]: Sequence flows and subprocess calls
//! - [`Diagnostic`]: Data-quality issues found while building

mod builder;
mod diagnostic;
mod edge;
mod node;
mod process_graph;

pub use builder::GraphBuilder;
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSummary};
pub use edge::{EdgeRecord, GraphEdge};
pub use node::{GraphNode, NodeKey, NodeKind};
pub use process_graph::{GraphSnapshot, ProcessGraph};
