//! Graph edge types.

use serde::{Deserialize, Serialize};

use super::NodeKey;
use crate::resolve::ResolutionStrategy;

/// Data stored on an edge of the process graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEdge {
    /// Control flow between two elements of the same process.
    SequenceFlow {
        /// Id of the declared flow.
        flow_id: String,
    },
    /// A call activity invoking a process node.
    SubprocessCall {
        /// How the target was resolved.
        strategy: ResolutionStrategy,
    },
}

impl GraphEdge {
    /// Returns whether this is a sequence flow.
    pub const fn is_sequence_flow(&self) -> bool {
        matches!(self, Self::SequenceFlow { .. })
    }

    /// Returns whether this is a subprocess call.
    pub const fn is_subprocess_call(&self) -> bool {
        matches!(self, Self::SubprocessCall { .. })
    }
}

/// An edge with its endpoint identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node.
    pub from: NodeKey,
    /// Target node.
    pub to: NodeKey,
    /// Edge data.
    #[serde(flatten)]
    pub edge: GraphEdge,
}
