//! Sequence flow declarations.

use serde::{Deserialize, Serialize};

/// A directed control-flow edge between two elements of the same definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceFlow {
    /// Flow identifier.
    pub id: String,
    /// Id of the element the flow leaves.
    pub source_ref: String,
    /// Id of the element the flow enters.
    pub target_ref: String,
}

impl SequenceFlow {
    /// Creates a new sequence flow.
    pub fn new(
        id: impl Into<String>,
        source_ref: impl Into<String>,
        target_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_ref: source_ref.into(),
            target_ref: target_ref.into(),
        }
    }

    /// Returns whether the flow loops back onto its own source.
    pub fn is_self_loop(&self) -> bool {
        self.source_ref == self.target_ref
    }
}
