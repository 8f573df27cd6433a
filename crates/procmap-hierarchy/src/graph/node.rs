//! Graph node types.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::definition::{DefinitionId, Element, ElementKind, EventKind, ProcessRef, SourceId};
use crate::order::NodeOrder;

/// Stable identity of a node: its source and element id.
///
/// Process nodes use the declared process id as element id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display)]
#[display("{source}#{element_id}")]
pub struct NodeKey {
    /// Source the node was declared in.
    pub source: SourceId,
    /// Element id, or process id for process nodes.
    pub element_id: String,
}

impl NodeKey {
    /// Creates a new node key.
    pub fn new(source: impl Into<SourceId>, element_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            element_id: element_id.into(),
        }
    }
}

impl From<ProcessRef> for NodeKey {
    fn from(process: ProcessRef) -> Self {
        Self {
            source: process.source,
            element_id: process.process_id,
        }
    }
}

/// Node variant with its variant-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A whole process definition.
    Process {
        /// The definition this node stands for.
        definition: DefinitionId,
    },
    /// Invokes another process definition.
    CallActivity {
        /// The declared `calledElement` reference.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        called_element: Option<String>,
    },
    /// Work performed by a person.
    UserTask,
    /// Work performed by an automated service.
    ServiceTask,
    /// Evaluation of a business rule.
    BusinessRuleTask,
    /// A start, intermediate, boundary or end event.
    Event {
        /// The event position in the flow.
        event: EventKind,
    },
}

impl NodeKind {
    /// Returns whether this is a process node.
    pub const fn is_process(&self) -> bool {
        matches!(self, Self::Process { .. })
    }

    /// Returns whether this is a call activity node.
    pub const fn is_call_activity(&self) -> bool {
        matches!(self, Self::CallActivity { .. })
    }

    /// Returns whether this is an event node.
    pub const fn is_event(&self) -> bool {
        matches!(self, Self::Event { .. })
    }
}

impl From<&ElementKind> for NodeKind {
    fn from(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::CallActivity { called_element } => Self::CallActivity {
                called_element: called_element.clone(),
            },
            ElementKind::UserTask => Self::UserTask,
            ElementKind::ServiceTask => Self::ServiceTask,
            ElementKind::BusinessRuleTask => Self::BusinessRuleTask,
            ElementKind::Event { event } => Self::Event { event: *event },
        }
    }
}

/// A node of the process graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Stable identity.
    pub key: NodeKey,
    /// Display label.
    pub label: String,
    /// Variant and variant-specific fields.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Ordering attributes within the owning process.
    #[serde(flatten)]
    pub order: NodeOrder,
}

impl GraphNode {
    /// Creates the node standing for a whole process definition.
    pub fn process(process: ProcessRef, label: impl Into<String>, definition: DefinitionId) -> Self {
        Self {
            key: process.into(),
            label: label.into(),
            kind: NodeKind::Process { definition },
            order: NodeOrder::default(),
        }
    }

    /// Creates the node for an element declared in `source`.
    pub fn element(source: &SourceId, element: &Element) -> Self {
        Self {
            key: NodeKey::new(source.clone(), element.id.clone()),
            label: element.label().to_owned(),
            kind: NodeKind::from(&element.kind),
            order: NodeOrder::default(),
        }
    }

    /// Returns the process identity if this is a process node.
    pub fn process_ref(&self) -> Option<ProcessRef> {
        self.kind.is_process().then(|| {
            ProcessRef::new(self.key.source.clone(), self.key.element_id.clone())
        })
    }
}
