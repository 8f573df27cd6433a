//! Parsed process definitions.
//!
//! This module contains the input model handed over by the parsing stage:
//! - [`ProcessDefinition`]: one parsed process with its elements and flows
//! - [`Element`]: a task, event or call activity inside a process
//! - [`SequenceFlow`]: a control-flow edge local to one definition
//! - [`ProcessDefinitionIndex`]: read-only lookup over a loaded set
//!
//! Definitions are plain serializable values; they are never mutated once
//! a build starts.

mod element;
mod flow;
mod index;
mod position;
mod source;

use derive_more::Display;
use serde::{Deserialize, Serialize};

pub use element::{Element, ElementKind, EventKind};
pub use flow::SequenceFlow;
pub use index::{DefinitionId, ProcessDefinitionIndex};
pub use position::Position;
pub use source::SourceId;

/// A single parsed process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Source the definition was parsed from.
    pub source: SourceId,
    /// Declared process id.
    pub process_id: String,
    /// Declared process name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Elements in declaration order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Sequence flows in declaration order.
    #[serde(default)]
    pub flows: Vec<SequenceFlow>,
}

impl ProcessDefinition {
    /// Creates an empty definition.
    pub fn new(source: impl Into<SourceId>, process_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            process_id: process_id.into(),
            name: None,
            elements: Vec::new(),
            flows: Vec::new(),
        }
    }

    /// Sets the process name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends an element.
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Appends a sequence flow.
    pub fn with_flow(
        mut self,
        id: impl Into<String>,
        source_ref: impl Into<String>,
        target_ref: impl Into<String>,
    ) -> Self {
        self.flows
            .push(SequenceFlow::new(id, source_ref, target_ref));
        self
    }

    /// Returns the identity of this process.
    pub fn process_ref(&self) -> ProcessRef {
        ProcessRef::new(self.source.clone(), self.process_id.clone())
    }

    /// Returns the display label: the trimmed name, or the process id.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.process_id)
    }

    /// Returns the first element declared with the given id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Returns the call activity declarations in declaration order.
    pub fn call_activities(&self) -> impl Iterator<Item = CallActivityDecl<'_>> {
        self.elements.iter().filter_map(|element| match &element.kind {
            ElementKind::CallActivity { called_element } => Some(CallActivityDecl {
                element_id: &element.id,
                called_element: called_element.as_deref(),
            }),
            _ => None,
        })
    }
}

/// A call activity declaration borrowed from its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallActivityDecl<'a> {
    /// Id of the call activity element.
    pub element_id: &'a str,
    /// The `calledElement` reference, if declared.
    pub called_element: Option<&'a str>,
}

/// Identity of a process definition: its source and declared process id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display)]
#[display("{source}#{process_id}")]
pub struct ProcessRef {
    /// Source the process was parsed from.
    pub source: SourceId,
    /// Declared process id.
    pub process_id: String,
}

impl ProcessRef {
    /// Creates a new process reference.
    pub fn new(source: impl Into<SourceId>, process_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            process_id: process_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onboarding() -> ProcessDefinition {
        ProcessDefinition::new("loans/onboarding.bpmn", "onboarding")
            .with_name("Customer onboarding")
            .with_element(Element::event("start", EventKind::Start))
            .with_element(Element::call_activity("call_kyc", Some("kyc")))
            .with_element(Element::call_activity("call_unknown", None))
            .with_element(Element::user_task("review"))
            .with_flow("f1", "start", "call_kyc")
            .with_flow("f2", "call_kyc", "review")
    }

    #[test]
    fn test_definition_call_activities() {
        let def = onboarding();
        let calls: Vec<_> = def.call_activities().collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].element_id, "call_kyc");
        assert_eq!(calls[0].called_element, Some("kyc"));
        assert_eq!(calls[1].called_element, None);
    }

    #[test]
    fn test_definition_lookup_and_label() {
        let def = onboarding();
        assert_eq!(def.label(), "Customer onboarding");
        assert!(def.element("review").is_some());
        assert!(def.element("missing").is_none());
        assert_eq!(
            def.process_ref().to_string(),
            "loans/onboarding.bpmn#onboarding"
        );
    }

    #[test]
    fn test_definition_serialization() {
        let def = onboarding();
        let json = serde_json::to_string(&def).expect("serialization failed");
        let deserialized: ProcessDefinition =
            serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(def, deserialized);
    }

    #[test]
    fn test_definition_defaults_when_lists_absent() {
        let def: ProcessDefinition =
            serde_json::from_str(r#"{"source":"a.bpmn","process_id":"a"}"#)
                .expect("deserialization failed");
        assert!(def.elements.is_empty());
        assert!(def.flows.is_empty());
        assert_eq!(def.label(), "a");
    }
}
