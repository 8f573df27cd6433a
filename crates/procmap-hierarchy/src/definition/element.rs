//! Process element types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::position::Position;

/// A single element declared inside a process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element identifier, unique within its source.
    pub id: String,
    /// Display name of the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position on the process diagram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// The element kind.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Creates a new element with the given id and kind.
    pub fn new(id: impl Into<String>, kind: impl Into<ElementKind>) -> Self {
        Self {
            id: id.into(),
            name: None,
            position: None,
            kind: kind.into(),
        }
    }

    /// Creates a call activity invoking the referenced process.
    pub fn call_activity(id: impl Into<String>, called_element: Option<&str>) -> Self {
        Self::new(
            id,
            ElementKind::CallActivity {
                called_element: called_element.map(str::to_owned),
            },
        )
    }

    /// Creates a user task.
    pub fn user_task(id: impl Into<String>) -> Self {
        Self::new(id, ElementKind::UserTask)
    }

    /// Creates a service task.
    pub fn service_task(id: impl Into<String>) -> Self {
        Self::new(id, ElementKind::ServiceTask)
    }

    /// Creates a business rule task.
    pub fn business_rule_task(id: impl Into<String>) -> Self {
        Self::new(id, ElementKind::BusinessRuleTask)
    }

    /// Creates an event of the given kind.
    pub fn event(id: impl Into<String>, event: EventKind) -> Self {
        Self::new(id, ElementKind::Event { event })
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the diagram position.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Returns the display label: the trimmed name, or the id when unnamed.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }

    /// Returns the called element reference if this is a call activity.
    pub fn called_element(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::CallActivity { called_element } => called_element.as_deref(),
            _ => None,
        }
    }

    /// Returns whether this is a call activity.
    pub const fn is_call_activity(&self) -> bool {
        matches!(self.kind, ElementKind::CallActivity { .. })
    }

    /// Returns whether this is an explicitly tagged start event.
    pub const fn is_start_event(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Event {
                event: EventKind::Start
            }
        )
    }

    /// Returns whether this event only relays control flow.
    pub fn is_pass_through(&self) -> bool {
        match self.kind {
            ElementKind::Event { event } => event.is_pass_through(),
            _ => false,
        }
    }
}

/// Element kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Invokes another process definition as a subprocess.
    CallActivity {
        /// Reference to the invoked process (`calledElement`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        called_element: Option<String>,
    },
    /// Work performed by a person.
    UserTask,
    /// Work performed by an automated service.
    ServiceTask,
    /// Evaluation of a business rule or decision table.
    BusinessRuleTask,
    /// A start, intermediate, boundary or end event.
    Event {
        /// The event position in the flow.
        event: EventKind,
    },
}

impl From<EventKind> for ElementKind {
    fn from(event: EventKind) -> Self {
        Self::Event { event }
    }
}

/// Kind of an event element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Starts the process.
    Start,
    /// Waits for a trigger, then continues.
    IntermediateCatch,
    /// Emits a signal or message, then continues.
    IntermediateThrow,
    /// Attached to an activity boundary.
    Boundary,
    /// Ends the process or path.
    End,
}

impl EventKind {
    /// Intermediate catch and throw events relay control flow without doing work.
    pub const fn is_pass_through(self) -> bool {
        matches!(self, Self::IntermediateCatch | Self::IntermediateThrow)
    }
}
