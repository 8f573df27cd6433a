//! Structured diagnostics for graph and tree construction.
//!
//! Diagnostics describe data-quality problems found in the input. They are
//! expected and frequent, so they are returned alongside the build output
//! instead of failing it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::definition::{ProcessRef, SourceId};

/// A resolution or structural issue found while building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A call activity whose target could not be resolved.
    MissingDependency {
        /// Source declaring the call activity.
        parent_file: SourceId,
        /// Id of the call activity.
        element_id: String,
        /// The reference or override target that failed to resolve.
        attempted_target: Option<String>,
    },
    /// A call activity reference matching more than one definition.
    AmbiguousReference {
        /// Source declaring the call activity.
        parent_file: SourceId,
        /// Id of the call activity.
        element_id: String,
        /// The reference as declared.
        reference: String,
        /// Every matching definition, in load order.
        candidates: Vec<ProcessRef>,
    },
    /// A call activity whose expansion would re-enter a process already on
    /// the expansion path.
    CycleTruncated {
        /// Source declaring the call activity.
        parent_file: SourceId,
        /// Id of the call activity.
        element_id: String,
        /// Processes from the first occurrence of the re-entered process to
        /// the re-entry, both ends included.
        cycle_path: Vec<ProcessRef>,
    },
    /// A sequence flow endpoint that names no element of its definition.
    DanglingSequenceFlow {
        /// Source declaring the flow.
        parent_file: SourceId,
        /// Id of the flow.
        flow_id: String,
        /// The unresolved endpoint reference.
        missing_ref: String,
    },
    /// An element id declared more than once in the same source.
    DuplicateElement {
        /// Source declaring the element.
        parent_file: SourceId,
        /// The repeated id.
        element_id: String,
    },
}

impl Diagnostic {
    /// Returns the diagnostic kind.
    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::MissingDependency { .. } => DiagnosticKind::MissingDependency,
            Self::AmbiguousReference { .. } => DiagnosticKind::AmbiguousReference,
            Self::CycleTruncated { .. } => DiagnosticKind::CycleTruncated,
            Self::DanglingSequenceFlow { .. } => DiagnosticKind::DanglingSequenceFlow,
            Self::DuplicateElement { .. } => DiagnosticKind::DuplicateElement,
        }
    }

    /// Returns the source the diagnostic was found in.
    pub fn parent_file(&self) -> &SourceId {
        match self {
            Self::MissingDependency { parent_file, .. }
            | Self::AmbiguousReference { parent_file, .. }
            | Self::CycleTruncated { parent_file, .. }
            | Self::DanglingSequenceFlow { parent_file, .. }
            | Self::DuplicateElement { parent_file, .. } => parent_file,
        }
    }

    /// Returns the element the diagnostic is attached to, if any.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { element_id, .. }
            | Self::AmbiguousReference { element_id, .. }
            | Self::CycleTruncated { element_id, .. }
            | Self::DuplicateElement { element_id, .. } => Some(element_id),
            Self::DanglingSequenceFlow { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDependency {
                parent_file,
                element_id,
                attempted_target: Some(target),
            } => write!(
                f,
                "{parent_file}#{element_id}: subprocess '{target}' could not be resolved"
            ),
            Self::MissingDependency {
                parent_file,
                element_id,
                attempted_target: None,
            } => write!(
                f,
                "{parent_file}#{element_id}: call activity declares no subprocess reference"
            ),
            Self::AmbiguousReference {
                parent_file,
                element_id,
                reference,
                candidates,
            } => {
                write!(
                    f,
                    "{parent_file}#{element_id}: reference '{reference}' matches {} processes:",
                    candidates.len()
                )?;
                for candidate in candidates {
                    write!(f, " {candidate}")?;
                }
                Ok(())
            }
            Self::CycleTruncated {
                parent_file,
                element_id,
                cycle_path,
            } => {
                write!(f, "{parent_file}#{element_id}: cyclic subprocess call truncated (")?;
                for (position, process) in cycle_path.iter().enumerate() {
                    if position > 0 {
                        f.write_str(" -> ")?;
                    }
                    write!(f, "{process}")?;
                }
                f.write_str(")")
            }
            Self::DanglingSequenceFlow {
                parent_file,
                flow_id,
                missing_ref,
            } => write!(
                f,
                "{parent_file}: sequence flow '{flow_id}' references unknown element '{missing_ref}'"
            ),
            Self::DuplicateElement {
                parent_file,
                element_id,
            } => write!(f, "{parent_file}: element id '{element_id}' declared more than once"),
        }
    }
}

/// Discriminant of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, IntoStaticStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticKind {
    /// See [`Diagnostic::MissingDependency`].
    MissingDependency,
    /// See [`Diagnostic::AmbiguousReference`].
    AmbiguousReference,
    /// See [`Diagnostic::CycleTruncated`].
    CycleTruncated,
    /// See [`Diagnostic::DanglingSequenceFlow`].
    DanglingSequenceFlow,
    /// See [`Diagnostic::DuplicateElement`].
    DuplicateElement,
}

/// Diagnostic counts grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    /// Total number of diagnostics.
    pub total: usize,
    /// Count per kind; kinds with no diagnostics are omitted.
    pub by_kind: BTreeMap<DiagnosticKind, usize>,
}

impl DiagnosticSummary {
    /// Counts the given diagnostics.
    pub fn from_diagnostics<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        let mut summary = Self::default();
        for diagnostic in diagnostics {
            summary.total += 1;
            *summary.by_kind.entry(diagnostic.kind()).or_default() += 1;
        }
        summary
    }

    /// Returns the count for one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or_default()
    }

    /// Returns whether no diagnostics were counted.
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(element_id: &str) -> Diagnostic {
        Diagnostic::MissingDependency {
            parent_file: SourceId::from("onboarding.bpmn"),
            element_id: element_id.to_owned(),
            attempted_target: Some("offer".to_owned()),
        }
    }

    #[test]
    fn test_diagnostic_accessors() {
        let diagnostic = missing("call_offer");
        assert_eq!(diagnostic.kind(), DiagnosticKind::MissingDependency);
        assert_eq!(diagnostic.element_id(), Some("call_offer"));
        assert_eq!(diagnostic.parent_file().as_str(), "onboarding.bpmn");
        assert_eq!(
            diagnostic.to_string(),
            "onboarding.bpmn#call_offer: subprocess 'offer' could not be resolved"
        );
    }

    #[test]
    fn test_cycle_display() {
        let diagnostic = Diagnostic::CycleTruncated {
            parent_file: SourceId::from("b.bpmn"),
            element_id: "call_a".to_owned(),
            cycle_path: vec![ProcessRef::new("a.bpmn", "a"), ProcessRef::new("b.bpmn", "b"), ProcessRef::new("a.bpmn", "a")],
        };
        assert_eq!(
            diagnostic.to_string(),
            "b.bpmn#call_a: cyclic subprocess call truncated (a.bpmn#a -> b.bpmn#b -> a.bpmn#a)"
        );
    }

    #[test]
    fn test_diagnostic_serialization_tag() {
        let json = serde_json::to_value(missing("call_offer")).expect("serialization failed");
        assert_eq!(json["kind"], "missing_dependency");
        assert_eq!(json["attempted_target"], "offer");
    }

    #[test]
    fn test_summary_counts() {
        let diagnostics = vec![
            missing("a"),
            missing("b"),
            Diagnostic::DuplicateElement {
                parent_file: SourceId::from("x.bpmn"),
                element_id: "t".to_owned(),
            },
        ];
        let summary = DiagnosticSummary::from_diagnostics(&diagnostics);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(DiagnosticKind::MissingDependency), 2);
        assert_eq!(summary.count(DiagnosticKind::DuplicateElement), 1);
        assert_eq!(summary.count(DiagnosticKind::CycleTruncated), 0);
        assert!(!summary.is_clean());
        assert_eq!(DiagnosticKind::CycleTruncated.as_ref(), "cycle_truncated");
    }
}
