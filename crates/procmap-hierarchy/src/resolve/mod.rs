//! Call activity reference resolution.
//!
//! [`ReferenceResolver`] decides which loaded definition a call activity
//! invokes. Resolution order, first match wins:
//!
//! 1. Exact lookup in the [`OverrideTable`] by `(source, element_id)`.
//! 2. Exact match of the reference against a declared process id.
//! 3. Normalized-name match against process ids, process names and source
//!    stems, accepted only when exactly one definition matches.
//!
//! An unresolved call is a normal outcome reported as a [`Diagnostic`].

mod normalize;
mod overrides;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

pub use normalize::normalize_name;
pub use overrides::{OverrideEntry, OverrideTable};

use crate::TRACING_TARGET_RESOLVE;
use crate::definition::{DefinitionId, ProcessDefinitionIndex, SourceId};
use crate::graph::Diagnostic;

/// How a call activity target was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Listed in the override table.
    Override,
    /// Reference equals a declared process id.
    Exact,
    /// Unique normalized-name match.
    Heuristic,
}

/// A successfully resolved call activity target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// The invoked definition.
    pub definition: DefinitionId,
    /// The strategy that produced the match.
    pub strategy: ResolutionStrategy,
}

/// Outcome of resolving one call activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The target definition was found.
    Resolved(ResolvedTarget),
    /// No single target could be chosen.
    Unresolved(Diagnostic),
}

impl Resolution {
    /// Returns the resolved target, if any.
    pub fn target(&self) -> Option<ResolvedTarget> {
        match self {
            Self::Resolved(target) => Some(*target),
            Self::Unresolved(_) => None,
        }
    }
}

/// Resolves call activity references against a loaded definition set.
pub struct ReferenceResolver<'a> {
    index: &'a ProcessDefinitionIndex,
    overrides: &'a OverrideTable,
    /// Normalized names mapped to the definitions carrying them.
    names: Option<HashMap<String, Vec<DefinitionId>>>,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver with the name heuristic enabled.
    pub fn new(index: &'a ProcessDefinitionIndex, overrides: &'a OverrideTable) -> Self {
        Self {
            index,
            overrides,
            names: Some(Self::index_names(index)),
        }
    }

    /// Enables or disables the normalized-name heuristic.
    pub fn with_name_heuristic(mut self, enabled: bool) -> Self {
        self.names = match (enabled, self.names.take()) {
            (false, _) => None,
            (true, Some(names)) => Some(names),
            (true, None) => Some(Self::index_names(self.index)),
        };
        self
    }

    /// Resolves the call activity `element_id` declared in `source`.
    pub fn resolve(
        &self,
        source: &SourceId,
        element_id: &str,
        reference: Option<&str>,
    ) -> Resolution {
        if let Some(target) = self.overrides.get(source, element_id) {
            return self.resolve_override(source, element_id, target);
        }

        let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
            return Resolution::Unresolved(Diagnostic::MissingDependency {
                parent_file: source.clone(),
                element_id: element_id.to_owned(),
                attempted_target: None,
            });
        };

        match self.index.by_process_id(reference) {
            [definition] => {
                return Resolution::Resolved(ResolvedTarget {
                    definition: *definition,
                    strategy: ResolutionStrategy::Exact,
                });
            }
            [] => {}
            candidates => return self.ambiguous(source, element_id, reference, candidates),
        }

        if let Some(names) = &self.names {
            let key = normalize_name(reference);
            match names.get(&key).map(Vec::as_slice).unwrap_or_default() {
                [definition] => {
                    tracing::debug!(
                        target: TRACING_TARGET_RESOLVE,
                        source = %source,
                        element_id,
                        reference,
                        definition = %definition,
                        "resolved call activity by normalized name"
                    );
                    return Resolution::Resolved(ResolvedTarget {
                        definition: *definition,
                        strategy: ResolutionStrategy::Heuristic,
                    });
                }
                [] => {}
                candidates => return self.ambiguous(source, element_id, reference, candidates),
            }
        }

        Resolution::Unresolved(Diagnostic::MissingDependency {
            parent_file: source.clone(),
            element_id: element_id.to_owned(),
            attempted_target: Some(reference.to_owned()),
        })
    }

    /// Overrides win unconditionally; an override naming an unloaded source
    /// does not fall back to reference matching.
    fn resolve_override(&self, source: &SourceId, element_id: &str, target: &SourceId) -> Resolution {
        match self.index.by_source(target).first() {
            Some(definition) => Resolution::Resolved(ResolvedTarget {
                definition: *definition,
                strategy: ResolutionStrategy::Override,
            }),
            None => {
                tracing::warn!(
                    target: TRACING_TARGET_RESOLVE,
                    source = %source,
                    element_id,
                    override_target = %target,
                    "override names a source that is not loaded"
                );
                Resolution::Unresolved(Diagnostic::MissingDependency {
                    parent_file: source.clone(),
                    element_id: element_id.to_owned(),
                    attempted_target: Some(target.to_string()),
                })
            }
        }
    }

    fn ambiguous(
        &self,
        source: &SourceId,
        element_id: &str,
        reference: &str,
        candidates: &[DefinitionId],
    ) -> Resolution {
        let candidates = candidates
            .iter()
            .filter_map(|id| self.index.get(*id))
            .map(|definition| definition.process_ref())
            .collect();

        Resolution::Unresolved(Diagnostic::AmbiguousReference {
            parent_file: source.clone(),
            element_id: element_id.to_owned(),
            reference: reference.to_owned(),
            candidates,
        })
    }

    fn index_names(index: &ProcessDefinitionIndex) -> HashMap<String, Vec<DefinitionId>> {
        let mut names: HashMap<String, Vec<DefinitionId>> = HashMap::new();

        for (id, definition) in index.iter() {
            let mut keys = vec![
                normalize_name(&definition.process_id),
                normalize_name(definition.source.stem()),
            ];
            if let Some(name) = &definition.name {
                keys.push(normalize_name(name));
            }
            keys.sort_unstable();
            keys.dedup();

            for key in keys.into_iter().filter(|key| !key.is_empty()) {
                names.entry(key).or_default().push(id);
            }
        }

        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ProcessDefinition, ProcessRef};

    fn index() -> ProcessDefinitionIndex {
        ProcessDefinitionIndex::new(vec![
            ProcessDefinition::new("onboarding.bpmn", "onboarding"),
            ProcessDefinition::new("kyc.bpmn", "kyc_process").with_name("KYC Check"),
            ProcessDefinition::new("credit/Credit-Decision.bpmn", "proc_credit"),
            ProcessDefinition::new("offer_a.bpmn", "offer_a").with_name("Offer"),
            ProcessDefinition::new("offer_b.bpmn", "offer_b").with_name("offer"),
        ])
    }

    fn source() -> SourceId {
        SourceId::from("onboarding.bpmn")
    }

    #[test]
    fn test_resolve_exact_process_id() {
        let index = index();
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides);

        let target = resolver
            .resolve(&source(), "call_kyc", Some("kyc_process"))
            .target()
            .expect("should resolve");
        assert_eq!(target.definition, DefinitionId::from(1));
        assert_eq!(target.strategy, ResolutionStrategy::Exact);
    }

    #[test]
    fn test_resolve_heuristic_on_name_and_stem() {
        let index = index();
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides);

        let by_name = resolver
            .resolve(&source(), "call_kyc", Some("kyc-check"))
            .target()
            .expect("should resolve by name");
        assert_eq!(by_name.definition, DefinitionId::from(1));
        assert_eq!(by_name.strategy, ResolutionStrategy::Heuristic);

        let by_stem = resolver
            .resolve(&source(), "call_credit", Some("credit_decision"))
            .target()
            .expect("should resolve by source stem");
        assert_eq!(by_stem.definition, DefinitionId::from(2));
    }

    #[test]
    fn test_resolve_ambiguous_heuristic() {
        let index = index();
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides);

        let resolution = resolver.resolve(&source(), "call_offer", Some("OFFER"));
        assert_eq!(
            resolution,
            Resolution::Unresolved(Diagnostic::AmbiguousReference {
                parent_file: source(),
                element_id: "call_offer".to_owned(),
                reference: "OFFER".to_owned(),
                candidates: vec![
                    ProcessRef::new("offer_a.bpmn", "offer_a"),
                    ProcessRef::new("offer_b.bpmn", "offer_b"),
                ],
            })
        );
    }

    #[test]
    fn test_resolve_duplicate_exact_process_id_is_ambiguous() {
        let index = ProcessDefinitionIndex::new(vec![
            ProcessDefinition::new("kyc.bpmn", "kyc"),
            ProcessDefinition::new("kyc-copy.bpmn", "kyc"),
        ]);
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides);

        let resolution = resolver.resolve(&source(), "call_kyc", Some("kyc"));
        assert!(matches!(
            resolution,
            Resolution::Unresolved(Diagnostic::AmbiguousReference { ref candidates, .. })
                if candidates.len() == 2
        ));
    }

    #[test]
    fn test_resolve_missing_and_absent_reference() {
        let index = index();
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides);

        assert_eq!(
            resolver.resolve(&source(), "call_x", Some("does-not-exist")),
            Resolution::Unresolved(Diagnostic::MissingDependency {
                parent_file: source(),
                element_id: "call_x".to_owned(),
                attempted_target: Some("does-not-exist".to_owned()),
            })
        );
        assert_eq!(
            resolver.resolve(&source(), "call_y", Some("  ")),
            Resolution::Unresolved(Diagnostic::MissingDependency {
                parent_file: source(),
                element_id: "call_y".to_owned(),
                attempted_target: None,
            })
        );
    }

    #[test]
    fn test_override_takes_precedence() {
        let index = index();
        let overrides = OverrideTable::new().with_entry("onboarding.bpmn", "call_kyc", "offer_b.bpmn");
        let resolver = ReferenceResolver::new(&index, &overrides);

        let target = resolver
            .resolve(&source(), "call_kyc", Some("kyc_process"))
            .target()
            .expect("should resolve through override");
        assert_eq!(target.definition, DefinitionId::from(4));
        assert_eq!(target.strategy, ResolutionStrategy::Override);
    }

    #[test]
    fn test_override_to_unloaded_source_does_not_fall_back() {
        let index = index();
        let overrides = OverrideTable::new().with_entry("onboarding.bpmn", "call_kyc", "gone.bpmn");
        let resolver = ReferenceResolver::new(&index, &overrides);

        assert_eq!(
            resolver.resolve(&source(), "call_kyc", Some("kyc_process")),
            Resolution::Unresolved(Diagnostic::MissingDependency {
                parent_file: source(),
                element_id: "call_kyc".to_owned(),
                attempted_target: Some("gone.bpmn".to_owned()),
            })
        );
    }

    #[test]
    fn test_heuristic_can_be_disabled() {
        let index = index();
        let overrides = OverrideTable::new();
        let resolver = ReferenceResolver::new(&index, &overrides).with_name_heuristic(false);

        assert!(resolver.resolve(&source(), "call_kyc", Some("kyc-check")).target().is_none());
        assert!(resolver.resolve(&source(), "call_kyc", Some("kyc_process")).target().is_some());
    }
}
