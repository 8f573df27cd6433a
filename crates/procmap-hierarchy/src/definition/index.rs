//! Read-only lookup over a loaded set of process definitions.

use std::collections::HashMap;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};

use super::{ProcessDefinition, SourceId};

/// Position of a definition in load order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct DefinitionId(usize);

impl DefinitionId {
    /// Returns the load-order position.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Owns the loaded definitions and indexes them by source and process id.
///
/// Lookups return ids in load order, so the first entry of every slice is
/// the first-loaded match.
#[derive(Debug, Clone, Default)]
pub struct ProcessDefinitionIndex {
    definitions: Vec<ProcessDefinition>,
    by_source: HashMap<SourceId, Vec<DefinitionId>>,
    by_process_id: HashMap<String, Vec<DefinitionId>>,
}

impl ProcessDefinitionIndex {
    /// Indexes the given definitions, keeping their order.
    pub fn new(definitions: Vec<ProcessDefinition>) -> Self {
        let mut by_source: HashMap<SourceId, Vec<DefinitionId>> = HashMap::new();
        let mut by_process_id: HashMap<String, Vec<DefinitionId>> = HashMap::new();

        for (position, definition) in definitions.iter().enumerate() {
            let id = DefinitionId(position);
            by_source
                .entry(definition.source.clone())
                .or_default()
                .push(id);
            by_process_id
                .entry(definition.process_id.clone())
                .or_default()
                .push(id);
        }

        Self {
            definitions,
            by_source,
            by_process_id,
        }
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns whether no definitions are loaded.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns a definition by id.
    pub fn get(&self, id: DefinitionId) -> Option<&ProcessDefinition> {
        self.definitions.get(id.0)
    }

    /// Returns the first-loaded definition id.
    pub fn first(&self) -> Option<DefinitionId> {
        (!self.definitions.is_empty()).then_some(DefinitionId(0))
    }

    /// Iterates over definitions in load order.
    pub fn iter(&self) -> impl Iterator<Item = (DefinitionId, &ProcessDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| (DefinitionId(position), definition))
    }

    /// Returns every definition parsed from the given source.
    pub fn by_source(&self, source: &SourceId) -> &[DefinitionId] {
        self.by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns every definition declaring the given process id.
    pub fn by_process_id(&self, process_id: &str) -> &[DefinitionId] {
        self.by_process_id
            .get(process_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds a definition by source identifier, then by declared process id.
    pub fn find(&self, identity: &str) -> Option<DefinitionId> {
        self.by_source(&SourceId::from(identity))
            .first()
            .or_else(|| self.by_process_id(identity).first())
            .copied()
    }

    /// Consumes the index, returning the definitions in load order.
    pub fn into_definitions(self) -> Vec<ProcessDefinition> {
        self.definitions
    }
}
