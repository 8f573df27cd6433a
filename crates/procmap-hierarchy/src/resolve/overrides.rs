//! Externally maintained call activity overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::definition::SourceId;

/// A single override: the call activity `element_id` in `source` invokes
/// the definition loaded from `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Source of the definition declaring the call activity.
    pub source: SourceId,
    /// Id of the call activity element.
    pub element_id: String,
    /// Source identifier of the invoked definition.
    pub target: SourceId,
}

impl OverrideEntry {
    /// Creates a new override entry.
    pub fn new(
        source: impl Into<SourceId>,
        element_id: impl Into<String>,
        target: impl Into<SourceId>,
    ) -> Self {
        Self {
            source: source.into(),
            element_id: element_id.into(),
            target: target.into(),
        }
    }
}

/// Read-only snapshot of the override mapping
/// `(source, element_id) -> target source`.
///
/// Serializes as a list of [`OverrideEntry`] values sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<OverrideEntry>", into = "Vec<OverrideEntry>")]
pub struct OverrideTable {
    entries: HashMap<SourceId, HashMap<String, SourceId>>,
}

impl OverrideTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override, replacing any previous entry for the same call activity.
    pub fn insert(
        &mut self,
        source: impl Into<SourceId>,
        element_id: impl Into<String>,
        target: impl Into<SourceId>,
    ) {
        self.entries
            .entry(source.into())
            .or_default()
            .insert(element_id.into(), target.into());
    }

    /// Adds an override and returns the table.
    pub fn with_entry(
        mut self,
        source: impl Into<SourceId>,
        element_id: impl Into<String>,
        target: impl Into<SourceId>,
    ) -> Self {
        self.insert(source, element_id, target);
        self
    }

    /// Returns the target source for a call activity, if overridden.
    pub fn get(&self, source: &SourceId, element_id: &str) -> Option<&SourceId> {
        self.entries.get(source)?.get(element_id)
    }

    /// Returns the number of overrides.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns whether the table holds no overrides.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all entries sorted by source, then element id.
    pub fn entries(&self) -> Vec<OverrideEntry> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .flat_map(|(source, calls)| {
                calls.iter().map(move |(element_id, target)| OverrideEntry {
                    source: source.clone(),
                    element_id: element_id.clone(),
                    target: target.clone(),
                })
            })
            .collect();
        entries.sort();
        entries
    }
}

impl FromIterator<OverrideEntry> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = OverrideEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry.source, entry.element_id, entry.target);
        }
        table
    }
}

impl From<Vec<OverrideEntry>> for OverrideTable {
    fn from(entries: Vec<OverrideEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<OverrideTable> for Vec<OverrideEntry> {
    fn from(table: OverrideTable) -> Self {
        table.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_lookup() {
        let table = OverrideTable::new().with_entry("onboarding.bpmn", "call_kyc", "kyc-v2.bpmn");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&SourceId::from("onboarding.bpmn"), "call_kyc"),
            Some(&SourceId::from("kyc-v2.bpmn"))
        );
        assert_eq!(table.get(&SourceId::from("onboarding.bpmn"), "other"), None);
        assert_eq!(table.get(&SourceId::from("kyc.bpmn"), "call_kyc"), None);
    }

    #[test]
    fn test_override_later_entry_replaces_earlier() {
        let table: OverrideTable = vec![
            OverrideEntry::new("a.bpmn", "call", "b.bpmn"),
            OverrideEntry::new("a.bpmn", "call", "c.bpmn"),
        ]
        .into();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&SourceId::from("a.bpmn"), "call"),
            Some(&SourceId::from("c.bpmn"))
        );
    }

    #[test]
    fn test_override_serialization_is_sorted_list() {
        let table = OverrideTable::new()
            .with_entry("b.bpmn", "call", "x.bpmn")
            .with_entry("a.bpmn", "call_2", "y.bpmn")
            .with_entry("a.bpmn", "call_1", "z.bpmn");

        let json = serde_json::to_string(&table).expect("serialization failed");
        assert_eq!(
            json,
            r#"[{"source":"a.bpmn","element_id":"call_1","target":"z.bpmn"},{"source":"a.bpmn","element_id":"call_2","target":"y.bpmn"},{"source":"b.bpmn","element_id":"call","target":"x.bpmn"}]"#
        );

        let deserialized: OverrideTable = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(table, deserialized);
    }
}
