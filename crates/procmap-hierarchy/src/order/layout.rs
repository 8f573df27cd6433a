//! Layout-derived visual ordering.

use std::collections::{HashMap, HashSet};

use crate::definition::ProcessDefinition;

/// Assigns a visual order index to every positioned element.
///
/// Elements are ranked by diagram position, left to right then top to
/// bottom, with the element id breaking exact ties. Elements without a
/// position, and repeated declarations of an id, get no index.
pub fn visual_order(definition: &ProcessDefinition) -> HashMap<&str, u32> {
    let mut seen = HashSet::new();
    let mut positioned: Vec<_> = definition
        .elements
        .iter()
        .filter(|element| seen.insert(element.id.as_str()))
        .filter_map(|element| Some((element.id.as_str(), element.position?)))
        .collect();

    positioned.sort_by(|(a_id, a), (b_id, b)| a.layout_cmp(b).then_with(|| a_id.cmp(b_id)));

    positioned
        .into_iter()
        .zip(0u32..)
        .map(|((id, _), rank)| (id, rank))
        .collect()
}
