//! Sibling ordering.

use std::cmp::Ordering;

use super::ProcessTreeNode;

/// Compares two siblings for display order.
///
/// Keys are evaluated in order until one differs:
///
/// 1. order index
/// 2. visual order index
/// 3. branch id
/// 4. label, case-insensitive; an empty label counts as missing
///
/// A sibling missing a key sorts after one that has it. Node identity breaks
/// any remaining tie, so the order is total.
pub fn compare_siblings(a: &ProcessTreeNode, b: &ProcessTreeNode) -> Ordering {
    present_first(a.order.order_index, b.order.order_index)
        .then_with(|| present_first(a.order.visual_order_index, b.order.visual_order_index))
        .then_with(|| {
            present_first(
                a.order.branch_id.as_ref().map(|id| id.as_str()),
                b.order.branch_id.as_ref().map(|id| id.as_str()),
            )
        })
        .then_with(|| compare_labels(a.label.trim(), b.label.trim()))
        .then_with(|| a.key.cmp(&b.key))
}

/// Sorts siblings in place with [`compare_siblings`].
pub fn sort_siblings(siblings: &mut [ProcessTreeNode]) {
    siblings.sort_by(compare_siblings);
}

fn present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => {
            let a = a.chars().flat_map(char::to_lowercase);
            let b = b.chars().flat_map(char::to_lowercase);
            a.cmp(b)
        }
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}
