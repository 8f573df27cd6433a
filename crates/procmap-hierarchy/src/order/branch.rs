//! Branch identifiers for concurrent control-flow paths.

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Separator between nested fork segments.
const SEGMENT_SEPARATOR: &str = "/";

/// Identifies the path a node sits on after one or more forks.
///
/// Each segment is `fork_id#k`, where `k` is the position of the taken
/// outgoing flow among the fork's flows in declaration order. Nested forks
/// append segments, e.g. `gw_split#0/gw_inner#1`. Independent entry points
/// of a process with several start nodes use their own id as the first
/// segment.
///
/// Only nodes sharing a branch (or one branch being a prefix of the other)
/// are causally ordered by their order index.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct BranchId(String);

impl BranchId {
    /// Creates a branch id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether `self` is `other` or a branch nested inside it.
    pub fn is_within(&self, other: &BranchId) -> bool {
        self.0 == other.0
            || self
                .0
                .strip_prefix(other.0.as_str())
                .is_some_and(|rest| rest.starts_with(SEGMENT_SEPARATOR))
    }
}

impl From<&str> for BranchId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Segment list used while indexing; empty means the main line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BranchPath {
    segments: Vec<String>,
}

impl BranchPath {
    /// Path of an independent entry point.
    pub fn entry(element_id: &str) -> Self {
        Self {
            segments: vec![element_id.to_owned()],
        }
    }

    /// Path taken through outgoing flow `k` of fork `fork_id`.
    pub fn fork(&self, fork_id: &str, k: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("{fork_id}#{k}"));
        Self { segments }
    }

    /// Longest shared segment prefix of the given paths.
    ///
    /// Joining paths fall back to the branch they diverged from.
    pub fn common_prefix<'a>(paths: impl IntoIterator<Item = &'a BranchPath>) -> Self {
        let mut paths = paths.into_iter();
        let Some(first) = paths.next() else {
            return Self::default();
        };

        let mut shared = first.segments.len();
        for path in paths {
            shared = first.segments[..shared]
                .iter()
                .zip(&path.segments)
                .take_while(|(a, b)| a == b)
                .count();
        }

        Self {
            segments: first.segments[..shared].to_vec(),
        }
    }

    /// Converts to a public id; the main line has none.
    pub fn to_branch_id(&self) -> Option<BranchId> {
        (!self.segments.is_empty())
            .then(|| BranchId(self.segments.join(SEGMENT_SEPARATOR)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_appends_segment() {
        let main = BranchPath::default();
        assert_eq!(main.to_branch_id(), None);

        let left = main.fork("split", 0);
        let nested = left.fork("inner", 1);
        assert_eq!(left.to_branch_id(), Some(BranchId::from("split#0")));
        assert_eq!(nested.to_branch_id(), Some(BranchId::from("split#0/inner#1")));
    }

    #[test]
    fn test_common_prefix_rejoins_parent() {
        let main = BranchPath::default();
        let left = main.fork("split", 0);
        let right = main.fork("split", 1);
        let nested = left.fork("inner", 0);

        assert_eq!(BranchPath::common_prefix([&left, &right]), main);
        assert_eq!(BranchPath::common_prefix([&left, &nested]), left);
        assert_eq!(BranchPath::common_prefix([&nested]), nested);
        assert_eq!(BranchPath::common_prefix(std::iter::empty()), main);
    }

    #[test]
    fn test_is_within() {
        let outer = BranchId::from("split#0");
        assert!(BranchId::from("split#0/inner#1").is_within(&outer));
        assert!(outer.is_within(&outer));
        assert!(!BranchId::from("split#01").is_within(&outer));
        assert!(!BranchId::from("split#1").is_within(&outer));
    }
}
