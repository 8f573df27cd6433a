//! Source identifier type.

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Identifier of the source a process definition was parsed from.
///
/// Usually a path relative to the project root, e.g. `loans/kyc.bpmn`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a new source identifier.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path segment without its extension.
    ///
    /// `loans/credit-check.bpmn` yields `credit-check`.
    pub fn stem(&self) -> &str {
        let file = self.0.rsplit(['/', '\\']).next().unwrap_or(&self.0);
        match file.rfind('.') {
            Some(dot) if dot > 0 => &file[..dot],
            _ => file,
        }
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
