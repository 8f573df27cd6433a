//! Error types for hierarchy builds.

use derive_builder::UninitializedFieldError;
use thiserror::Error;

/// Result type for hierarchy builds.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that prevent a build from running.
///
/// Data-quality problems in the input are never errors; they are reported
/// as [`Diagnostic`] values alongside the build output.
///
/// [`Diagnostic`]: crate::graph::Diagnostic
#[derive(Debug, Error)]
pub enum Error {
    /// The build was invoked without any process definition.
    #[error("no process definitions supplied")]
    NoDefinitions,

    /// The designated root matches no source and no process id.
    #[error("root '{root}' matches no loaded source or process id")]
    RootNotFound {
        /// The designated root identity.
        root: String,
    },

    /// Build configuration is invalid.
    #[error("invalid build config: {0}")]
    InvalidConfig(String),
}

impl From<UninitializedFieldError> for Error {
    fn from(err: UninitializedFieldError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::InvalidConfig(message)
    }
}
