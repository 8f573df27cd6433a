#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod definition;
pub mod engine;
mod error;
pub mod graph;
pub mod order;
pub mod resolve;
pub mod tree;

#[doc(hidden)]
pub mod prelude;

pub use error::{Error, Result};

/// Tracing target for graph construction.
pub const TRACING_TARGET_GRAPH: &str = "procmap_hierarchy::graph";

/// Tracing target for execution ordering.
pub const TRACING_TARGET_ORDER: &str = "procmap_hierarchy::order";

/// Tracing target for call activity resolution.
pub const TRACING_TARGET_RESOLVE: &str = "procmap_hierarchy::resolve";

/// Tracing target for tree expansion.
pub const TRACING_TARGET_TREE: &str = "procmap_hierarchy::tree";

/// Tracing target for the build facade.
pub const TRACING_TARGET_ENGINE: &str = "procmap_hierarchy::engine";
