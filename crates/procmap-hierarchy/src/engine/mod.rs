//! Hierarchy build facade.
//!
//! This module runs the whole pipeline in one call:
//! - [`HierarchyBuilder`]: Indexes definitions, builds the graph and the tree
//! - [`Hierarchy`]: The graph, the tree and their diagnostics
//! - [`BuildConfig`]: Configuration options

mod builder;
mod config;

pub use builder::{BuildStats, Hierarchy, HierarchyBuilder};
pub use config::{BuildConfig, BuildConfigBuilder};
