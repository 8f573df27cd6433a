//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use procmap_hierarchy::prelude::*;
//! ```

pub use crate::definition::{
    Element, ElementKind, EventKind, ProcessDefinition, ProcessDefinitionIndex, SequenceFlow,
    SourceId,
};
pub use crate::engine::{BuildConfig, Hierarchy, HierarchyBuilder};
pub use crate::error::{Error, Result};
pub use crate::graph::{Diagnostic, DiagnosticKind, GraphBuilder, NodeKey, ProcessGraph};
pub use crate::order::{NodeOrder, OrderIndexer};
pub use crate::resolve::{OverrideTable, ReferenceResolver};
pub use crate::tree::{ProcessTree, ProcessTreeNode, TreeBuilder};
