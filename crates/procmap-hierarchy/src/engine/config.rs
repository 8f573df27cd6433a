//! Build configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Configuration for one hierarchy build.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(
    name = "BuildConfigBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate", error = "Error")
)]
pub struct BuildConfig {
    /// Designated root, matched against source identifiers and then process
    /// ids. The first-loaded definition is the root when unset.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Whether call references may resolve by normalized name.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub name_heuristic: bool,

    /// Whether tree children are sorted; unsorted children keep declaration
    /// order.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sort_children: bool,
}

impl BuildConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(root)) = &self.root
            && root.trim().is_empty()
        {
            return Err("root must not be empty".into());
        }
        Ok(())
    }
}

impl BuildConfig {
    /// Creates a builder for this config.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::default()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: None,
            name_heuristic: true,
            sort_children: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = BuildConfig::builder().build().expect("defaults are valid");
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_builder_setters() {
        let config = BuildConfig::builder()
            .with_root("onboarding.bpmn")
            .with_name_heuristic(false)
            .with_sort_children(false)
            .build()
            .expect("config is valid");
        assert_eq!(config.root.as_deref(), Some("onboarding.bpmn"));
        assert!(!config.name_heuristic);
        assert!(!config.sort_children);
    }

    #[test]
    fn test_blank_root_rejected() {
        let result = BuildConfig::builder().with_root("  ").build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BuildConfig =
            serde_json::from_str(r#"{"root":"kyc"}"#).expect("deserialization failed");
        assert_eq!(config.root.as_deref(), Some("kyc"));
        assert!(config.name_heuristic);
        assert!(config.sort_children);
    }
}
