use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BuilderError, BuilderResult};

/// Default bound on container nesting, shared by the engine and the validator.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 20;

/// How new element and section ids are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `element-1`, `element-2`, ... per session
    #[default]
    Counter,
    /// `element-<uuid v4>`
    Uuid,
}

/// Builder configuration, usually loaded from a YAML file:
///
/// ```yaml
/// id_strategy: uuid
/// max_nesting_depth: 1
/// embed_form_data: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub id_strategy: IdStrategy,
    pub id_prefix: String,
    pub section_id_prefix: String,
    /// Container levels an element may sit under. 1 allows containers at the root only.
    pub max_nesting_depth: usize,
    /// Append the JSON data island to generated contract HTML.
    pub embed_form_data: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Counter,
            id_prefix: "element".to_string(),
            section_id_prefix: "section".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            embed_form_data: true,
        }
    }
}

impl BuilderConfig {
    pub fn from_yaml_str(yaml: &str) -> BuilderResult<Self> {
        let config: BuilderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> BuilderResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BuilderError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> BuilderResult<()> {
        if self.max_nesting_depth == 0 {
            return Err(BuilderError::Config(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        for (name, prefix) in [
            ("id_prefix", &self.id_prefix),
            ("section_id_prefix", &self.section_id_prefix),
        ] {
            if prefix.is_empty() || prefix.chars().any(|c| c.is_whitespace() || c == ':') {
                return Err(BuilderError::Config(format!(
                    "{} must be non-empty and contain no whitespace or ':'",
                    name
                )));
            }
        }
        Ok(())
    }
}
