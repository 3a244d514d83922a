//! Explorer configuration, loadable from TOML.
//!
//! ```toml
//! max_depth = 25
//! truncated_paths = "include"
//! refinement_propagation = "transitive"
//! initial_marking = "explicit"
//! max_graph_states = 10000
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, LoadResult};

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Whether paths cut off at the depth limit take part in the verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncatedPaths {
    Include,
    #[default]
    Exclude,
}

/// How far a completed element satisfies its ancestors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementPropagation {
    /// Only the direct parents of the completed element are re-evaluated.
    #[default]
    Shallow,
    /// Newly satisfied parents are re-evaluated against their own parents
    /// until nothing changes.
    Transitive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialMarking {
    /// Every place starts with its declared `initialTokens`.
    #[default]
    Explicit,
    /// Compatibility shim: when no place declares a token, places called
    /// `source`, `start` or `p0` start with one.
    ConventionalStartPlaces,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    pub max_depth: usize,
    pub truncated_paths: TruncatedPaths,
    pub refinement_propagation: RefinementPropagation,
    pub initial_marking: InitialMarking,
    pub max_graph_states: Option<usize>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            truncated_paths: TruncatedPaths::default(),
            refinement_propagation: RefinementPropagation::default(),
            initial_marking: InitialMarking::default(),
            max_graph_states: None,
        }
    }
}

impl ExplorerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &Path) -> LoadResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| LoadError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded explorer config");
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ExplorerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.truncated_paths, TruncatedPaths::Exclude);
    }

    #[test]
    fn test_partial_toml() {
        let config = ExplorerConfig::from_toml_str(
            "max_depth = 3\nrefinement_propagation = \"transitive\"\ninitial_marking = \"conventional_start_places\"\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.refinement_propagation, RefinementPropagation::Transitive);
        assert_eq!(config.initial_marking, InitialMarking::ConventionalStartPlaces);
        assert_eq!(config.max_graph_states, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ExplorerConfig::from_toml_str("depth = 3").is_err());
    }
}
