#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Every tunable of the engine lives in [`EngineConfig`], which can be
//! embedded as JSON by the host:
//!
//! ```json
//! {
//!   "home_paths": ["/", "/directory"],
//!   "min_candidates": 6,
//!   "cluster": { "band_tolerance": 48.0 }
//! }
//! ```
//!
//! # Defaults
//!
//! Missing fields take the values in `Default`, so `{}` is a valid config.

use serde::{Deserialize, Serialize};
use tvlayer_nav::{ClusterConfig, ExtractorConfig};

/// Smallest row the engine will index, whatever `cluster.min_row_len` says.
pub const MIN_ROW_LEN: usize = 3;

/// Storage key of the preference record.
pub const DEFAULT_STORAGE_KEY: &str = "tvLayerSettings";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Row clustering parameters. `min_row_len` below [`MIN_ROW_LEN`] is
    /// raised to it; see [`effective_cluster`](Self::effective_cluster).
    pub cluster: ClusterConfig,
    /// Card discovery parameters.
    pub extractor: ExtractorConfig,
    /// Paths on which the grid is built.
    pub home_paths: Vec<String>,
    /// Fewer extracted cards than this means "not a navigable view".
    pub min_candidates: usize,
    /// Local storage key for [`Preferences`](crate::prefs::Preferences).
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            extractor: ExtractorConfig::default(),
            home_paths: vec!["/".to_owned(), "/directory".to_owned()],
            min_candidates: 6,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Clustering parameters as the engine applies them.
    #[must_use]
    pub fn effective_cluster(&self) -> ClusterConfig {
        ClusterConfig {
            min_row_len: self.cluster.min_row_len.max(MIN_ROW_LEN),
            ..self.cluster
        }
    }

    /// Whether `path` is one of the home views.
    ///
    /// A single trailing slash is ignored, except for the root itself.
    #[must_use]
    pub fn is_home_path(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.home_paths
            .iter()
            .any(|home| normalize_path(home) == normalized)
    }
}

fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Configuration loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON or has wrongly typed fields.
    Json(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "invalid engine config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(
            EngineConfig::from_json_str("{}").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn nested_fields_override_individually() {
        let config =
            EngineConfig::from_json_str(r#"{"cluster":{"band_tolerance":48.0},"min_candidates":4}"#)
                .unwrap();
        assert_eq!(config.cluster.band_tolerance, 48.0);
        assert_eq!(config.cluster.min_row_len, 3);
        assert_eq!(config.cluster.max_rows, 8);
        assert_eq!(config.min_candidates, 4);
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn row_floor_cannot_be_lowered() {
        let config =
            EngineConfig::from_json_str(r#"{"cluster":{"min_row_len":1,"max_rows":4}}"#).unwrap();
        let cluster = config.effective_cluster();
        assert_eq!(cluster.min_row_len, MIN_ROW_LEN);
        assert_eq!(cluster.max_rows, 4);

        let config = EngineConfig::from_json_str(r#"{"cluster":{"min_row_len":5}}"#).unwrap();
        assert_eq!(config.effective_cluster().min_row_len, 5);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = EngineConfig::from_json_str(r#"{"min_candidates":"six"}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid engine config"));
    }

    #[test]
    fn home_path_matching() {
        let config = EngineConfig::default();
        assert!(config.is_home_path("/"));
        assert!(config.is_home_path("/directory"));
        assert!(config.is_home_path("/directory/"));
        assert!(!config.is_home_path("/directory/following"));
        assert!(!config.is_home_path("/somechannel"));
        assert!(!config.is_home_path(""));
    }

    #[test]
    fn default_storage_key() {
        assert_eq!(EngineConfig::default().storage_key, "tvLayerSettings");
    }
}
