#![forbid(unsafe_code)]

//! Adapter configuration: engine settings plus browser-only knobs.
//!
//! ```json
//! {
//!   "engine": { "home_paths": ["/", "/directory", "/following"] },
//!   "style": { "stylesheet_url": "/tv.css" },
//!   "log_level": "debug"
//! }
//! ```

use serde::{Deserialize, Serialize};
use tvlayer_runtime::{ConfigError, EngineConfig};

use crate::style::StyleConfig;

/// Top-level adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub engine: EngineConfig,
    pub style: StyleConfig,
    /// Console log threshold (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            style: StyleConfig::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl LayerConfig {
    /// Parse a JSON config. `None` or a blank string yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(raw) => serde_json::from_str(raw).map_err(|e| ConfigError::Json(e.to_string())),
        }
    }

    /// Parsed [`log_level`](Self::log_level); unknown names mean `INFO`.
    #[must_use]
    pub fn max_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
