//! Modeling configuration: orientation presets and default parameters for
//! every operation.
//!
//! Configuration is JSON. Every field is optional and falls back to its
//! default, so a file only needs to name what it changes:
//!
//! ```json
//! {
//!   "solidify": { "thickness": 1.2 },
//!   "margin": { "density": 80 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::margin::{MarginParams, RefineParams};
use crate::orient::OrientationPresets;
use crate::solidify::SolidifyParams;

/// Everything the modeling operations can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelingConfig {
    /// Orientation preset table, in listing order.
    pub presets: OrientationPresets,
    pub solidify: SolidifyParams,
    pub margin: MarginParams,
    pub refine: RefineParams,
}

impl ModelingConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ModelError::config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModelError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&contents)
            .map_err(|e| ModelError::config(format!("{}: {}", path.display(), e)))?;
        debug!(
            "Loaded configuration from {} ({} presets)",
            path.display(),
            config.presets.len()
        );
        Ok(config)
    }

    /// Check every parameter group.
    pub fn validate(&self) -> ModelResult<()> {
        self.solidify.validate()?;
        self.margin.validate()?;
        self.refine.validate()?;
        if let Some((name, _)) = self
            .presets
            .iter()
            .find(|(_, d)| d.iter().any(|v| !v.is_finite()))
        {
            return Err(ModelError::config(format!(
                "preset '{}' has a non-finite rotation",
                name
            )));
        }
        Ok(())
    }
}
