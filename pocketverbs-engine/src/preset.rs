//! TOML presets.
//!
//! ```toml
//! name = "Big hall"
//! algorithm = "zarathustra"
//! size = 0.9
//! gating = 0.0
//! mix = 0.4
//! ```
//!
//! Every field is optional; missing ones fall back to [`ReverbParams::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::params::{Algorithm, ReverbParams};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub algorithm: Algorithm,
    pub size: f32,
    pub gating: f32,
    pub mix: f32,
}

impl Default for Preset {
    fn default() -> Self {
        let p = ReverbParams::default();
        Self { name: None, algorithm: p.selected(), size: p.size, gating: p.gating, mix: p.mix }
    }
}

impl Preset {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| EngineError::ReadPreset { path: path.to_path_buf(), source })?;
        let preset = Self::from_toml_str(&text)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), algorithm = %preset.algorithm, "preset loaded");
        Ok(preset)
    }

    /// Knob values, clamped to 0..1.
    pub fn params(&self) -> ReverbParams {
        ReverbParams::new(
            self.algorithm,
            self.size.clamp(0.0, 1.0),
            self.gating.clamp(0.0, 1.0),
            self.mix.clamp(0.0, 1.0),
        )
    }

    /// Snapshot the current knob values.
    pub fn from_params(params: &ReverbParams) -> Self {
        Self {
            name: None,
            algorithm: params.selected(),
            size: params.size,
            gating: params.gating,
            mix: params.mix,
        }
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(EngineError::WritePreset)
    }
}
