//! Errors at the edges of the engine. The DSP path itself cannot fail.

#[cfg(feature = "presets")]
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Algorithm name not one of chamber, spring, tiled, room, stretch, zarathustra.
    #[error("unknown reverb algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Preset file could not be read.
    #[cfg(feature = "presets")]
    #[error("failed to read preset '{path}': {source}")]
    ReadPreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preset file is not valid TOML or has the wrong shape.
    #[cfg(feature = "presets")]
    #[error("failed to parse preset: {0}")]
    ParsePreset(#[from] toml::de::Error),

    #[cfg(feature = "presets")]
    #[error("failed to serialize preset: {0}")]
    WritePreset(toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
