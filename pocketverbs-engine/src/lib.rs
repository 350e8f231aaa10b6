//! PocketVerbs engine: six reverb algorithms over a 26-line allpass tank.
//!
//! Crate layout:
//! - [`params`]    : knob values, algorithm selector, per-block mapping
//! - [`topology`]  : the six algorithms expressed as wiring data
//! - [`tank`]      : 26 lines × 2 allpass stages and the two walks over them
//! - [`resize`]    : prime-biased lengths and the staged resize machine
//! - [`reverb`]    : `ReverbEngine`, the stereo chain around two tanks
//! - [`processor`] : `StereoProcessor` trait and `Transport<P>` wrapper
//! - [`preset`]    : TOML presets (feature `presets`)
//!
//! All buffers are allocated when the engine is built; processing never allocates.

pub mod error;
pub mod params;
#[cfg(feature = "presets")]
pub mod preset;
pub mod processor;
pub mod resize;
pub mod reverb;
pub mod tank;
pub mod topology;

pub use error::{EngineError, Result};
pub use params::{Algorithm, BlockParams, ReverbParams};
#[cfg(feature = "presets")]
pub use preset::Preset;
pub use processor::{StereoProcessor, Transport};
pub use resize::ResizeState;
pub use reverb::{ReverbEngine, Side};
pub use tank::{LINE_COUNT, MAX_LENGTHS};
