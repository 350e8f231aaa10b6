//! Parameter stage: the four knob values and their per-block mapping.
//!
//! The host hands us plain floats (algorithm selector, size, gating, dry/wet).
//! [`BlockParams::from_params`] turns them into the run-time quantities once per
//! processing block; nothing here has side effects.

use core::fmt;
use core::str::FromStr;

use crate::error::EngineError;

/// Reverb topology, selected by the `type` knob.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "presets",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Algorithm {
    #[default]
    Chamber,
    Spring,
    Tiled,
    Room,
    Stretch,
    Zarathustra,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Chamber,
        Algorithm::Spring,
        Algorithm::Tiled,
        Algorithm::Room,
        Algorithm::Stretch,
        Algorithm::Zarathustra,
    ];

    /// 1-based index (Chamber = 1 … Zarathustra = 6).
    #[inline]
    pub fn index(self) -> u8 {
        self as u8 + 1
    }

    /// Clamp a 1-based index into 1..=6.
    #[inline]
    pub fn from_index(index: i32) -> Self {
        Self::ALL[(index.clamp(1, 6) - 1) as usize]
    }

    /// Map the raw `type` knob: `floor(raw) + 1`, clamped to 1..=6. NaN selects Chamber.
    #[inline]
    pub fn from_selector(raw: f32) -> Self {
        // `as` saturates and maps NaN to 0
        #[allow(clippy::cast_possible_truncation)]
        let floor = raw.floor() as i32;
        Self::from_index(floor.saturating_add(1))
    }

    /// The knob value that selects this algorithm.
    #[inline]
    pub fn selector(self) -> f32 {
        f32::from(self.index() - 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Chamber => "chamber",
            Algorithm::Spring => "spring",
            Algorithm::Tiled => "tiled",
            Algorithm::Room => "room",
            Algorithm::Stretch => "stretch",
            Algorithm::Zarathustra => "zarathustra",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| EngineError::UnknownAlgorithm(s.to_string()))
    }
}

/// Raw knob values, exactly as a host would deliver them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReverbParams {
    /// Algorithm selector; `floor(algorithm) + 1` picks the topology.
    pub algorithm: f32,
    /// Room size, 0..1.
    pub size: f32,
    /// Gate release amount, 0..1 (0 disables the gate).
    pub gating: f32,
    /// Wet fraction, 0..1.
    pub mix: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self { algorithm: 0.0, size: 0.5, gating: 0.0, mix: 0.5 }
    }
}

impl ReverbParams {
    pub fn new(algorithm: Algorithm, size: f32, gating: f32, mix: f32) -> Self {
        Self { algorithm: algorithm.selector(), size, gating, mix }
    }

    #[inline]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm.selector();
        self
    }

    #[inline]
    pub fn selected(&self) -> Algorithm {
        Algorithm::from_selector(self.algorithm)
    }
}

/// Room-size ratio for a size knob value: `0.1 + 1.9 * size²`.
#[inline]
pub fn room_ratio(size: f64) -> f64 {
    0.1 + 1.9 * size * size
}

/// Gate release per sample: `0.00008 * gating³`.
#[inline]
pub fn release_rate(gating: f64) -> f64 {
    0.00008 * gating * gating * gating
}

/// Per-block run-time quantities derived from [`ReverbParams`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockParams {
    pub algorithm: Algorithm,
    pub room_ratio: f64,
    pub release: f64,
    /// Wet target before the gate scales it.
    pub wet: f64,
    /// `1 - wet`.
    pub dry: f64,
    /// Console drive, `0.5 + 0.5 * wet`.
    pub console_gain: f64,
}

impl BlockParams {
    pub fn from_params(p: &ReverbParams) -> Self {
        let wet = f64::from(p.mix);
        Self {
            algorithm: p.selected(),
            room_ratio: room_ratio(f64::from(p.size)),
            release: release_rate(f64::from(p.gating)),
            wet,
            dry: 1.0 - wet,
            console_gain: 0.5 + 0.5 * wet,
        }
    }

    /// A release of exactly zero holds both peak followers at 1.0.
    #[inline]
    pub fn gate_disabled(&self) -> bool {
        self.release == 0.0
    }
}

impl Default for BlockParams {
    fn default() -> Self {
        Self::from_params(&ReverbParams::default())
    }
}
