//! Per-channel xorshift state shared by denormal substitution and output dither.
//!
//! The dither is reproduced bit-for-bit: the state is a 32-bit xorshift
//! (`<<13`, `>>17`, `<<5`), and each output sample receives
//! `(state - 0x7FFF_FFFF) * 5.5e-36 * 2^(exponent + 62)` where `exponent` is the
//! `frexp` exponent of the sample rounded to `f32`. The noise therefore sits
//! right at the quantisation step of the `f32` the host receives.

use crate::dsp::{m_abs, DENORMAL_SUBSTITUTE_SCALE, DENORMAL_THRESHOLD};

/// Smallest accepted seed when reseeding; lower states produce audibly
/// patterned noise during the first samples.
pub const MIN_SEED: u32 = 16386;

const NOISE_SCALE: f64 = 5.5e-36;
const STATE_MIDPOINT: f64 = 2_147_483_647.0;

/// Output dither source for one channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dither {
    state: u32,
}

impl Default for Dither {
    fn default() -> Self {
        Self { state: 1 }
    }
}

impl Dither {
    /// Fixed seed (tests, reproducible renders). Zero would lock the xorshift, so it maps to 1.
    #[inline]
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Draw seeds from `next` until one reaches [`MIN_SEED`].
    pub fn reseed_with<F: FnMut() -> u32>(&mut self, mut next: F) {
        let mut seed = 1;
        while seed < MIN_SEED {
            seed = next();
        }
        self.state = seed;
    }

    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Replace a (near-)denormal input with a tiny value derived from the current state.
    ///
    /// Does not advance the state.
    #[inline]
    pub fn substitute_denormal(&self, x: f64) -> f64 {
        if m_abs(x) < DENORMAL_THRESHOLD {
            f64::from(self.state) * DENORMAL_SUBSTITUTE_SCALE
        } else {
            x
        }
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Advance the state and add noise scaled to the `f32` quantisation step of `x`.
    #[inline]
    pub fn apply(&mut self, x: f64) -> f64 {
        #[allow(clippy::cast_possible_truncation)]
        let (_, exponent) = libm::frexpf(x as f32);
        let s = self.step();
        x + (f64::from(s) - STATE_MIDPOINT) * NOISE_SCALE * libm::ldexp(1.0, exponent + 62)
    }
}

// ------------------------------------ Tests --------------------------------------
