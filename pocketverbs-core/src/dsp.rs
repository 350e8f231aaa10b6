//! Math backend and the stateless conditioning stages around the reverb tank.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Clean, side-effect free helpers that are easy to test
//!
//! The console pair models an analog mixing console: [`console`] soft-saturates
//! the signal on its way into the tank with a sine curve, [`unconsole`] bends it
//! back on the way out. Neither is an exact inverse of the other.

#![allow(clippy::excessive_precision)]

use core::f64::consts::FRAC_PI_2;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(any(feature = "no-std", not(feature = "std")))] {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { libm::sin(x) }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { libm::cos(x) }
        #[inline] pub(crate) fn m_abs(x: f64) -> f64 { libm::fabs(x) }
    // std backend
    } else {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { x.sin() }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { x.cos() }
        #[inline] pub(crate) fn m_abs(x: f64) -> f64 { x.abs() }
    }
}

// --------------------------------- Constants -------------------------------------

/// Inputs quieter than this are treated as denormal and replaced with dither-derived noise.
pub const DENORMAL_THRESHOLD: f64 = 1.18e-23;

/// Scale applied to the dither state when substituting a denormal input.
pub const DENORMAL_SUBSTITUTE_SCALE: f64 = 1.18e-17;

// --------------------------------- Utilities -------------------------------------

/// `+1.0` for non-negative input, `-1.0` otherwise.
#[inline]
pub fn signum_nonzero(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

// --------------------------------- Console pair ----------------------------------

/// Console drive: `x *= gain`, then `sign(x) * sin(|x|)`.
///
/// The magnitude is limited to π/2 before the sine so the curve stays monotonic;
/// the output is therefore always within [-1, 1].
#[inline]
pub fn console(x: f64, gain: f64) -> f64 {
    let driven = x * gain;
    let mag = m_abs(driven).min(FRAC_PI_2);
    signum_nonzero(driven) * m_sin(mag)
}

/// Inverse console: `x -= sign(x) * (1 - cos(|x|))`, then `x /= gain`.
///
/// `gain` comes from [`console`]'s caller and is never below 0.5 in the engine.
#[inline]
pub fn unconsole(x: f64, gain: f64) -> f64 {
    let bent = x - signum_nonzero(x) * (1.0 - m_cos(m_abs(x)));
    bent / gain
}

// --------------------------------- Tests (std only) ------------------------------
