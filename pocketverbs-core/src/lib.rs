#![cfg_attr(not(feature = "std"), no_std)]
//! PocketVerbs Core: no_std-ready DSP primitives for the PocketVerbs reverb.
//!
//! Features
//! - `std`    : (default) use the Rust standard library
//! - `no-std` : build with `#![no_std]` (plus `alloc`) and take trig from `libm`
//!
//! Modules
//! - [`dsp`]       : math backend, console saturation pair, denormal threshold
//! - [`dither`]    : per-channel xorshift state, denormal substitution, output dither
//! - [`allpass`]   : golden-ratio allpass stage over a fixed ring buffer
//! - [`envelopes`] : decaying peak follower that drives the gated wet mix
//!
//! Design
//! - Sample math is `f64`; only the dither looks at the `f32` the host will receive
//! - Buffers are allocated once, at construction; nothing allocates per sample
//! - Everything here is free of host or plugin concerns

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod dither;
pub mod dsp;
pub mod envelopes;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::allpass::{AllpassStage, ALLPASS_COEFF};
    pub use crate::dither::{Dither, MIN_SEED};
    pub use crate::dsp::{console, unconsole, DENORMAL_THRESHOLD};
    pub use crate::envelopes::PeakFollower;
}
