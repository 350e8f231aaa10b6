//! Size-adaptation state machine.
//!
//! Changing every delay length at once clicks. Instead, a room-size change
//! starts a 26-block pass that recomputes one tank line per block, A first and
//! Z last, clearing the part of that line's buffers the new length is about to
//! expose. A further change mid-pass restarts from A; nothing is queued.
//!
//! ```text
//!   Idle ──ratio changed──▶ Resizing(26) ─block─▶ Resizing(25) … Resizing(1) ─block─▶ Idle
//!                              ▲                                    │
//!                              └──────────── ratio changed ─────────┘
//! ```

use crate::tank::LINE_COUNT;

/// Largest divisor the prime-biasing search steers away from.
pub const PRIME_BIAS_LIMIT: usize = 70;

const COUNTDOWN_START: i32 = LINE_COUNT as i32;
const UNSET_RATIO: f64 = -1.0;

/// Observable state of the machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResizeState {
    Idle,
    /// Phase 26 resizes line A next, phase 1 resizes line Z next.
    Resizing(u8),
}

/// `true` if `n` has a divisor in `2..=70` other than itself.
#[inline]
pub fn has_small_divisor(n: usize) -> bool {
    (2..=PRIME_BIAS_LIMIT).any(|d| d != n && n % d == 0)
}

/// `floor(max_len * ratio)`, nudged upwards until it has no divisor in 2..=70
/// besides itself. Reaching `max_len` ends the search at `max_len`.
/// The result is never zero.
pub fn prime_biased_length(max_len: usize, ratio: f64) -> usize {
    let max_len = max_len.max(1);
    // `as` saturates; NaN and negatives land on 0
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let mut len = ((max_len as f64) * ratio) as usize;
    len = len.max(1);
    while len < max_len {
        if !has_small_divisor(len) {
            return len;
        }
        len += 1;
    }
    max_len
}

/// Countdown driver. Owns no buffers; it only says which line to resize next.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizeAdapter {
    saved_ratio: f64,
    countdown: i32,
}

impl Default for SizeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeAdapter {
    /// Fresh machine; the first observed ratio always starts a pass.
    pub fn new() -> Self {
        Self { saved_ratio: UNSET_RATIO, countdown: -1 }
    }

    /// Compare against the saved ratio; a difference restarts the countdown at 26.
    /// Returns `true` when a (re)start happened.
    pub fn observe(&mut self, ratio: f64) -> bool {
        #[allow(clippy::float_cmp)]
        let same = ratio == self.saved_ratio;
        if same {
            return false;
        }
        self.saved_ratio = ratio;
        self.countdown = COUNTDOWN_START;
        true
    }

    /// Take one phase: the line to resize this block, or `None` when idle.
    pub fn advance(&mut self) -> Option<usize> {
        if self.countdown <= 0 {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let line = (COUNTDOWN_START - self.countdown) as usize;
        self.countdown -= 1;
        Some(line)
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.saved_ratio
    }

    #[inline]
    pub fn countdown(&self) -> i32 {
        self.countdown
    }

    pub fn state(&self) -> ResizeState {
        if self.countdown > 0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let phase = self.countdown as u8;
            ResizeState::Resizing(phase)
        } else {
            ResizeState::Idle
        }
    }
}
