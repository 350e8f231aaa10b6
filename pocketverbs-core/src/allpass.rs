//! Golden-ratio allpass stage over a fixed ring buffer.
//!
//! One stage owns `max_len + 1` samples and a cursor that walks *downwards*.
//! The active length is owned by the caller (a tank line shares one length
//! between its two stages) and passed to every call, so a resize never has to
//! touch the stage itself beyond [`AllpassStage::clear_tail`].
//!
//! Per sample:
//! ```text
//! prev  = index - 1          (wraps to len when below 0 or above len)
//! x    -= buf[prev] * φ
//! buf[index] = x
//! x    *= φ
//! index = prev
//! out   = x + buf[index]
//! ```
//! With an impulse written at cursor 1 the echo returns `len` samples later
//! with gain `1 - φ² = φ`.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Allpass coefficient shared by every line and stage: φ = golden ratio − 1.
pub const ALLPASS_COEFF: f64 = 0.618_033_988_749_894_9;

/// Cursor value after construction and [`AllpassStage::reset`].
pub const INITIAL_INDEX: usize = 1;

#[derive(Clone, Debug)]
pub struct AllpassStage {
    buf: Vec<f64>,
    index: usize,
}

impl AllpassStage {
    /// Allocate a zeroed stage able to hold lengths up to `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: vec![0.0; max_len + 1],
            index: INITIAL_INDEX,
        }
    }

    /// Zero the buffer and return the cursor to its initial offset.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.index = INITIAL_INDEX.min(self.max_len());
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        self.buf.len() - 1
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cursor one step back, wrapped to `len`.
    #[inline]
    fn prev(&self, len: usize) -> usize {
        if self.index == 0 || self.index - 1 > len {
            len
        } else {
            self.index - 1
        }
    }

    /// Run one sample through the stage at active length `len` (`len <= max_len`).
    #[inline]
    pub fn process(&mut self, x: f64, len: usize) -> f64 {
        let prev = self.prev(len);
        let mut x = x - self.buf[prev] * ALLPASS_COEFF;
        self.buf[self.index] = x;
        x *= ALLPASS_COEFF;
        self.index = prev;
        x + self.buf[self.index]
    }

    /// Prepare for a new active length: pull the cursor inside `[0, len]` and
    /// zero everything from the cursor to the end of the buffer.
    pub fn clear_tail(&mut self, len: usize) {
        if self.index > len {
            self.index = len;
        }
        self.buf[self.index..].fill(0.0);
    }
}

// ------------------------------------ Tests --------------------------------------
