//! Peak follower used as the gate on the reverb's wet level.
//!
//! The follower decays linearly by `release` per sample and re-triggers
//! instantly on anything louder: `peak = min(max(peak - release, |2x|), 1)`.
//! Scaling the wet mix by it gives a gated reverb: full ambience on transients,
//! ducking towards dry as the input dies away. A release of zero holds the
//! follower at 1.0, which disables the gate.

use crate::dsp::m_abs;

/// Decaying peak tracker, range [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeakFollower {
    peak: f64,
}

impl Default for PeakFollower {
    fn default() -> Self {
        Self::new()
    }
}

impl PeakFollower {
    /// Starts fully open (1.0).
    #[inline]
    pub fn new() -> Self {
        Self { peak: 1.0 }
    }

    /// Force the follower fully open.
    #[inline]
    pub fn open(&mut self) {
        self.peak = 1.0;
    }

    #[inline]
    pub fn level(&self) -> f64 {
        self.peak
    }

    /// Track one dry sample; returns the new level.
    #[inline]
    pub fn track(&mut self, x: f64, release: f64) -> f64 {
        self.peak -= release;
        self.peak = self.peak.max(m_abs(2.0 * x)).min(1.0);
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_linearly_in_silence() {
        let mut p = PeakFollower::new();
        for _ in 0..100 {
            p.track(0.0, 0.001);
        }
        assert!((p.level() - 0.9).abs() < 1e-9, "level={}", p.level());
    }

    #[test]
    fn retriggers_on_transient() {
        let mut p = PeakFollower::new();
        for _ in 0..5000 {
            p.track(0.0, 0.001);
        }
        assert!(p.level() < 1e-12);
        assert!((p.track(0.2, 0.001) - 0.4).abs() < 1e-12);
        assert!((p.track(-0.3, 0.001) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn never_exceeds_unity() {
        let mut p = PeakFollower::new();
        assert_eq!(p.track(5.0, 0.0), 1.0);
        assert_eq!(p.track(-5.0, 0.01), 1.0);
    }

    #[test]
    fn zero_release_holds_open() {
        let mut p = PeakFollower::new();
        for i in 0..1000 {
            p.track(if i % 2 == 0 { 0.0 } else { 0.01 }, 0.0);
        }
        assert_eq!(p.level(), 1.0);
    }
}
