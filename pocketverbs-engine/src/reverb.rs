//! Stereo PocketVerbs engine: parameter stage → staged resize → per-sample chain.
//!
//! Per block ([`ReverbEngine::prepare_block`]):
//! 1. map the knobs to [`BlockParams`];
//! 2. a release of zero opens both gates;
//! 3. a new room-size ratio (re)starts the 26-phase resize; one line (in both
//!    channels) is resized per block.
//!
//! Per sample and channel ([`ReverbEngine::process_frame`]):
//! denormal substitution → peak follower → console → tank → unconsole →
//! gated wet/dry blend → dither → `f32`. Room skips the console on the way
//! in and feeds the raw dry sample to its lines.

use pocketverbs_core::dither::Dither;
use pocketverbs_core::dsp::{console, unconsole};
use pocketverbs_core::envelopes::PeakFollower;
use rand::Rng;

use crate::params::{BlockParams, ReverbParams};
use crate::processor::StereoProcessor;
use crate::resize::{ResizeState, SizeAdapter};
use crate::tank::{Tank, TankLine};
use crate::topology::Topology;

/// Channel selector for inspection helpers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Everything one channel owns: its tank, gate and dither.
#[derive(Clone, Debug)]
struct Channel {
    tank: Tank,
    peak: PeakFollower,
    dither: Dither,
}

impl Channel {
    fn new() -> Self {
        Self { tank: Tank::new(), peak: PeakFollower::new(), dither: Dither::default() }
    }

    fn reset(&mut self) {
        self.tank.reset();
        self.peak.open();
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn process(&mut self, input: f32, block: &BlockParams, topology: &Topology) -> f32 {
        let dry = self.dither.substitute_denormal(f64::from(input));
        let wet_now = block.wet * self.peak.track(dry, block.release);

        let driven = console(dry, block.console_gain);
        let tanked = self.tank.process(driven, dry, topology, block);
        let wet = unconsole(tanked, block.console_gain);

        let out = dry * (1.0 - wet_now) + wet * wet_now;
        self.dither.apply(out) as f32
    }
}

/// The six-algorithm stereo reverb.
#[derive(Clone, Debug)]
pub struct ReverbEngine {
    sample_rate: f32,
    params: ReverbParams,
    block: BlockParams,
    topology: Topology,
    sizer: SizeAdapter,
    left: Channel,
    right: Channel,
}

impl ReverbEngine {
    /// Allocate all buffers, zeroed, and activate with random dither seeds.
    pub fn new(sample_rate: f32) -> Self {
        let block = BlockParams::default();
        let mut engine = Self {
            sample_rate: sample_rate.max(1.0),
            params: ReverbParams::default(),
            topology: Topology::of(block.algorithm),
            block,
            sizer: SizeAdapter::new(),
            left: Channel::new(),
            right: Channel::new(),
        };
        engine.activate();
        engine
    }

    /// Like [`ReverbEngine::new`] but with fixed dither seeds (reproducible output).
    pub fn with_seeds(sample_rate: f32, seed_l: u32, seed_r: u32) -> Self {
        let mut engine = Self::new(sample_rate);
        engine.activate_seeded(seed_l, seed_r);
        engine
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    #[inline]
    pub fn params(&self) -> ReverbParams {
        self.params
    }

    /// New knob values; they take effect at the next [`ReverbEngine::prepare_block`].
    #[inline]
    pub fn set_params(&mut self, params: ReverbParams) {
        self.params = params;
    }

    /// Zero all delay state, rewind cursors, open the gates, reseed dither from the OS RNG.
    pub fn activate(&mut self) {
        let mut rng = rand::thread_rng();
        self.left.dither.reseed_with(|| rng.gen());
        self.right.dither.reseed_with(|| rng.gen());
        self.reset_state();
    }

    /// [`ReverbEngine::activate`] with caller-chosen dither seeds.
    pub fn activate_seeded(&mut self, seed_l: u32, seed_r: u32) {
        self.left.dither = Dither::from_seed(seed_l);
        self.right.dither = Dither::from_seed(seed_r);
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.left.reset();
        self.right.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            seed_l = self.left.dither.state(),
            seed_r = self.right.dither.state(),
            "reverb activated"
        );
    }

    /// Read the knobs once and advance the resize machine by one phase.
    pub fn prepare_block(&mut self) {
        self.block = BlockParams::from_params(&self.params);
        self.topology = Topology::of(self.block.algorithm);

        if self.block.gate_disabled() {
            self.left.peak.open();
            self.right.peak.open();
        }

        let ratio = self.block.room_ratio;
        if self.sizer.observe(ratio) {
            #[cfg(feature = "tracing")]
            tracing::trace!(ratio, "room size changed, staging line resize");
        }
        if let Some(line) = self.sizer.advance() {
            self.left.tank.resize_line(line, ratio);
            self.right.tank.resize_line(line, ratio);
            #[cfg(feature = "tracing")]
            {
                if self.sizer.state() == ResizeState::Idle {
                    tracing::trace!(ratio, "line resize complete");
                }
            }
        }
    }

    /// Process one stereo frame with the parameters of the current block.
    #[inline]
    pub fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        let l = self.left.process(left, &self.block, &self.topology);
        let r = self.right.process(right, &self.block, &self.topology);
        (l, r)
    }

    #[inline]
    pub fn block_params(&self) -> &BlockParams {
        &self.block
    }

    #[inline]
    pub fn resize_state(&self) -> ResizeState {
        self.sizer.state()
    }

    /// Current level of a channel's gate follower.
    pub fn peak(&self, side: Side) -> f64 {
        self.channel(side).peak.level()
    }

    /// Tank lines of one channel, A first.
    pub fn lines(&self, side: Side) -> &[TankLine] {
        self.channel(side).tank.lines()
    }

    fn channel(&self, side: Side) -> &Channel {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl StereoProcessor for ReverbEngine {
    fn activate(&mut self) {
        ReverbEngine::activate(self);
    }

    fn prepare_block(&mut self) {
        ReverbEngine::prepare_block(self);
    }

    #[inline]
    fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        ReverbEngine::process_frame(self, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Algorithm;
    use crate::tank::LINE_COUNT;

    #[test]
    fn first_block_starts_resize_at_line_a() {
        let mut e = ReverbEngine::with_seeds(44_100.0, 20_000, 30_000);
        e.set_params(ReverbParams::new(Algorithm::Chamber, 0.0, 0.0, 0.5));
        assert_eq!(e.resize_state(), ResizeState::Idle);
        e.prepare_block();
        assert_eq!(e.resize_state(), ResizeState::Resizing(25));
        assert!(e.lines(Side::Left)[0].len() < e.lines(Side::Left)[0].max_len());
        assert_eq!(e.lines(Side::Left)[0].len(), e.lines(Side::Right)[0].len());
        assert_eq!(e.lines(Side::Left)[1].len(), e.lines(Side::Left)[1].max_len());
    }

    #[test]
    fn resize_finishes_after_line_count_blocks() {
        let mut e = ReverbEngine::with_seeds(48_000.0, 20_000, 30_000);
        e.set_params(ReverbParams::new(Algorithm::Room, 0.1, 0.0, 0.5));
        for _ in 0..LINE_COUNT {
            e.prepare_block();
        }
        assert_eq!(e.resize_state(), ResizeState::Idle);
    }

    #[test]
    fn gate_reopens_when_gating_is_zero() {
        let mut e = ReverbEngine::with_seeds(44_100.0, 20_000, 30_000);
        e.set_params(ReverbParams::new(Algorithm::Chamber, 0.5, 1.0, 1.0));
        e.prepare_block();
        for _ in 0..20_000 {
            e.process_frame(0.0, 0.0);
        }
        assert!(e.peak(Side::Left) < 0.5);
        e.set_params(ReverbParams::new(Algorithm::Chamber, 0.5, 0.0, 1.0));
        e.prepare_block();
        assert_eq!(e.peak(Side::Left), 1.0);
        assert_eq!(e.peak(Side::Right), 1.0);
    }

    #[test]
    fn activate_rewinds_cursors() {
        let mut e = ReverbEngine::with_seeds(44_100.0, 20_000, 30_000);
        e.prepare_block();
        for _ in 0..1000 {
            e.process_frame(0.3, -0.3);
        }
        e.activate();
        for line in e.lines(Side::Left) {
            assert_eq!(line.index(crate::tank::Stage::First), 1);
            assert_eq!(line.index(crate::tank::Stage::Second), 1);
        }
        assert_eq!(e.peak(Side::Left), 1.0);
    }

    #[test]
    fn room_reinjects_the_raw_dry_sample() {
        let mut e = ReverbEngine::with_seeds(44_100.0, 20_000, 30_000);
        e.set_params(ReverbParams::new(Algorithm::Room, 0.5, 0.0, 0.5));
        e.prepare_block();
        let (l, _) = e.process_frame(0.5, 0.0);
        // tank = 0.5·φ·24.5/28, unconsoled with gain 0.75, blended half and half
        assert!((f64::from(l) - 0.406_037_80).abs() < 1e-6, "l={}", l);
    }

    #[test]
    fn random_seeds_respect_floor() {
        let e = ReverbEngine::new(44_100.0);
        assert!(e.left.dither.state() >= pocketverbs_core::dither::MIN_SEED);
        assert!(e.right.dither.state() >= pocketverbs_core::dither::MIN_SEED);
    }
}
