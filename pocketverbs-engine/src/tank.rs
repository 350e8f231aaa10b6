//! The reverb tank: 26 tuned lines (A..Z), each with two allpass stages.
//!
//! Design
//! - Lines are plain data driven by [`MAX_LENGTHS`]; the topology decides how
//!   they are chained (see [`crate::topology`]).
//! - A line's active length is shared by both of its stages and only changes
//!   through [`Tank::resize_line`], driven by the size-adaptation machine.
//! - All buffers are allocated in [`Tank::new`]; processing never allocates.

use pocketverbs_core::allpass::AllpassStage;

use crate::params::BlockParams;
use crate::resize::prime_biased_length;
use crate::topology::Topology;

pub const LINE_COUNT: usize = 26;

/// Longest length (samples) of each line, A first.
pub const MAX_LENGTHS: [usize; LINE_COUNT] = [
    15149, 14617, 14357, 13421, 13061, 12557, 12329, 11675, 11339, 10877, 10415, 10205, 9767,
    9488, 9059, 8627, 8447, 7787, 7421, 7217, 6905, 6419, 6005, 5447, 5243, 4961,
];

/// Samples of history kept per stage for the moving averages.
const TAPS_PER_STAGE: usize = 3;

/// Room divides its weighted sum by `ROOM_BASE_DIVISOR + ROOM_WET_DIVISOR * wet`.
const ROOM_BASE_DIVISOR: f64 = 26.0;
const ROOM_WET_DIVISOR: f64 = 4.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    First = 0,
    Second = 1,
}

/// One tank line: two allpass stages sharing an active length, plus tap history.
#[derive(Clone, Debug)]
pub struct TankLine {
    max_len: usize,
    len: usize,
    stages: [AllpassStage; 2],
    // newest first
    taps: [[f64; TAPS_PER_STAGE]; 2],
}

impl TankLine {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            len: max_len,
            stages: [AllpassStage::new(max_len), AllpassStage::new(max_len)],
            taps: [[0.0; TAPS_PER_STAGE]; 2],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Cursor of one stage's ring buffer.
    #[inline]
    pub fn index(&self, stage: Stage) -> usize {
        self.stages[stage as usize].index()
    }

    /// Tap `age` samples old (0 = newest) from one stage's history.
    #[inline]
    pub fn tap(&self, stage: Stage, age: usize) -> f64 {
        self.taps[stage as usize][age]
    }

    fn reset(&mut self) {
        for s in &mut self.stages {
            s.reset();
        }
        self.taps = [[0.0; TAPS_PER_STAGE]; 2];
    }

    fn resize(&mut self, ratio: f64) {
        self.len = prime_biased_length(self.max_len, ratio);
        for s in &mut self.stages {
            s.clear_tail(self.len);
        }
    }

    /// Allpass one stage and record the output in that stage's history.
    #[inline]
    fn run(&mut self, stage: Stage, x: f64) -> f64 {
        let y = self.stages[stage as usize].process(x, self.len);
        let h = &mut self.taps[stage as usize];
        h[2] = h[1];
        h[1] = h[0];
        h[0] = y;
        y
    }

    /// Moving average of `lead` with this stage's previous tap and, for a
    /// 3-tap window, `oldest` (normally this stage's own oldest tap).
    #[inline]
    fn smooth(&self, stage: Stage, lead: f64, oldest: f64, window: usize) -> f64 {
        let h = &self.taps[stage as usize];
        if window >= 3 {
            (lead + h[1] + oldest) / 3.0
        } else {
            (lead + h[1]) / 2.0
        }
    }
}

/// All 26 lines of one channel.
#[derive(Clone, Debug)]
pub struct Tank {
    lines: Vec<TankLine>,
}

impl Default for Tank {
    fn default() -> Self {
        Self::new()
    }
}

impl Tank {
    pub fn new() -> Self {
        Self { lines: MAX_LENGTHS.iter().map(|&n| TankLine::new(n)).collect() }
    }

    /// Zero every buffer and tap, rewind every cursor. Lengths are kept.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
    }

    pub fn lines(&self) -> &[TankLine] {
        &self.lines
    }

    /// Recompute one line's length for `ratio` and clear the exposed buffer tails.
    pub fn resize_line(&mut self, line: usize, ratio: f64) {
        self.lines[line].resize(ratio);
    }

    /// Run one sample through the tank. The serial walks take the console-driven
    /// sample; Room re-injects the raw dry sample into every line.
    #[inline]
    pub fn process(
        &mut self,
        driven: f64,
        dry: f64,
        topology: &Topology,
        block: &BlockParams,
    ) -> f64 {
        if topology.parallel {
            self.process_parallel(dry, block)
        } else {
            self.process_serial(driven, topology)
        }
    }

    fn process_serial(&mut self, input: f64, topology: &Topology) -> f64 {
        let mut x = input;
        let walk = [(Stage::First, topology.first_lead), (Stage::Second, topology.second_lead)];
        for (stage, lead) in walk {
            for i in 0..LINE_COUNT {
                self.lines[i].run(stage, x);
                let lead_tap = self.lines[lead.source(i)].tap(stage, 0);
                // Z has not run yet this sample, so its history is one sample behind.
                let oldest = if topology.feedback && stage == Stage::First && i == 0 {
                    self.lines[LINE_COUNT - 1].tap(Stage::First, 2)
                } else {
                    self.lines[i].tap(stage, 2)
                };
                x = self.lines[i].smooth(stage, lead_tap, oldest, topology.window);
            }
        }
        x
    }

    fn process_parallel(&mut self, dry: f64, block: &BlockParams) -> f64 {
        let mut sum = 0.0;
        for (i, line) in self.lines.iter_mut().enumerate() {
            // output unused; runs only so stage 1's delay memory keeps aging
            line.run(Stage::First, dry);
            let y = line.run(Stage::Second, dry);
            let weight = match i {
                1 | 2 => block.dry,
                i if i == LINE_COUNT - 1 => block.wet,
                _ => 1.0,
            };
            sum += y * weight;
        }
        sum / (ROOM_BASE_DIVISOR + ROOM_WET_DIVISOR * block.wet)
    }
}
