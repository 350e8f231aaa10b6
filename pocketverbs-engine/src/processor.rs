//! Block-processing contract shared by the host adapters.
//!
//! This module defines the `StereoProcessor` trait and a lightweight
//! `Transport<P>` wrapper that owns a processor and counts the frames and
//! blocks that went through it.
//!
//! Design goals
//! - No dynamic allocations in the audio thread
//! - Parameters are read once per block (`prepare_block`), samples are pulled
//!   one frame at a time, so callers that only have raw pointers (possibly
//!   aliased in/out buffers) can drive it without building slices
//! - Generic over the processor type, so front ends avoid trait objects

/// Anything that turns stereo input frames into stereo output frames, block by block.
pub trait StereoProcessor {
    /// Zero all state; called before the first block and on transport restarts.
    fn activate(&mut self);

    /// Read parameters and advance per-block state. Call once before each block's frames.
    fn prepare_block(&mut self);

    /// Process one frame with the parameters captured by the last `prepare_block`.
    fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32);

    /// One full block from separate input and output buffers.
    /// Processes the shortest of the four lengths and returns it.
    fn process_block(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) -> usize {
        let frames = in_l.len().min(in_r.len()).min(out_l.len()).min(out_r.len());
        self.prepare_block();
        for i in 0..frames {
            let (l, r) = self.process_frame(in_l[i], in_r[i]);
            out_l[i] = l;
            out_r[i] = r;
        }
        frames
    }

    /// One full block, overwriting the inputs with the outputs.
    fn process_in_place(&mut self, left: &mut [f32], right: &mut [f32]) -> usize {
        let frames = left.len().min(right.len());
        self.prepare_block();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (ol, or) = self.process_frame(*l, *r);
            *l = ol;
            *r = or;
        }
        frames
    }
}

/// Owns a processor and keeps a running count of what it has processed.
pub struct Transport<P: StereoProcessor> {
    sample_rate: f32,
    frames: u64,
    blocks: u64,
    processor: P,
}

impl<P: StereoProcessor> Transport<P> {
    /// Wrap a ready-to-run processor. State is left as is, so seeded
    /// processors stay reproducible.
    pub fn new(processor: P, sample_rate: f32) -> Self {
        Self { sample_rate: sample_rate.max(1.0), frames: 0, blocks: 0, processor }
    }

    /// Process one in-place block and update the counters.
    #[inline]
    pub fn run_in_place(&mut self, left: &mut [f32], right: &mut [f32]) -> usize {
        let n = self.processor.process_in_place(left, right);
        self.frames += n as u64;
        self.blocks += 1;
        n
    }

    /// Restart from silence.
    pub fn restart(&mut self) {
        self.processor.activate();
        self.frames = 0;
        self.blocks = 0;
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Processed time in seconds.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn seconds(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    #[inline]
    pub fn processor(&self) -> &P {
        &self.processor
    }
}
