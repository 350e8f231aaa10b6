//! Offline rendering: WAV in, reverberated 32-bit float stereo WAV out.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use pocketverbs_engine::{StereoProcessor, Transport};

use super::common::ReverbArgs;
use crate::audio::{read_stereo, write_stereo, StereoBuffer};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input WAV file (mono or stereo)
    pub input: PathBuf,

    /// Output WAV file
    pub output: PathBuf,

    /// Frames per processing block
    #[arg(short, long, default_value = "512", value_parser = clap::value_parser!(u32).range(1..))]
    pub block_size: u32,

    /// Seconds of silence appended so the reverb can ring out
    #[arg(short, long, default_value = "0")]
    pub tail: f32,

    #[command(flatten)]
    pub reverb: ReverbArgs,
}

/// Frames of tail for `seconds` at `sample_rate`; negative or NaN gives none.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tail_frames(seconds: f32, sample_rate: u32) -> usize {
    (f64::from(seconds.max(0.0)) * f64::from(sample_rate)).round() as usize
}

/// Process `audio` in place, `block` frames at a time.
pub fn process_in_blocks<P: StereoProcessor>(
    transport: &mut Transport<P>,
    audio: &mut StereoBuffer,
    block: usize,
) {
    let block = block.max(1);
    for (l, r) in audio.left.chunks_mut(block).zip(audio.right.chunks_mut(block)) {
        transport.run_in_place(l, r);
    }
}

pub fn run(args: &RenderArgs) -> anyhow::Result<()> {
    let mut audio = read_stereo(&args.input)?;
    audio.pad(tail_frames(args.tail, audio.sample_rate));

    #[allow(clippy::cast_precision_loss)]
    let engine = args.reverb.build_engine(audio.sample_rate as f32)?;
    #[allow(clippy::cast_precision_loss)]
    let mut transport = Transport::new(engine, audio.sample_rate as f32);

    let started = Instant::now();
    process_in_blocks(&mut transport, &mut audio, args.block_size as usize);
    let elapsed = started.elapsed().as_secs_f64();

    write_stereo(&args.output, &audio)?;
    tracing::info!(
        output = %args.output.display(),
        blocks = transport.blocks(),
        audio_seconds = transport.seconds(),
        realtime_factor = transport.seconds() / elapsed.max(1e-9),
        "render finished"
    );
    Ok(())
}
