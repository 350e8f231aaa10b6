//! Real-time playback through cpal. Every device callback is one processing block.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Args;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use pocketverbs_engine::{StereoProcessor, Transport};

use super::common::ReverbArgs;
use super::render::tail_frames;
use crate::audio::{read_stereo, StereoBuffer};

/// Largest block handed to the engine; longer callbacks are split.
const MAX_BLOCK: usize = 8192;

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Input WAV file (mono or stereo)
    pub input: PathBuf,

    /// Output device name (default device if omitted)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Seconds of silence played after the file so the reverb can ring out
    #[arg(short, long, default_value = "2")]
    pub tail: f32,

    #[command(flatten)]
    pub reverb: ReverbArgs,
}

/// Pulls source frames, runs them through the processor and interleaves the result.
pub struct Feeder<P: StereoProcessor> {
    transport: Transport<P>,
    source: StereoBuffer,
    pos: usize,
    scratch_l: Vec<f32>,
    scratch_r: Vec<f32>,
    done: Arc<AtomicBool>,
}

impl<P: StereoProcessor> Feeder<P> {
    pub fn new(transport: Transport<P>, source: StereoBuffer, done: Arc<AtomicBool>) -> Self {
        Self {
            transport,
            source,
            pos: 0,
            scratch_l: vec![0.0; MAX_BLOCK],
            scratch_r: vec![0.0; MAX_BLOCK],
            done,
        }
    }

    /// Fill one interleaved device buffer of `channels` channels.
    pub fn fill<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: cpal::Sample + cpal::FromSample<f32>,
    {
        let channels = channels.max(1);
        for chunk in output.chunks_mut(channels * MAX_BLOCK) {
            let frames = chunk.len() / channels;
            let (l, r) = (&mut self.scratch_l[..frames], &mut self.scratch_r[..frames]);
            for i in 0..frames {
                let n = self.pos + i;
                l[i] = self.source.left.get(n).copied().unwrap_or(0.0);
                r[i] = self.source.right.get(n).copied().unwrap_or(0.0);
            }
            self.transport.run_in_place(l, r);
            self.pos += frames;

            let mut interleaved = chunk.chunks_exact_mut(channels);
            for (i, frame) in interleaved.by_ref().enumerate() {
                if channels == 1 {
                    frame[0] = T::from_sample((0.5 * (l[i] + r[i])).clamp(-1.0, 1.0));
                    continue;
                }
                for (c, out) in frame.iter_mut().enumerate() {
                    let s = match c {
                        0 => l[i],
                        1 => r[i],
                        _ => 0.0,
                    };
                    *out = T::from_sample(s.clamp(-1.0, 1.0));
                }
            }
            // partial trailing frame
            for out in interleaved.into_remainder() {
                *out = T::from_sample(0.0_f32);
            }
        }
        if self.pos >= self.source.frames() {
            self.done.store(true, Ordering::Release);
        }
    }
}

fn pick_device(name: Option<&str>) -> anyhow::Result<cpal::Device> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices().context("enumerating output devices")? {
            if d.name().map(|n| n == name).unwrap_or(false) {
                return Ok(d);
            }
        }
        return Err(anyhow!("requested device not found: {name}"));
    }
    host.default_output_device().ok_or_else(|| anyhow!("no default output device"))
}

fn build_stream<T, P>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut feeder: Feeder<P>,
) -> anyhow::Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
    P: StereoProcessor + Send + 'static,
{
    let channels = usize::from(cfg.channels);
    let err_fn = |e: cpal::StreamError| tracing::warn!(error = %e, "stream error");
    let stream = device
        .build_output_stream(
            cfg,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| feeder.fill(output, channels),
            err_fn,
            None,
        )
        .context("building output stream")?;
    Ok(stream)
}

pub fn run(args: &PlayArgs) -> anyhow::Result<()> {
    let mut source = read_stereo(&args.input)?;
    source.pad(tail_frames(args.tail, source.sample_rate));

    let device = pick_device(args.device.as_deref())?;
    let supported = device.default_output_config().context("querying output config")?;
    let sample_format = supported.sample_format();
    let cfg: cpal::StreamConfig = supported.config();

    if cfg.sample_rate.0 != source.sample_rate {
        tracing::warn!(
            file = source.sample_rate,
            device = cfg.sample_rate.0,
            "sample rates differ; playing without resampling"
        );
    }
    tracing::info!(
        device = %device.name().unwrap_or_else(|_| "<unknown>".into()),
        sample_rate = cfg.sample_rate.0,
        channels = cfg.channels,
        format = ?sample_format,
        "output stream"
    );

    #[allow(clippy::cast_precision_loss)]
    let sr = cfg.sample_rate.0 as f32;
    let engine = args.reverb.build_engine(sr)?;
    let done = Arc::new(AtomicBool::new(false));
    let feeder = Feeder::new(Transport::new(engine, sr), source, Arc::clone(&done));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32, _>(&device, &cfg, feeder)?,
        cpal::SampleFormat::I16 => build_stream::<i16, _>(&device, &cfg, feeder)?,
        cpal::SampleFormat::U16 => build_stream::<u16, _>(&device, &cfg, feeder)?,
        other => return Err(anyhow!("unsupported device sample format: {other:?}")),
    };
    stream.play().context("starting stream")?;

    while !done.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(50));
    }
    // let the last buffer drain
    std::thread::sleep(Duration::from_millis(200));
    tracing::info!("playback finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scales left by 2, right by -1.
    struct Gain;

    impl StereoProcessor for Gain {
        fn activate(&mut self) {}
        fn prepare_block(&mut self) {}
        fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
            (left * 2.0, -right)
        }
    }

    fn feeder(frames: usize) -> (Feeder<Gain>, Arc<AtomicBool>) {
        let source = StereoBuffer {
            left: vec![0.25; frames],
            right: vec![0.5; frames],
            sample_rate: 48_000,
        };
        let done = Arc::new(AtomicBool::new(false));
        (Feeder::new(Transport::new(Gain, 48_000.0), source, Arc::clone(&done)), done)
    }

    #[test]
    fn interleaves_stereo_and_silences_extra_channels() {
        let (mut f, _) = feeder(16);
        let mut out = vec![9.0_f32; 4 * 3];
        f.fill(&mut out, 3);
        assert_eq!(&out[..6], &[0.5, -0.5, 0.0, 0.5, -0.5, 0.0]);
        assert_eq!(f.pos, 4);
    }

    #[test]
    fn mono_device_gets_the_average() {
        let (mut f, _) = feeder(16);
        let mut out = vec![0.0_f32; 2];
        f.fill(&mut out, 1);
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn signals_done_and_pads_with_silence() {
        let (mut f, done) = feeder(3);
        let mut out = vec![1.0_f32; 8];
        f.fill(&mut out, 2);
        assert!(done.load(Ordering::Acquire));
        assert_eq!(&out[6..], &[0.0, 0.0]);
    }

    #[test]
    fn partial_trailing_frame_is_silenced() {
        let (mut f, _) = feeder(16);
        let mut out = vec![9.0_f32; 7];
        f.fill(&mut out, 2);
        assert_eq!(&out[..6], &[0.5, -0.5, 0.5, -0.5, 0.5, -0.5]);
        assert_eq!(out[6], 0.0);
        assert_eq!(f.pos, 3);
    }

    #[test]
    fn long_callbacks_are_split_into_blocks() {
        let (mut f, _) = feeder(MAX_BLOCK * 3);
        let mut out = vec![0.0_f32; 2 * (MAX_BLOCK + 10)];
        f.fill(&mut out, 2);
        assert_eq!(f.transport.blocks(), 2);
        assert_eq!(f.pos, MAX_BLOCK + 10);
    }
}
