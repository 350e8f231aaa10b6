//! WAV input/output for the renderer and player.

use std::path::Path;

use anyhow::{bail, Context};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Deinterleaved stereo audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl StereoBuffer {
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    /// Append `frames` frames of silence.
    pub fn pad(&mut self, frames: usize) {
        self.left.resize(self.left.len() + frames, 0.0);
        self.right.resize(self.right.len() + frames, 0.0);
    }
}

/// Read a mono or stereo WAV. Mono is duplicated to both channels.
pub fn read_stereo(path: &Path) -> anyhow::Result<StereoBuffer> {
    let reader = WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 || channels > 2 {
        bail!("{}: {} channels not supported (mono or stereo only)", path.display(), channels);
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("decoding {}", path.display()))?,
        SampleFormat::Int => {
            #[allow(clippy::cast_precision_loss)]
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("decoding {}", path.display()))?
        }
    };

    let (left, right) = if channels == 1 {
        (samples.clone(), samples)
    } else {
        samples.chunks_exact(2).map(|f| (f[0], f[1])).unzip()
    };

    tracing::info!(
        path = %path.display(),
        channels,
        sample_rate = spec.sample_rate,
        frames = left.len(),
        "input loaded"
    );
    Ok(StereoBuffer { left, right, sample_rate: spec.sample_rate })
}

/// Write a 32-bit float stereo WAV.
pub fn write_stereo(path: &Path, audio: &StereoBuffer) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    for (l, r) in audio.left.iter().zip(&audio.right) {
        writer.write_sample(*l)?;
        writer.write_sample(*r)?;
    }
    writer.finalize().with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, frames: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut w = WavWriter::create(path, spec).unwrap();
        for &s in frames {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn mono_is_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, &[0, 16_384, -16_384]);
        let a = read_stereo(&path).unwrap();
        assert_eq!(a.sample_rate, 22_050);
        assert_eq!(a.left, vec![0.0, 0.5, -0.5]);
        assert_eq!(a.left, a.right);
    }

    #[test]
    fn stereo_is_deinterleaved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16_384, -16_384, 0, 8_192]);
        let a = read_stereo(&path).unwrap();
        assert_eq!(a.left, vec![0.5, 0.0]);
        assert_eq!(a.right, vec![-0.5, 0.25]);
    }

    #[test]
    fn more_than_two_channels_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        write_wav(&path, 4, &[0; 8]);
        let err = read_stereo(&path).unwrap_err();
        assert!(err.to_string().contains("4 channels"));
    }

    #[test]
    fn float_output_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = StereoBuffer { left: vec![0.1, -0.2], right: vec![0.3, 0.4], sample_rate: 48_000 };
        write_stereo(&path, &audio).unwrap();
        let back = read_stereo(&path).unwrap();
        assert_eq!(back, audio);
    }
}
