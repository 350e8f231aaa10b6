//! Reverb flags shared by `render` and `play`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pocketverbs_engine::{Algorithm, Preset, ReverbEngine, ReverbParams};

/// Right-channel seed offset for `--seed`, so the two dithers are not in lockstep.
const RIGHT_SEED_OFFSET: u32 = 0x9E37_79B9;

#[derive(Args, Debug, Clone, Default)]
pub struct ReverbArgs {
    /// Algorithm: chamber, spring, tiled, room, stretch or zarathustra
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// Room size (0-1)
    #[arg(long)]
    pub size: Option<f32>,

    /// Gate release amount (0-1, 0 disables the gate)
    #[arg(long)]
    pub gating: Option<f32>,

    /// Dry/wet mix (0-1)
    #[arg(short, long)]
    pub mix: Option<f32>,

    /// Fixed dither seed for reproducible output
    #[arg(long)]
    pub seed: Option<u32>,

    /// TOML preset; flags given alongside it take precedence
    #[arg(short, long)]
    pub preset: Option<PathBuf>,
}

impl ReverbArgs {
    /// Preset (if any) overlaid with explicit flags, clamped to 0..1.
    pub fn params(&self) -> anyhow::Result<ReverbParams> {
        let base = match &self.preset {
            Some(path) => Preset::load(path)
                .with_context(|| format!("loading preset {}", path.display()))?
                .params(),
            None => ReverbParams::default(),
        };
        let mut params = base;
        if let Some(a) = self.algorithm {
            params = params.with_algorithm(a);
        }
        if let Some(v) = self.size {
            params.size = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.gating {
            params.gating = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.mix {
            params.mix = v.clamp(0.0, 1.0);
        }
        Ok(params)
    }

    /// An engine configured from these flags.
    pub fn build_engine(&self, sample_rate: f32) -> anyhow::Result<ReverbEngine> {
        let params = self.params()?;
        let mut engine = match self.seed {
            Some(seed) => {
                ReverbEngine::with_seeds(sample_rate, seed, seed.wrapping_add(RIGHT_SEED_OFFSET))
            }
            None => ReverbEngine::new(sample_rate),
        };
        engine.set_params(params);
        tracing::info!(
            algorithm = %params.selected(),
            size = params.size,
            gating = params.gating,
            mix = params.mix,
            seeded = self.seed.is_some(),
            "reverb configured"
        );
        Ok(engine)
    }
}
