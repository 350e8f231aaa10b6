//! Property-based tests for the engine.
//!
//! Random knob automation and random input must never break the delay-line
//! cursor invariants or push the output out of range.

use pocketverbs_engine::resize::{has_small_divisor, prime_biased_length};
use pocketverbs_engine::tank::Stage;
use pocketverbs_engine::{ReverbEngine, ReverbParams, Side, StereoProcessor, MAX_LENGTHS};
use proptest::prelude::*;

fn knobs() -> impl Strategy<Value = ReverbParams> {
    (-1.0f32..7.0, 0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
        .prop_map(|(algorithm, size, gating, mix)| ReverbParams { algorithm, size, gating, mix })
}

/// Deterministic pseudo-noise in [-1, 1].
fn noise(seed: u32, len: usize) -> Vec<f32> {
    let mut s = seed.max(1);
    (0..len)
        .map(|_| {
            s ^= s << 13;
            s ^= s >> 17;
            s ^= s << 5;
            (s as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// After every block, for every line and stage: 0 < len <= max and cursor <= len.
    #[test]
    fn cursors_stay_inside_active_length(
        automation in prop::collection::vec(knobs(), 1..40),
        block in 1usize..300,
        seed in any::<u32>(),
    ) {
        let mut e = ReverbEngine::with_seeds(48_000.0, 20_000, 40_000);
        let input = noise(seed, block);
        for params in automation {
            e.set_params(params);
            let (mut l, mut r) = (input.clone(), input.clone());
            e.process_in_place(&mut l, &mut r);
            for side in [Side::Left, Side::Right] {
                for (i, line) in e.lines(side).iter().enumerate() {
                    prop_assert!(line.len() > 0 && line.len() <= MAX_LENGTHS[i]);
                    prop_assert!(line.index(Stage::First) <= line.len());
                    prop_assert!(line.index(Stage::Second) <= line.len());
                }
            }
        }
    }

    /// Full-scale noise in, finite and bounded samples out, for every algorithm.
    #[test]
    fn output_is_finite_and_bounded(
        params in knobs(),
        seed in any::<u32>(),
    ) {
        let mut e = ReverbEngine::with_seeds(44_100.0, 30_000, 50_000);
        e.set_params(params);
        let input = noise(seed, 16_384);
        for chunk in input.chunks(256) {
            let (mut l, mut r) = (chunk.to_vec(), chunk.iter().map(|x| -x).collect::<Vec<_>>());
            e.process_in_place(&mut l, &mut r);
            for y in l.iter().chain(r.iter()) {
                prop_assert!(y.is_finite());
                prop_assert!(y.abs() <= 4.0, "{:?} gave {}", params, y);
            }
        }
    }

    /// Peak followers never leave [0, 1].
    #[test]
    fn gate_level_stays_in_unit_range(params in knobs(), seed in any::<u32>()) {
        let mut e = ReverbEngine::with_seeds(44_100.0, 30_000, 50_000);
        e.set_params(params);
        let input = noise(seed, 4096);
        for chunk in input.chunks(128) {
            let (mut l, mut r) = (chunk.to_vec(), vec![0.0; chunk.len()]);
            e.process_in_place(&mut l, &mut r);
            for side in [Side::Left, Side::Right] {
                let p = e.peak(side);
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }
}

#[test]
fn prime_biased_lengths_for_every_knob_step() {
    for step in 0..=1000 {
        let size = f64::from(step) / 1000.0;
        let ratio = pocketverbs_engine::params::room_ratio(size);
        for &max in &MAX_LENGTHS {
            let len = prime_biased_length(max, ratio);
            assert!(len >= 1 && len <= max);
            assert!(len == max || !has_small_divisor(len), "{} at ratio {}", len, ratio);
        }
    }
}
