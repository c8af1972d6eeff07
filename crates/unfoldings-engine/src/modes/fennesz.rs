//! Fennesz unfolding: spectral and granular layers over a slightly
//! mistuned drone, fed through a two-tap cross-feedback delay.
//!
//! ```text
//! x[i]  = 0.46 spectral + 0.36 granular + env * (0.2 drone +/- hiss)
//! dL[i] = tanh(xL + (0.34 dL[i-d1] + 0.21 dR[i-d2]) * (0.35 + 0.28 mix))
//! out   = 0.76 d
//! ```

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, TapDelay, raised_cosine};

use super::granular::{GranularParams, unfold_granular};
use super::spectral::{SpectralParams, unfold_spectral};
use super::{UnfoldContext, offset_seed, sample_or_zero};

/// Seed offset of the spectral layer.
pub const SPECTRAL_SEED_OFFSET: i32 = 1001;
/// Seed offset of the granular layer.
pub const GRANULAR_SEED_OFFSET: i32 = 2002;
/// Seed offset of the drone tuning and hiss generator.
pub const DRONE_SEED_OFFSET: i32 = 3003;

/// Drone partial ratios over the root.
const CHORD_RATIOS: [f32; 3] = [1.0, 1.4983, 2.2449];
const CHORD_GAINS: [f32; 3] = [0.35, 0.22, 0.18];

/// Feedback tap lengths in samples for a rate and chaos amount.
pub fn feedback_taps(rate: f64, chaos: f32) -> (usize, usize) {
    let c = f64::from(chaos);
    let d1 = ((rate * (0.033 + 0.021 * c)).round() as i64).max(1);
    let d2 = ((rate * (0.071 + 0.029 * c)).round() as i64).max(1);
    (d1 as usize, d2 as usize)
}

/// Renders the fennesz mode.
pub fn unfold_fennesz(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    let p = ctx.params;
    let chaos = p.spectral_chaos;
    let mix = p.hybrid_mix;

    let spectral = unfold_spectral(
        ctx.micro,
        &SpectralParams {
            stretch: (p.stretch * 1.25).clamp(8.0, 120.0),
            warp: (p.warp * 0.9).clamp(0.8, 6.2),
            chaos: (chaos * 0.75 + 0.15).clamp(0.1, 0.95),
            seed: offset_seed(p.seed, SPECTRAL_SEED_OFFSET),
            ..ctx.spectral_params()
        },
    );
    let granular = unfold_granular(
        ctx.micro,
        &GranularParams {
            grain_ms: (52.0 + 90.0 * mix).clamp(18.0, 220.0),
            overlap: (5.0 + 8.0 * mix).clamp(2.0, 18.0),
            seed: offset_seed(p.seed, GRANULAR_SEED_OFFSET),
            ..ctx.granular_params()
        },
    );

    let out_samples = spectral.len().max(granular.len());
    let mut out = SampleBuffer::stereo(out_samples);
    let mut rng = SeedRandom::new(i64::from(offset_seed(p.seed, DRONE_SEED_OFFSET)));

    let root = 110.0 * (1.0 + 0.08 * (rng.next_float() - 0.5));
    let chord = CHORD_RATIOS.map(|r| root * r);
    let mut phases = [0.0f32; 3];

    let (d1, d2) = feedback_taps(ctx.out_rate, chaos);
    let mut line_l = TapDelay::new(d1.max(d2));
    let mut line_r = TapDelay::new(d1.max(d2));
    let feedback = 0.35 + 0.28 * mix;
    let rate = ctx.out_rate as f32;
    let denom = out_samples.saturating_sub(1).max(1) as f32;

    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for i in 0..out_samples {
        let t = i as f32 / denom;
        let env = 0.25 + 0.75 * raised_cosine(t).powf(0.55);
        let flutter = 1.0 + 0.008 * (TWO_PI * (0.11 * t + 0.03 * chaos)).sin();

        let mut drone = 0.0;
        for ((phase, freq), gain) in phases.iter_mut().zip(chord).zip(CHORD_GAINS) {
            *phase += TWO_PI * (freq * flutter) / rate;
            drone += gain * phase.sin();
        }
        let hiss = rng.next_bipolar() * (0.01 + 0.05 * chaos);

        let x_l = 0.46 * sample_or_zero(&spectral, 0, i)
            + 0.36 * sample_or_zero(&granular, 0, i)
            + env * (0.20 * drone + hiss);
        let x_r = 0.46 * sample_or_zero(&spectral, 1, i)
            + 0.36 * sample_or_zero(&granular, 1, i)
            + env * (0.20 * drone - hiss);

        let fb_l = line_l.tap(d1) * 0.34 + line_r.tap(d2) * 0.21;
        let fb_r = line_r.tap(d1) * 0.34 + line_l.tap(d2) * 0.21;
        let y_l = (x_l + fb_l * feedback).tanh();
        let y_r = (x_r + fb_r * feedback).tanh();
        line_l.write(y_l);
        line_r.write(y_r);

        left[i] = y_l * 0.76;
        right[i] = y_r * 0.76;
    }

    out
}
