//! Ikeda unfolding: a gated bank of power-of-two oscillators.
//!
//! `6 + round(10 * chaos)` sines sit at octave-quantised frequencies. A
//! 32-bit shift register (taps 0, 1, 21, 31) steps once per gate period and
//! bank `b` sounds while bit `b % 31` is set. Banks alternate polarity
//! between channels with weight `1 / (1 + 0.35 b)`. A square macro envelope
//! ducks every other macro period and a saturated tap of the micro-burst is
//! layered in anti-phase.

use unfoldings_core::{Lfsr32, SampleBuffer, TWO_PI, limit};

use super::UnfoldContext;
use crate::params::nominal_len;

const LFSR_TAPS: [u32; 4] = [0, 1, 21, 31];
const LFSR_SALT: u32 = 0x7F4A_7C15;

/// Oscillator frequencies for a chaos and warp setting at `rate`.
///
/// Below about 42 Hz the ceiling crosses the 20 Hz floor and banks above the
/// floor sit at the ceiling.
pub fn bank_frequencies(rate: f64, chaos: f32, warp: f32) -> Vec<f32> {
    let c = chaos.clamp(0.0, 1.0);
    let banks = 6 + (10.0 * c).round() as usize;
    let warp = warp.clamp(0.5, 6.0);
    let ceiling = (0.48 * rate) as f32;
    (0..banks)
        .map(|b| {
            let step = 40.0 + 220.0 * b as f32;
            let quant = 2.0f32.powf((step * warp).log2().floor());
            limit(20.0, ceiling, quant)
        })
        .collect()
}

/// Renders the ikeda mode. Output is exactly the nominal length.
pub fn unfold_ikeda(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    let p = ctx.params;
    let out_samples = nominal_len(ctx.out_rate, ctx.out_seconds());
    let mut out = SampleBuffer::stereo(out_samples);

    let mono = ctx.micro.to_mono();
    let tap_src = mono.channel(0);
    let micro_n = tap_src.len().max(1);
    let c = p.spectral_chaos.clamp(0.0, 1.0);
    let rate = ctx.out_rate as f32;

    let freq = bank_frequencies(ctx.out_rate, c, p.warp);
    let weight: Vec<f32> = (0..freq.len()).map(|b| 1.0 / (1.0 + b as f32 * 0.35)).collect();
    let mut phase = vec![0.0f32; freq.len()];
    let mut lfsr = Lfsr32::new((p.seed as u32) ^ LFSR_SALT, LFSR_TAPS);

    let gate_period =
        ((ctx.out_rate * (0.0009 + 0.006 * f64::from(1.0 - c))).round() as i64).max(2) as usize;
    let macro_len = ((ctx.out_rate * (0.03 + 0.18 * f64::from(p.stretch / 100.0))).round() as i64)
        .max(8) as usize;
    let tap_step = 5 + p.seed.rem_euclid(13) as usize;
    let ducked = 0.14 + 0.22 * c;
    let drive = 8.0 + 18.0 * c;
    let level = 0.05 + 0.35 * c;

    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for i in 0..out_samples {
        if i % gate_period == 0 {
            lfsr.step();
        }

        let mut l = 0.0;
        let mut r = 0.0;
        for b in 0..freq.len() {
            phase[b] += TWO_PI * freq[b] / rate;
            let s = if lfsr.bit((b % 31) as u32) {
                phase[b].sin()
            } else {
                0.0
            };
            let polarized = if b % 2 == 0 { s } else { -s };
            l += s * weight[b];
            r += polarized * weight[b];
        }

        let macro_env = if (i / macro_len) % 2 == 0 { 1.0 } else { ducked };
        let tap = tap_src.get((i * tap_step) % micro_n).copied().unwrap_or(0.0);
        let data = (tap * drive).tanh();
        let amp = macro_env * level;

        left[i] = (l * amp + data * 0.08).tanh();
        right[i] = (r * amp - data * 0.08).tanh();
    }

    out
}
