//! Noto unfolding: LFSR-gated clicks, bursts and a hopping sine.
//!
//! A 32-bit shift register (taps 0, 2, 3, 5) steps once per grid cell. Bit 2
//! gates a fast-decaying noise click, bit 9 a slower burst carrying a sine
//! whose pitch hops with bits 16..19 plus a saturated tap of the micro-burst.
//! Every few cells a sparse noise tick is added. The click and tick are
//! polarity-inverted between channels; the burst body is shared.

use unfoldings_core::{Lfsr32, SampleBuffer, SeedRandom, TWO_PI};

use super::{UnfoldContext, offset_seed};
use crate::params::nominal_len;

/// Generator offset from the user seed.
pub const SEED_OFFSET: i32 = 4004;
const LFSR_TAPS: [u32; 4] = [0, 2, 3, 5];
const LFSR_SALT: u32 = 0xA536_6B4D;

/// Grid cell length in samples.
pub fn grid_len(rate: f64, chaos: f32) -> usize {
    let c = f64::from(chaos.clamp(0.0, 1.0));
    ((rate * (0.007 + 0.018 * (1.0 - c))).round() as i64).max(12) as usize
}

/// Renders the noto mode. Output is exactly the nominal length.
pub fn unfold_noto(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    let p = ctx.params;
    let out_samples = nominal_len(ctx.out_rate, ctx.out_seconds());
    let mut out = SampleBuffer::stereo(out_samples);

    let mut rng = SeedRandom::new(i64::from(offset_seed(p.seed, SEED_OFFSET)));
    let mono = ctx.micro.to_mono();
    let tap_src = mono.channel(0);
    let micro_n = tap_src.len().max(1);
    let mut lfsr = Lfsr32::new((p.seed as u32) ^ LFSR_SALT, LFSR_TAPS);

    let chaos = p.spectral_chaos;
    let grid = grid_len(ctx.out_rate, chaos);
    let base_hz = 200.0 + 3000.0 * chaos.clamp(0.0, 1.0);
    let click_gain = 0.12 + 0.18 * chaos;
    let sparse_period = grid * (2 + (p.stretch * 0.2).round() as usize);
    let tap_step = 3 + p.seed.rem_euclid(11) as usize;
    let rate = ctx.out_rate as f32;
    let sub_denom = (grid - 1).max(1) as f32;
    let mut phase = 0.0f32;

    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for i in 0..out_samples {
        if i % grid == 0 {
            lfsr.step();
        }

        let sub = (i % grid) as f32 / sub_denom;
        let click_env = if lfsr.bit(2) { (-22.0 * sub).exp() } else { 0.0 };
        let burst_env = if lfsr.bit(9) { (-8.0 * sub).exp() } else { 0.0 };

        let hz = base_hz * (1.0 + 2.0 * ((lfsr.state() >> 16) & 7) as f32 / 7.0);
        phase += TWO_PI * hz / rate;

        let tap = tap_src.get((i * tap_step) % micro_n).copied().unwrap_or(0.0);
        let click = rng.next_bipolar() * click_env * click_gain;
        let body = burst_env * (0.18 * phase.sin() + 0.12 * (4.0 * tap).tanh());
        let sparse = if i % sparse_period == 0 { 0.6 } else { 0.0 };

        left[i] = click + body + sparse * rng.next_bipolar() * 0.08;
        right[i] = -click + body - sparse * rng.next_bipolar() * 0.08;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spacing() {
        assert_eq!(grid_len(48_000.0, 0.0), 1200);
        assert_eq!(grid_len(48_000.0, 1.0), 336);
        assert_eq!(grid_len(100.0, 1.0), 12);
    }
}
