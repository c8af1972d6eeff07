//! Xeno unfolding: spectral and granular layers under a gated Hénon map,
//! then three self-referential transform passes.
//!
//! A 2-bit flavour, derived from seed, warp, stretch and mix, selects the
//! cellular update rule, the Hénon coefficients, the stereo mapping of the
//! attractor and the pass geometry. The base signal is
//!
//! ```text
//! out = spectral_blend * spectral + granular_blend * granular + xeno_blend * henon
//! ```
//!
//! after which [`passes::fold`], [`passes::grammar`] and
//! [`passes::autocatalytic`] run in that order, each reading a snapshot of
//! the buffer taken before it starts.

pub mod passes;

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, popcount};

use super::granular::{GranularParams, unfold_granular};
use super::spectral::{SpectralParams, unfold_spectral};
use super::{UnfoldContext, offset_seed, sample_or_zero};

/// Seed offset of the spectral layer.
pub const SPECTRAL_SEED_OFFSET: i32 = 404;
/// Seed offset of the granular layer.
pub const GRANULAR_SEED_OFFSET: i32 = 9091;
/// Seed offset of the attractor noise generator.
pub const CHAOS_SEED_OFFSET: i32 = 31337;

/// Flavour selector in `0..4`.
pub fn flavor(seed: i32, warp: f32, stretch: f32, mix: f32) -> u32 {
    let sum = seed
        .wrapping_mul(3)
        .wrapping_add((warp * 17.0).round() as i32)
        .wrapping_add((stretch * 3.0).round() as i32)
        .wrapping_add((mix * 100.0).round() as i32);
    (sum & 3) as u32
}

/// 32-bit cellular state with a flavour-specific rotate/mix rule.
#[derive(Debug, Clone, Copy)]
struct CellularGate {
    state: u32,
    flavor: u32,
    mask: u32,
    mask_bits: u32,
}

impl CellularGate {
    fn new(seed: i32, flavor: u32, chaos: f32) -> Self {
        let mask_bits = 6 + (18.0 * chaos).round() as u32;
        let mask = if mask_bits >= 31 {
            0x7fff_ffff
        } else {
            (1u32 << mask_bits) - 1
        };
        Self {
            state: (seed as u32).wrapping_mul(747_796_405).wrapping_add(2_891_336_453),
            flavor,
            mask,
            mask_bits,
        }
    }

    fn advance(&mut self) {
        let ca = self.state;
        let left = ca.rotate_left(1 + (self.flavor & 1));
        let right = ca.rotate_right(1 + ((self.flavor >> 1) & 1));
        self.state = match self.flavor {
            0 => left ^ (ca | right),
            1 => (left & !right) ^ (ca >> 3),
            2 => left.wrapping_add(right) ^ (ca << 5),
            _ => (left ^ right).wrapping_add(ca.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)),
        };
    }

    /// Fraction of masked bits set, in `[0, 1]`.
    fn gate(&self) -> f32 {
        popcount(self.state, self.mask) as f32 / self.mask_bits.max(1) as f32
    }
}

/// Hénon-style map `x' = 1 - a x^2 + y`, `y' = b x`, held inside `[-2, 2]`.
#[derive(Debug, Clone, Copy)]
struct Henon {
    x: f32,
    y: f32,
}

impl Henon {
    fn step(&mut self, a: f32, b: f32) {
        let px = self.x;
        self.x = 1.0 - a * self.x * self.x + self.y;
        self.y = b * px;
        if !self.x.is_finite() || !self.y.is_finite() {
            self.x = 0.09;
            self.y = -0.13;
        }
        self.x = self.x.clamp(-2.0, 2.0);
        self.y = self.y.clamp(-2.0, 2.0);
    }
}

/// Stereo attractor sample for one flavour.
fn attractor_voice(flavor: u32, h: Henon, noise: f32, gate: f32, chaos: f32, i: usize) -> (f32, f32) {
    let (hx, hy, c) = (h.x, h.y, chaos);
    match flavor {
        0 => (
            ((hx * (1.1 + 1.8 * c) + noise) * (0.6 + 1.1 * gate)).tanh(),
            ((hy * (1.3 + 1.6 * c) - noise) * (0.6 + 1.1 * (1.0 - gate))).tanh(),
        ),
        1 => {
            let t = i as f32;
            (
                (TWO_PI * (0.15 * t + hx.abs() * (1.4 + 4.2 * c))).sin()
                    * (hy * (1.2 + 1.3 * c) + noise).tanh(),
                (TWO_PI * (0.12 * t + hy.abs() * (1.7 + 3.8 * c))).sin()
                    * (hx * (1.0 + 1.5 * c) - noise).tanh(),
            )
        }
        2 => {
            let q = ((hx - hy) * (2.2 + 1.7 * c)).tanh();
            (
                ((hx + 0.6 * q + noise) * (1.0 + 1.9 * gate)).tanh(),
                ((hy - 0.6 * q - noise) * (1.0 + 1.9 * (1.0 - gate))).tanh(),
            )
        }
        _ => {
            let cc = (TWO_PI * (0.004 * i as f32 + gate * 3.0)).cos();
            let drive = 1.4 + 1.1 * c;
            (
                ((hx * cc + hy * (1.0 - cc) + noise) * drive).tanh(),
                ((hy * cc - hx * (1.0 - cc) - noise) * drive).tanh(),
            )
        }
    }
}

/// Renders the xeno mode.
///
/// Output length is the longer of the two layers, which both render the
/// nominal length.
pub fn unfold_xeno(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    let p = ctx.params;
    let chaos = p.spectral_chaos.clamp(0.0, 1.0);
    let f = flavor(p.seed, p.warp, p.stretch, p.hybrid_mix);

    let spectral = unfold_spectral(
        ctx.micro,
        &SpectralParams {
            stretch: (p.stretch * (1.1 + 0.7 * chaos)).clamp(8.0, 120.0),
            warp: (p.warp * (0.9 + 0.6 * chaos)).clamp(0.7, 6.5),
            chaos: (p.spectral_chaos + 0.22).clamp(0.35, 1.0),
            seed: offset_seed(p.seed, SPECTRAL_SEED_OFFSET),
            ..ctx.spectral_params()
        },
    );
    let granular = unfold_granular(
        ctx.micro,
        &GranularParams {
            grain_ms: (p.grain_ms * (0.9 + 1.1 * chaos)).clamp(10.0, 200.0),
            overlap: (p.overlap * (0.8 + 1.0 * chaos)).clamp(1.5, 20.0),
            seed: offset_seed(p.seed, GRANULAR_SEED_OFFSET),
            ..ctx.granular_params()
        },
    );

    let out_samples = spectral.len().max(granular.len());
    let mut out = SampleBuffer::stereo(out_samples);

    let mut rng = SeedRandom::new(i64::from(offset_seed(p.seed, CHAOS_SEED_OFFSET)));
    let mut henon = Henon {
        x: 0.11 + 0.03 * rng.next_float(),
        y: -0.17 + 0.03 * rng.next_float(),
    };
    let mut cells = CellularGate::new(p.seed, f, chaos);
    let ff = f as f32;
    let spectral_blend = (0.18 + 0.62 * (1.0 - p.hybrid_mix) + 0.07 * ff).clamp(0.15, 0.8);
    let granular_blend = (0.15 + 0.55 * p.hybrid_mix + 0.06 * (3 - f) as f32).clamp(0.10, 0.8);
    let xeno_blend = (0.45 + 0.45 * chaos + 0.08 * ff).clamp(0.35, 1.1);

    let a_base = if f == 2 { 1.34 } else { 1.22 };
    let b_base = if f == 3 { 0.22 } else { 0.15 };
    let denom = out_samples.saturating_sub(1).max(1) as f32;

    if let Some((left, right)) = out.stereo_mut() {
        for i in 0..out_samples {
            let u = i as f32 / denom;
            if i & 7 == 0 {
                cells.advance();
            }

            let gate = cells.gate();
            let a = a_base
                + (0.42 + 0.26 * chaos)
                    * (TWO_PI * ((0.21 + 0.11 * ff) * u) + (2.3 + 1.7 * ff) * gate).sin();
            let b = b_base
                + (0.16 + 0.09 * chaos)
                    * (TWO_PI * ((0.43 + 0.08 * ff) * u) + (5.1 - 0.9 * ff) * gate).sin();
            henon.step(a, b);

            let noise = rng.next_bipolar() * (0.08 + 0.28 * chaos);
            let (x_l, x_r) = attractor_voice(f, henon, noise, gate, chaos, i);

            left[i] = spectral_blend * sample_or_zero(&spectral, 0, i)
                + granular_blend * sample_or_zero(&granular, 0, i)
                + xeno_blend * x_l;
            right[i] = spectral_blend * sample_or_zero(&spectral, 1, i)
                + granular_blend * sample_or_zero(&granular, 1, i)
                + xeno_blend * x_r;
        }
    }

    let geometry = passes::PassGeometry {
        rate: ctx.out_rate,
        flavor: f,
        chaos,
        seed: p.seed,
    };
    passes::fold(&mut out, &geometry);
    passes::grammar(&mut out, &geometry);
    passes::autocatalytic(&mut out, &geometry);
    out
}
