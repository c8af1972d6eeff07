//! Morphogen unfolding: a reaction-diffusion spectrogram played by an
//! additive oscillator bank.
//!
//! 1. One 1024-point Hann frame stretched over the whole mono micro-burst
//!    gives a seed magnitude profile across `bins` bands.
//! 2. A Gray-Scott system (species U, V) runs on a ring of those bands for
//!    `cells` time cells of `sub_steps` Euler steps each. A temporal
//!    coupling term pulls every band toward its value at the previous cell,
//!    weighted by the hybrid mix.
//! 3. Each cell's V, scaled by the profile, becomes one column of a
//!    `[cells x bins]` grid.
//! 4. Synthesis interpolates the grid in time per output sample and sums one
//!    free-running sine per band, detuned between left and right.

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, lerp, limit};

use crate::fft::{Cf32, Fft};
use crate::params::nominal_len;

const PROFILE_FFT_SIZE: usize = 1024;

/// Inputs of a morphogen render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphogenParams {
    /// Output sample rate in Hz.
    pub out_rate: f64,
    /// Output length in seconds.
    pub out_seconds: f64,
    /// Drives the time-cell count.
    pub stretch: f32,
    /// Band-to-frequency warp.
    pub warp: f32,
    /// Chaos amount, clamped to `[0, 1]` internally.
    pub chaos: f32,
    /// Temporal coupling and stereo spread.
    pub mix: f32,
    /// User seed; the generator uses `seed + 2026`.
    pub seed: i32,
}

/// Generator offset from the user seed.
pub const SEED_OFFSET: i32 = 2026;

/// Grid dimensions for a parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    /// Frequency bands on the ring.
    pub bins: usize,
    /// Time cells.
    pub cells: usize,
    /// Euler steps per cell.
    pub sub_steps: usize,
}

impl GridSize {
    /// Derives the grid for a stretch and chaos amount.
    pub fn new(stretch: f32, chaos: f32) -> Self {
        let c = chaos.clamp(0.0, 1.0);
        Self {
            bins: ((64.0 + 64.0 * c).round() as i64).clamp(48, 160) as usize,
            cells: (((18.0 + 3.0 * stretch) * (1.0 + 0.6 * c)).round() as i64).clamp(40, 420)
                as usize,
            sub_steps: ((3.0 + 8.0 * c).round() as i64).clamp(2, 14) as usize,
        }
    }
}

/// Magnitude envelope of `mono` sampled at `bins` evenly spaced bands.
pub fn seed_profile(mono: &[f32], bins: usize) -> Vec<f32> {
    let n = PROFILE_FFT_SIZE;
    let last = mono.len().saturating_sub(1);
    let denom = (n - 1) as f64;
    let mut frame: Vec<Cf32> = (0..n)
        .map(|i| {
            let idx = ((i as f64 * mono.len() as f64 / denom).round() as usize).min(last);
            let w = 0.5 - 0.5 * (TWO_PI * i as f32 / (n - 1) as f32).cos();
            Cf32::new(mono.get(idx).copied().unwrap_or(0.0) * w, 0.0)
        })
        .collect();
    Fft::new(n).forward(&mut frame);

    let half = n / 2;
    let band_denom = bins.saturating_sub(1).max(1) as f32;
    (0..bins)
        .map(|k| {
            let u = k as f32 / band_denom;
            let src = ((u * half as f32).round() as usize).min(half);
            (frame[src].norm() * 6.0).clamp(0.0, 1.0).powf(0.65)
        })
        .collect()
}

/// Two-species field on a ring.
struct ReactionDiffusion {
    u: Vec<f32>,
    v: Vec<f32>,
    prev_u: Vec<f32>,
    prev_v: Vec<f32>,
    next_u: Vec<f32>,
    next_v: Vec<f32>,
    diff_u: f32,
    diff_v: f32,
    couple: f32,
}

impl ReactionDiffusion {
    fn seeded(profile: &[f32], rng: &mut SeedRandom, c: f32, mix: f32) -> Self {
        let bins = profile.len();
        let mut v = vec![0.0; bins];
        let mut u = vec![1.0; bins];
        for k in 0..bins {
            let impulse = if rng.next_float() < 0.06 + 0.08 * c {
                0.4 + 0.6 * rng.next_float()
            } else {
                0.0
            };
            v[k] = (0.45 * profile[k] + impulse).clamp(0.0, 1.0);
            u[k] = 1.0 - v[k] * (0.6 + 0.3 * c);
        }
        Self {
            prev_u: u.clone(),
            prev_v: v.clone(),
            next_u: vec![1.0; bins],
            next_v: vec![0.0; bins],
            u,
            v,
            diff_u: 0.10 + 0.16 * c,
            diff_v: 0.06 + 0.12 * c,
            couple: 0.08 + 0.26 * mix,
        }
    }

    /// One Euler step with feed `f` and kill `kk`.
    fn step(&mut self, f: f32, kk: f32) {
        let bins = self.u.len();
        for k in 0..bins {
            let km1 = (k + bins - 1) % bins;
            let kp1 = (k + 1) % bins;
            let u = self.u[k];
            let v = self.v[k];
            let lap_u = self.u[km1] - 2.0 * u + self.u[kp1];
            let lap_v = self.v[km1] - 2.0 * v + self.v[kp1];
            let uvv = u * v * v;

            let du = self.diff_u * lap_u - uvv + f * (1.0 - u) + self.couple * (self.prev_u[k] - u);
            let dv = self.diff_v * lap_v + uvv - (kk + f) * v + self.couple * (self.prev_v[k] - v);

            self.next_u[k] = (u + du * 0.9).clamp(0.0, 1.5);
            self.next_v[k] = (v + dv * 0.9).clamp(0.0, 1.5);
        }
        std::mem::swap(&mut self.u, &mut self.next_u);
        std::mem::swap(&mut self.v, &mut self.next_v);
    }

    /// Stores the current field as the coupling target for the next cell.
    fn latch(&mut self) {
        self.prev_u.copy_from_slice(&self.u);
        self.prev_v.copy_from_slice(&self.v);
    }
}

/// Runs the reaction-diffusion system and returns the `[cells x bins]`
/// amplitude grid, row-major by cell.
fn simulate(profile: &[f32], size: GridSize, rng: &mut SeedRandom, c: f32, mix: f32) -> Vec<f32> {
    let bins = size.bins;
    let mut field = ReactionDiffusion::seeded(profile, rng, c, mix);
    let mut grid = vec![0.0; bins * size.cells];

    let f_base = 0.012 + 0.028 * c;
    let k_base = 0.038 + 0.034 * (1.0 - c);
    let cell_denom = size.cells.saturating_sub(1).max(1) as f32;

    for t in 0..size.cells {
        let tu = t as f32 / cell_denom;
        let f = f_base + 0.018 * (TWO_PI * (0.13 * tu + 0.71 * c)).sin();
        let kk = k_base + 0.016 * (TWO_PI * (0.21 * tu + 0.37 * c)).sin();

        for _ in 0..size.sub_steps {
            field.step(f, kk);
        }

        let row = &mut grid[t * bins..(t + 1) * bins];
        for (k, cell) in row.iter_mut().enumerate() {
            *cell = (field.v[k] * (0.7 + 0.6 * profile[k])).clamp(0.0, 1.0);
        }
        field.latch();
    }
    grid
}

/// Renders the morphogen mode.
///
/// Output is stereo and exactly the nominal length.
pub fn unfold_morphogen(micro: &SampleBuffer, params: &MorphogenParams) -> SampleBuffer {
    let mono = micro.to_mono();
    let mut rng = SeedRandom::new(i64::from(params.seed) + i64::from(SEED_OFFSET));
    let c = params.chaos.clamp(0.0, 1.0);
    let out_samples = nominal_len(params.out_rate, params.out_seconds);
    let mut out = SampleBuffer::stereo(out_samples);

    let size = GridSize::new(params.stretch, c);
    let base_warp = params.warp.clamp(0.6, 6.0);
    let profile = seed_profile(mono.channel(0), size.bins);
    let grid = simulate(&profile, size, &mut rng, c, params.mix);

    let rate = params.out_rate as f32;
    let nyquist = 0.5 * rate;
    let warp_pow = (1.0 / base_warp.max(0.15)).clamp(0.35, 2.8);
    let spread = 0.02 + 0.28 * params.mix + 0.2 * c;
    let skew = 0.15 + 0.6 * c;
    let rolloff = 0.35 + 0.25 * c;
    let gain = 0.10 + 0.16 * c;

    let bins = size.bins;
    let band_denom = bins.saturating_sub(1).max(1) as f32;
    let ku: Vec<f32> = (0..bins).map(|k| k as f32 / band_denom).collect();
    let freq: Vec<f32> = ku
        .iter()
        .map(|&x| limit(12.0, nyquist * 0.98, x.powf(warp_pow) * nyquist))
        .collect();
    let weight: Vec<f32> = ku.iter().map(|&x| (1.0 - x).powf(rolloff)).collect();

    let mut phase_l = vec![0.0f32; bins];
    let mut phase_r = vec![0.0f32; bins];
    let last_cell = size.cells - 1;
    let sample_denom = out_samples.saturating_sub(1).max(1) as f32;
    let cell_span = last_cell.max(1) as f32;

    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for s in 0..out_samples {
        let tu = s as f32 / sample_denom;
        let cell_pos = tu * cell_span;
        let t0 = (cell_pos as usize).min(last_cell);
        let t1 = (t0 + 1).min(last_cell);
        let tf = cell_pos - t0 as f32;
        let row0 = &grid[t0 * bins..(t0 + 1) * bins];
        let row1 = &grid[t1 * bins..(t1 + 1) * bins];

        let mut sum_l = 0.0;
        let mut sum_r = 0.0;
        for k in 1..bins {
            let amp = lerp(row0[k], row1[k], tf).clamp(0.0, 1.0);
            let detune =
                1.0 + spread * (0.5 + 0.5 * (TWO_PI * (0.001 * s as f32 + ku[k] * 3.0)).sin());

            phase_l[k] += TWO_PI * freq[k] / rate;
            phase_r[k] += TWO_PI * (freq[k] * detune) / rate;

            sum_l += amp * weight[k] * (phase_l[k] * (1.0 + skew * ku[k])).sin();
            sum_r += amp * weight[k] * (phase_r[k] * (1.0 - skew * (1.0 - ku[k]))).sin();
        }

        left[s] = sum_l * gain;
        right[s] = sum_r * gain;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::micro_burst::render_micro_burst;

    fn params() -> MorphogenParams {
        MorphogenParams {
            out_rate: 22_050.0,
            out_seconds: 1.0,
            stretch: 18.0,
            warp: 1.7,
            chaos: 0.45,
            mix: 0.5,
            seed: 4242,
        }
    }

    #[test]
    fn grid_size_limits() {
        assert_eq!(
            GridSize::new(2.0, 0.0),
            GridSize {
                bins: 64,
                cells: 40,
                sub_steps: 3
            }
        );
        let big = GridSize::new(100.0, 1.0);
        assert_eq!(big.bins, 128);
        assert_eq!(big.cells, 420);
        assert_eq!(big.sub_steps, 11);
    }

    #[test]
    fn profile_is_unit_bounded() {
        let micro = render_micro_burst(192_000.0, 10.0, 600);
        let profile = seed_profile(micro.to_mono().channel(0), 96);
        assert_eq!(profile.len(), 96);
        assert!(profile.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert!(profile.iter().any(|&p| p > 0.0));
    }

    #[test]
    fn field_stays_in_bounds() {
        let profile = vec![0.8; 64];
        let mut rng = SeedRandom::new(1);
        let grid = simulate(&profile, GridSize::new(30.0, 1.0), &mut rng, 1.0, 1.0);
        assert!(grid.iter().all(|&g| (0.0..=1.0).contains(&g)));
    }

    #[test]
    fn renders_nominal_length_non_silent() {
        let micro = render_micro_burst(192_000.0, 10.0, 600);
        let out = unfold_morphogen(&micro, &params());
        assert_eq!(out.len(), 22_050);
        assert!(out.peak() > 0.0);
        assert!(out.iter_channels().flatten().all(|s| s.is_finite()));
    }

    #[test]
    fn deterministic() {
        let micro = render_micro_burst(192_000.0, 6.0, 500);
        assert_eq!(
            unfold_morphogen(&micro, &params()),
            unfold_morphogen(&micro, &params())
        );
    }

    #[test]
    fn renders_at_rates_below_the_frequency_floor() {
        let micro = render_micro_burst(192_000.0, 6.0, 300);
        for rate in [20.0, 8.0] {
            let out = unfold_morphogen(
                &micro,
                &MorphogenParams {
                    out_rate: rate,
                    ..params()
                },
            );
            assert_eq!(out.len(), rate as usize);
            assert!(out.iter_channels().flatten().all(|s| s.is_finite()));
        }
    }
}
