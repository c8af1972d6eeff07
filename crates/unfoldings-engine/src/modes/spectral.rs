//! Spectral unfolding: a phase vocoder with warped, reshaped resynthesis.
//!
//! The mono micro-burst is first resampled to the output rate (the "tiny"
//! buffer, at least 32 samples). A 2048-point STFT then reads the tiny buffer
//! cyclically with an analysis hop of 256 and writes frames with a synthesis
//! hop of `max(32, round(256 * stretch))`; the ratio of the two hops is the
//! time stretch.
//!
//! Per frame and bin:
//!
//! 1. The analysis spectrum is sampled at a warped source position, a
//!    frame-modulated blend of a linear curve `k / warp` and a power curve
//!    `norm_k^(1.15 / warp)`.
//! 2. The true frequency is estimated from the phase advance at the *source*
//!    bin against that source bin's previous analysis phase.
//! 3. Output phase accumulates `true_freq * hop_out` per bin, with a small
//!    chaos-scaled detune on the right channel.
//! 4. Magnitude is reshaped by an exponential tilt, a comb and three
//!    drifting Gaussian formants.
//! 5. A shimmer copy lands in a ratio-derived harmonic bin.
//! 6. Bins strictly between DC and Nyquist are mirrored as conjugates as
//!    the bin loop goes, so shimmer landing on an already-mirrored bin stays
//!    one-sided.
//!
//! Frames are inverse transformed, Hann windowed, scaled by `1/N` and
//! overlap-added. Output length is exactly the nominal length; the last
//! frame is truncated.

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, lerp, princ_arg};

use crate::fft::{Cf32, Fft, symmetric_hann};
use crate::params::nominal_len;

/// STFT frame size.
pub const FRAME_SIZE: usize = 2048;
/// Analysis hop in samples.
pub const HOP_IN: usize = FRAME_SIZE / 8;
const BINS: usize = FRAME_SIZE / 2 + 1;
const LAST_BIN: f32 = (BINS - 1) as f32;

/// Inputs of one spectral pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralParams {
    /// Source sample rate in Hz.
    pub micro_rate: f64,
    /// Output sample rate in Hz.
    pub out_rate: f64,
    /// Output length in seconds.
    pub out_seconds: f64,
    /// Synthesis hop over analysis hop.
    pub stretch: f32,
    /// Warp exponent of the bin remapping.
    pub warp: f32,
    /// Chaos amount, clamped to `[0, 1]` internally.
    pub chaos: f32,
    /// Generator seed.
    pub seed: i32,
}

/// Synthesis hop for a stretch factor.
pub fn hop_out(stretch: f32) -> usize {
    ((HOP_IN as f64 * f64::from(stretch)).round() as i64).max(32) as usize
}

/// Number of STFT frames written for an output length.
pub fn frame_count(out_samples: usize, hop_out: usize) -> usize {
    1 + out_samples.saturating_sub(FRAME_SIZE) / hop_out.max(1)
}

/// Linear-interpolating resample of `mono` from `micro_rate` to `out_rate`.
///
/// The result has `max(32, round(len * out_rate / micro_rate))` samples.
pub fn resample_linear(mono: &[f32], micro_rate: f64, out_rate: f64) -> Vec<f32> {
    let len = ((mono.len() as f64 * out_rate / micro_rate).round() as i64).max(32) as usize;
    if mono.is_empty() {
        return vec![0.0; len];
    }
    let last = mono.len() - 1;
    let (mr, or) = (micro_rate as f32, out_rate as f32);
    (0..len)
        .map(|i| {
            let src = i as f32 * mr / or;
            let a = (src as usize).min(last);
            let b = (a + 1).min(last);
            lerp(mono[a], mono[b], src - a as f32)
        })
        .collect()
}

/// Per-frame modulation values, all derived from the frame position.
#[derive(Debug, Clone, Copy)]
struct FrameShape {
    frame: f32,
    frame_u: f32,
    dyn_warp: f32,
    shimmer: f32,
    comb_rate: f32,
    tilt_depth: f32,
    harmonic_ratio: f32,
    shimmer_phase_scale: f32,
    formant_centres: [f32; 3],
}

const FORMANT_WIDTHS: [f32; 3] = [0.032, 0.045, 0.055];

impl FrameShape {
    fn new(frame: usize, frame_u: f32, warp: f32, c: f32, seed_phase: [f32; 3]) -> Self {
        let [pa, pb, pc] = seed_phase;
        let swing = |rate: f32, phase: f32| 0.5 + 0.5 * (TWO_PI * (rate * frame_u) + phase).sin();

        let dyn_warp = (warp
            * (1.0
                + (0.08 + 0.30 * c) * (TWO_PI * (0.23 * frame_u) + pa).sin()
                + (0.04 + 0.12 * c) * (TWO_PI * (0.97 * frame_u) + pb).sin()))
        .clamp(0.45, 7.5);

        Self {
            frame: frame as f32,
            frame_u,
            dyn_warp,
            shimmer: (0.03 + 0.07 * c) + (0.10 + 0.20 * c) * swing(1.07, pc),
            comb_rate: 0.06 + 0.31 * frame_u,
            tilt_depth: (0.15 + 0.75 * c) * (TWO_PI * (0.31 * frame_u) + pa).sin(),
            harmonic_ratio: (1.08 + 0.45 * c) + (0.08 + 0.76 * c) * (TWO_PI * frame_u + pc).sin(),
            shimmer_phase_scale: (1.08 + 0.55 * c) + (0.1 + 0.95 * c) * frame_u,
            formant_centres: [
                0.13 + 0.24 * swing(0.21, pa),
                0.36 + 0.27 * swing(0.34, pb),
                0.64 + 0.21 * swing(0.18, pc),
            ],
        }
    }

    fn formant_gain(&self, norm_k: f32, c: f32) -> f32 {
        let boost = |i: usize| {
            let z = (norm_k - self.formant_centres[i]) / FORMANT_WIDTHS[i];
            (-0.5 * z * z).exp()
        };
        (0.85 - 0.20 * c)
            + (0.20 + 0.62 * c) * boost(0)
            + (0.26 + 0.80 * c) * boost(1)
            + (0.22 + 0.66 * c) * boost(2)
    }
}

/// STFT state that persists across frames.
struct PhaseVocoder {
    fft: Fft,
    window: Vec<f32>,
    last_phase: Vec<f32>,
    sum_l: Vec<f32>,
    sum_r: Vec<f32>,
    spec_in: Vec<Cf32>,
    spec_l: Vec<Cf32>,
    spec_r: Vec<Cf32>,
    hop_out: f32,
    chaos: f32,
}

impl PhaseVocoder {
    fn new(hop_out: usize, chaos: f32) -> Self {
        let zero = Cf32::new(0.0, 0.0);
        Self {
            fft: Fft::new(FRAME_SIZE),
            window: symmetric_hann(FRAME_SIZE),
            last_phase: vec![0.0; BINS],
            sum_l: vec![0.0; BINS],
            sum_r: vec![0.0; BINS],
            spec_in: vec![zero; FRAME_SIZE],
            spec_l: vec![zero; FRAME_SIZE],
            spec_r: vec![zero; FRAME_SIZE],
            hop_out: hop_out as f32,
            chaos,
        }
    }

    /// Analyses one frame of `tiny` starting at `in_pos` (cyclic) and leaves
    /// the time-domain result for both channels in `spec_l` / `spec_r`.
    fn process_frame(&mut self, tiny: &[f32], in_pos: usize, shape: &FrameShape, phase_b: f32) {
        let n_tiny = tiny.len();
        for (n, slot) in self.spec_in.iter_mut().enumerate() {
            *slot = Cf32::new(tiny[(in_pos + n) % n_tiny] * self.window[n], 0.0);
        }
        self.fft.forward(&mut self.spec_in);

        let zero = Cf32::new(0.0, 0.0);
        self.spec_l.fill(zero);
        self.spec_r.fill(zero);

        let c = self.chaos;
        let c2 = c * c;
        let comb_depth = 0.08 + 0.38 * c;
        let comb_teeth = 18.0 + (30.0 + 44.0 * c) * shape.dyn_warp;
        let power = (1.15 / shape.dyn_warp).max(0.2);

        for k in 0..BINS {
            let norm_k = k as f32 / LAST_BIN;

            let src_a = k as f32 / shape.dyn_warp;
            let src_b = norm_k.powf(power) * LAST_BIN;
            let blend = 0.5 + 0.5 * (TWO_PI * (0.17 * shape.frame_u + norm_k * 0.9)).sin();
            let src_pos = lerp(src_a, src_b, blend).clamp(0.0, LAST_BIN);
            let k0 = (src_pos as usize).min(BINS - 1);
            let k1 = (k0 + 1).min(BINS - 1);
            let frac = src_pos - k0 as f32;

            let v = self.spec_in[k0] + (self.spec_in[k1] - self.spec_in[k0]) * frac;
            let mag = v.norm();
            let phase = v.im.atan2(v.re);

            let expected = TWO_PI * HOP_IN as f32 * src_pos / FRAME_SIZE as f32;
            let delta = princ_arg(phase - self.last_phase[k0] - expected);
            let true_freq = TWO_PI * src_pos / FRAME_SIZE as f32 + delta / HOP_IN as f32;
            self.last_phase[k0] = phase;

            let tilt = ((norm_k - 0.5) * shape.tilt_depth).exp();
            let comb = (1.0 - comb_depth)
                + comb_depth
                    * (0.5
                        + 0.5
                            * (TWO_PI * (norm_k * comb_teeth + shape.comb_rate * shape.frame))
                                .cos());
            let shaped = mag * tilt * comb * shape.formant_gain(norm_k, c);

            let stereo_offset = ((0.015 + 0.05 * c) + (0.07 + 0.45 * c2) * norm_k * norm_k)
                * (TWO_PI * (0.07 * shape.frame + norm_k * 2.8) + phase_b).sin();
            self.sum_l[k] += true_freq * self.hop_out;
            self.sum_r[k] += true_freq
                * self.hop_out
                * (1.0 + (0.0001 + 0.0026 * c) * (TWO_PI * (0.11 * shape.frame_u + norm_k)).sin());

            self.spec_l[k] += Cf32::from_polar(shaped, self.sum_l[k]);
            self.spec_r[k] += Cf32::from_polar(shaped, self.sum_r[k] + stereo_offset);

            let hk = ((k as f32 * shape.harmonic_ratio).round() as i64).clamp(0, BINS as i64 - 1)
                as usize;
            if hk > 0 {
                let mag = shaped * shape.shimmer * (1.0 - (0.15 + 0.45 * c) * norm_k);
                let phase = self.sum_l[k] * shape.shimmer_phase_scale;
                self.spec_l[hk] += Cf32::from_polar(mag, phase);
                self.spec_r[hk] += Cf32::from_polar(mag * 0.97, phase + 0.13);
            }

            if k > 0 && k < FRAME_SIZE / 2 {
                self.spec_l[FRAME_SIZE - k] = self.spec_l[k].conj();
                self.spec_r[FRAME_SIZE - k] = self.spec_r[k].conj();
            }
        }

        self.fft.inverse(&mut self.spec_l);
        self.fft.inverse(&mut self.spec_r);
    }
}

/// Renders a spectral pass over `micro`.
///
/// Output is stereo and exactly `max(1, round(out_seconds * out_rate))`
/// samples long.
pub fn unfold_spectral(micro: &SampleBuffer, params: &SpectralParams) -> SampleBuffer {
    let mono = micro.to_mono();
    let tiny = resample_linear(mono.channel(0), params.micro_rate, params.out_rate);

    let mut rng = SeedRandom::new(i64::from(params.seed));
    let chaos = params.chaos.clamp(0.0, 1.0);
    let out_samples = nominal_len(params.out_rate, params.out_seconds);
    let mut out = SampleBuffer::stereo(out_samples);

    let hop = hop_out(params.stretch);
    let frames = frame_count(out_samples, hop);
    let seed_phase = [
        rng.next_float() * TWO_PI,
        rng.next_float() * TWO_PI,
        rng.next_float() * TWO_PI,
    ];

    let mut vocoder = PhaseVocoder::new(hop, chaos);
    let frame_denom = frames.saturating_sub(1).max(1) as f32;
    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for frame in 0..frames {
        let out_pos = frame * hop;
        let in_pos = (frame * HOP_IN) % tiny.len();
        let frame_u = frame as f32 / frame_denom;
        let shape = FrameShape::new(frame, frame_u, params.warp, chaos, seed_phase);

        vocoder.process_frame(&tiny, in_pos, &shape, seed_phase[1]);

        let scale = 1.0 / FRAME_SIZE as f32;
        for n in 0..FRAME_SIZE {
            let w = out_pos + n;
            if w >= out_samples {
                break;
            }
            let win = vocoder.window[n] * scale;
            left[w] += vocoder.spec_l[n].re * win;
            right[w] += vocoder.spec_r[n].re * win;
        }
    }

    tracing::trace!(frames, hop_out = hop, "spectral pass complete");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::micro_burst::render_micro_burst;

    fn params() -> SpectralParams {
        SpectralParams {
            micro_rate: 192_000.0,
            out_rate: 22_050.0,
            out_seconds: 1.0,
            stretch: 6.0,
            warp: 1.7,
            chaos: 0.45,
            seed: 99,
        }
    }

    #[test]
    fn hop_and_frames() {
        assert_eq!(hop_out(2.0), 512);
        assert_eq!(hop_out(0.01), 32);
        assert_eq!(frame_count(1000, 512), 1);
        assert_eq!(frame_count(2048 + 1024, 512), 3);
    }

    #[test]
    fn resample_length_and_endpoints() {
        let mono: Vec<f32> = (0..400).map(|i| i as f32).collect();
        let tiny = resample_linear(&mono, 192_000.0, 48_000.0);
        assert_eq!(tiny.len(), 100);
        assert_eq!(tiny[0], 0.0);
        assert!((tiny[1] - 4.0).abs() < 1e-4);

        let short = resample_linear(&mono[..8], 192_000.0, 48_000.0);
        assert_eq!(short.len(), 32);
        assert!(short.iter().all(|&s| s <= 7.0));
    }

    #[test]
    fn exact_nominal_length() {
        let micro = render_micro_burst(192_000.0, 10.0, 500);
        let out = unfold_spectral(&micro, &params());
        assert_eq!(out.len(), 22_050);
        assert_eq!(out.num_channels(), 2);
    }

    #[test]
    fn non_silent_and_finite() {
        let micro = render_micro_burst(192_000.0, 10.0, 500);
        let out = unfold_spectral(&micro, &params());
        assert!(out.peak() > 0.0);
        assert!(out.iter_channels().flatten().all(|s| s.is_finite()));
    }

    #[test]
    fn deterministic() {
        let micro = render_micro_burst(192_000.0, 8.0, 500);
        let a = unfold_spectral(&micro, &params());
        let b = unfold_spectral(&micro, &params());
        assert_eq!(a, b);
    }

    #[test]
    fn silent_input_stays_silent() {
        let micro = SampleBuffer::stereo(64);
        let out = unfold_spectral(&micro, &params());
        assert_eq!(out.peak(), 0.0);
    }
}
