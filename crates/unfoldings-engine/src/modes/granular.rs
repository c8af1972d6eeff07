//! Granular unfolding: a fixed-hop cloud of resampled grains.
//!
//! Grains start at output position 0 and every `hop_out` samples after,
//! until the output is full. Each grain reads a short window of the source
//! at a random offset and speed (sometimes reversed), folds it to mid/side,
//! saturates with a brightness-dependent drive and sums into the output
//! under a Hann window and a shimmering LFO.
//!
//! ```text
//! grain_out = max(8, round(grain_ms * out_rate / 1000))
//! hop_out   = max(1, round(grain_out / max(1, overlap)))
//! grain_in  = clamp(round(grain_out * micro_rate / out_rate * 0.2), 8, max(9, micro_len - 2))
//! ```

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, equal_power_pan, lerp, raised_cosine};

use crate::params::nominal_len;

/// Inputs of one granular pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GranularParams {
    /// Source sample rate in Hz.
    pub micro_rate: f64,
    /// Output sample rate in Hz.
    pub out_rate: f64,
    /// Output length in seconds.
    pub out_seconds: f64,
    /// Grain length at the output rate, in milliseconds.
    pub grain_ms: f32,
    /// Overlap factor; the hop is `grain / overlap`.
    pub overlap: f32,
    /// Generator seed.
    pub seed: i32,
}

/// Sample counts derived from [`GranularParams`] and the source length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GranularLayout {
    /// Output length.
    pub out_samples: usize,
    /// Grain length at the output rate.
    pub grain_out: usize,
    /// Distance between grain starts.
    pub hop_out: usize,
    /// Grain read span in source samples.
    pub grain_in: usize,
}

impl GranularLayout {
    /// Derives the layout for a source of `micro_len` samples.
    pub fn new(micro_len: usize, params: &GranularParams) -> Self {
        let out_samples = nominal_len(params.out_rate, params.out_seconds);
        let grain_out =
            ((f64::from(params.grain_ms) * 0.001 * params.out_rate).round() as i64).max(8);
        let hop_out = ((grain_out as f64 / f64::from(params.overlap.max(1.0))).round() as i64).max(1);
        let upper = (micro_len as i64 - 2).max(9);
        let grain_in = ((grain_out as f64 * params.micro_rate / params.out_rate * 0.2).round()
            as i64)
            .clamp(8, upper);

        Self {
            out_samples,
            grain_out: grain_out as usize,
            hop_out: hop_out as usize,
            grain_in: grain_in as usize,
        }
    }

    /// Number of grains placed: `ceil(out_samples / hop_out)`.
    pub fn grain_count(&self) -> usize {
        self.out_samples.div_ceil(self.hop_out)
    }
}

/// One grain's random draws.
#[derive(Debug, Clone, Copy)]
struct Grain {
    src_start: usize,
    jitter: f32,
    gain: f32,
    speed: f32,
    reverse: bool,
    pan: f32,
    brightness: f32,
}

impl Grain {
    fn draw(rng: &mut SeedRandom, micro_len: usize, grain_in: usize) -> Self {
        let span = (micro_len as i64 - grain_in as i64).max(1) as i32;
        let src_start = rng.next_int_below(span) as usize;
        let jitter = rng.next_bipolar();
        let gain = 0.05 + 0.23 * rng.next_float().powf(1.6);
        let speed_a = rng.next_float();
        let speed_b = rng.next_float();
        let speed = (0.45 + 2.1 * speed_a * speed_b).clamp(0.3, 2.6);
        let reverse = rng.next_float() < 0.17;
        let pan = rng.next_float();
        let brightness = 0.2 + 0.8 * rng.next_float();
        Self {
            src_start,
            jitter,
            gain,
            speed,
            reverse,
            pan,
            brightness,
        }
    }
}

/// Renders a granular pass over `micro`.
///
/// The output is stereo and exactly `max(1, round(out_rate * out_seconds))`
/// samples long. A mono source is read as dual mono.
pub fn unfold_granular(micro: &SampleBuffer, params: &GranularParams) -> SampleBuffer {
    let micro_len = micro.len();
    let layout = GranularLayout::new(micro_len, params);
    let mut out = SampleBuffer::stereo(layout.out_samples);
    if micro_len == 0 {
        return out;
    }

    let mut rng = SeedRandom::new(i64::from(params.seed));
    let src_l = micro.channel_or_last(0);
    let src_r = micro.channel_or_last(1);
    let last = micro_len - 1;
    let read_span = layout.grain_in.saturating_sub(1) as f32;
    let denom = layout.grain_out.saturating_sub(1).max(1) as f32;

    let Some((left, right)) = out.stereo_mut() else {
        return out;
    };

    for out_pos in (0..layout.out_samples).step_by(layout.hop_out) {
        let grain = Grain::draw(&mut rng, micro_len, layout.grain_in);
        let (pan_l, pan_r) = equal_power_pan(grain.pan);
        let exponent = 0.62 + 0.32 * grain.jitter;
        let drive = 0.9 + 1.4 * grain.brightness;
        let lfo_cycles = 1.5 + 3.0 * grain.brightness;

        for i in 0..layout.grain_out {
            let write = out_pos + i;
            if write >= layout.out_samples {
                break;
            }

            let u = i as f32 / denom;
            let read_u = if grain.reverse { 1.0 - u } else { u };
            let read_pos = grain.src_start as f32 + read_u.powf(exponent) * grain.speed * read_span;
            let r0 = (read_pos as usize).min(last);
            let r1 = (r0 + 1).min(last);
            let frac = read_pos - r0 as f32;

            let win = raised_cosine(u);
            let lfo = 0.55 + 0.45 * (TWO_PI * (u * lfo_cycles)).sin();

            let s_l = lerp(src_l[r0], src_l[r1], frac);
            let s_r = lerp(src_r[r0], src_r[r1], frac);
            let mono = 0.5 * (s_l + s_r);
            let airy = 0.65 * mono + 0.35 * (s_l - s_r);
            let shaped = (drive * airy).tanh();

            left[write] += shaped * win * grain.gain * pan_l * lfo;
            right[write] += shaped * win * grain.gain * pan_r * (2.0 - lfo);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(grain_ms: f32, overlap: f32) -> GranularParams {
        GranularParams {
            micro_rate: 192_000.0,
            out_rate: 48_000.0,
            out_seconds: 1.0,
            grain_ms,
            overlap,
            seed: 7,
        }
    }

    #[test]
    fn layout_formulas() {
        let layout = GranularLayout::new(4608, &params(42.0, 6.0));
        assert_eq!(layout.out_samples, 48_000);
        assert_eq!(layout.grain_out, 2016);
        assert_eq!(layout.hop_out, 336);
        // 2016 * 4 * 0.2 = 1612.8
        assert_eq!(layout.grain_in, 1613);
        assert_eq!(layout.grain_count(), 143);
    }

    #[test]
    fn grain_in_clamped_to_source() {
        let layout = GranularLayout::new(100, &params(180.0, 2.0));
        assert_eq!(layout.grain_in, 98);
        let burst = GranularLayout::new(16, &params(8.0, 2.0));
        assert_eq!(burst.grain_in, 14);
        let tiny = GranularLayout::new(5, &params(8.0, 2.0));
        assert_eq!(tiny.grain_in, 9);
    }

    #[test]
    fn output_length_is_nominal() {
        let micro = SampleBuffer::from_stereo(vec![0.1; 512], vec![-0.1; 512]);
        let out = unfold_granular(&micro, &params(30.0, 4.0));
        assert_eq!(out.len(), 48_000);
        assert_eq!(out.num_channels(), 2);
    }

    #[test]
    fn deterministic_per_seed() {
        let micro = SampleBuffer::from_stereo(
            (0..800).map(|i| (i as f32 * 0.05).sin()).collect(),
            (0..800).map(|i| (i as f32 * 0.07).cos()).collect(),
        );
        let a = unfold_granular(&micro, &params(20.0, 3.0));
        let b = unfold_granular(&micro, &params(20.0, 3.0));
        assert_eq!(a, b);
        let c = unfold_granular(&micro, &GranularParams { seed: 8, ..params(20.0, 3.0) });
        assert_ne!(a, c);
    }

    #[test]
    fn silent_source_gives_silence() {
        let micro = SampleBuffer::stereo(256);
        let out = unfold_granular(&micro, &params(20.0, 3.0));
        assert_eq!(out.peak(), 0.0);
    }
}
