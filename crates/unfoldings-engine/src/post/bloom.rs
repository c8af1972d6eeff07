//! Bloom: a four-tap cross-channel feedback network layered onto the input.
//!
//! ```text
//! fbL = 0.41 dR[i-t1] + 0.29 dL[i-t2] - 0.18 dR[i-t3] + 0.13 dL[i-t4]
//! dL  = tanh(inL + fbL * (0.28 + 0.42 amount))
//! hpL = 0.987 * (hpL + dL - mid)          mid = (dL + dR) / 2
//! lpL = one-pole(hpL), alpha = 0.08 + 0.10 amount
//! outL = inL + lpL * (0.11 + 0.28 amount)
//! ```
//!
//! Tap lengths are drawn once per call from a generator seeded with `seed`.

use unfoldings_core::{OnePole, SampleBuffer, SeedRandom, TapDelay};

use crate::params::Mode;

/// Offset from the user seed to the bloom seed.
pub const BLOOM_SEED_OFFSET: i32 = 11731;

const HP_COEFF: f32 = 0.987;

/// `(base, spread)` in seconds for each tap.
const TAP_RANGES: [(f64, f64); 4] = [(0.013, 0.018), (0.029, 0.031), (0.061, 0.045), (0.101, 0.071)];

/// Bloom amount for a mode and chaos setting, in `[0.15, 1]`.
pub fn bloom_amount(mode: Mode, chaos: f32) -> f32 {
    let boost = if mode.index() >= Mode::Hybrid.index() {
        0.18
    } else {
        0.0
    };
    (0.35 + 0.35 * chaos + boost).clamp(0.15, 1.0)
}

/// Draws the four tap lengths in samples.
pub fn bloom_taps(sample_rate: f64, seed: i32) -> [usize; 4] {
    let mut rng = SeedRandom::new(i64::from(seed));
    TAP_RANGES.map(|(base, spread)| {
        let secs = base + spread * f64::from(rng.next_float());
        ((secs * sample_rate).round() as i64).max(1) as usize
    })
}

/// Applies bloom in place. Buffers of 8 samples or fewer, and mono buffers,
/// are left untouched.
pub fn apply_bloom(buffer: &mut SampleBuffer, sample_rate: f64, seed: i32, amount: f32) {
    let n = buffer.len();
    if n <= 8 || buffer.num_channels() < 2 {
        return;
    }
    let amt = amount.clamp(0.0, 1.0);
    let [t1, t2, t3, t4] = bloom_taps(sample_rate, seed);
    let longest = t1.max(t2).max(t3).max(t4);

    let mut line_l = TapDelay::new(longest);
    let mut line_r = TapDelay::new(longest);
    let (mut hp_l, mut hp_r) = (0.0f32, 0.0f32);
    let mut lp_l = OnePole::from_alpha(0.08 + 0.10 * amt);
    let mut lp_r = OnePole::from_alpha(0.08 + 0.10 * amt);
    let feedback = 0.28 + 0.42 * amt;
    let wet = 0.11 + 0.28 * amt;

    let Some((left, right)) = buffer.stereo_mut() else {
        return;
    };

    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let fb_l = line_r.tap(t1) * 0.41 + line_l.tap(t2) * 0.29 - line_r.tap(t3) * 0.18
            + line_l.tap(t4) * 0.13;
        let fb_r = line_l.tap(t1) * 0.41 + line_r.tap(t2) * 0.29 - line_l.tap(t3) * 0.18
            + line_r.tap(t4) * 0.13;

        let d_l = (*l + fb_l * feedback).tanh();
        let d_r = (*r + fb_r * feedback).tanh();
        line_l.write(d_l);
        line_r.write(d_r);

        let mid = 0.5 * (d_l + d_r);
        hp_l = HP_COEFF * (hp_l + d_l - mid);
        hp_r = HP_COEFF * (hp_r + d_r - mid);

        *l += lp_l.process(hp_l) * wet;
        *r += lp_r.process(hp_r) * wet;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_per_mode() {
        assert!((bloom_amount(Mode::Granular, 0.0) - 0.35).abs() < 1e-6);
        assert!((bloom_amount(Mode::Spectral, 0.5) - 0.525).abs() < 1e-6);
        assert!((bloom_amount(Mode::Hybrid, 0.0) - 0.53).abs() < 1e-6);
        assert_eq!(bloom_amount(Mode::Ikeda, 1.0), 1.0);
    }

    #[test]
    fn taps_within_ranges() {
        let rate = 48_000.0;
        for seed in [1, 777, 12345 + BLOOM_SEED_OFFSET] {
            let taps = bloom_taps(rate, seed);
            for (tap, (base, spread)) in taps.iter().zip(TAP_RANGES) {
                let lo = (base * rate).round() as usize;
                let hi = ((base + spread) * rate).round() as usize;
                assert!((lo..=hi).contains(tap), "tap {tap} outside {lo}..={hi}");
            }
        }
    }

    #[test]
    fn short_or_mono_untouched() {
        let mut short = SampleBuffer::from_stereo(vec![0.5; 8], vec![0.5; 8]);
        apply_bloom(&mut short, 48_000.0, 1, 1.0);
        assert!(short.channel(0).iter().all(|&s| s == 0.5));

        let mut mono = SampleBuffer::from_mono(vec![0.5; 64]);
        apply_bloom(&mut mono, 48_000.0, 1, 1.0);
        assert!(mono.channel(0).iter().all(|&s| s == 0.5));
    }

    #[test]
    fn mono_content_is_mostly_rejected() {
        // identical channels cancel in the mid-removal high-pass
        let mut buf = SampleBuffer::from_stereo(vec![0.3; 4096], vec![0.3; 4096]);
        let before = buf.clone();
        apply_bloom(&mut buf, 8_000.0, 42, 0.8);
        for (a, b) in buf.channel(0).iter().zip(before.channel(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn wide_content_blooms() {
        let n = 4096;
        let mut buf = SampleBuffer::from_stereo(
            (0..n).map(|i| if i % 97 == 0 { 0.8 } else { 0.0 }).collect(),
            vec![0.0; n],
        );
        let before = buf.clone();
        apply_bloom(&mut buf, 8_000.0, 42, 0.8);
        assert_ne!(buf, before);
        assert!(buf.iter_channels().flatten().all(|s| s.is_finite()));
    }
}
