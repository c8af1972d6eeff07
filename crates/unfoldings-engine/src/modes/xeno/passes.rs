//! The three Xeno transform passes.
//!
//! Each pass clones the buffer first and reads only from that snapshot while
//! adding into the live buffer, so no pass ever hears its own output.

use unfoldings_core::{SampleBuffer, TWO_PI, Xorshift32, raised_cosine};

const PRIME_HOPS: [i64; 8] = [2, 3, 5, 7, 11, 13, 17, 19];

/// Shared inputs of the passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassGeometry {
    /// Output sample rate in Hz.
    pub rate: f64,
    /// Flavour in `0..4`.
    pub flavor: u32,
    /// Chaos in `[0, 1]`.
    pub chaos: f32,
    /// User seed.
    pub seed: i32,
}

/// Segment length and hop of the fold pass.
pub fn fold_segment(geometry: &PassGeometry) -> (usize, usize) {
    let f = geometry.flavor as f32;
    let secs = (0.010 + 0.020 * f) + (0.045 + 0.040 * f) * geometry.chaos;
    let seg_len = ((geometry.rate * f64::from(secs)).round() as i64).max(64);
    let hop = (seg_len / (2 + i64::from(geometry.flavor % 3))).max(16);
    (seg_len as usize, hop as usize)
}

/// Self-looping fold: Hann-windowed segments copied from a cursor that jumps
/// `stride * seg_len` samples (modulo the length) before every segment.
pub fn fold(out: &mut SampleBuffer, geometry: &PassGeometry) {
    let n = out.len();
    if n == 0 {
        return;
    }
    let snapshot = out.clone();
    let len = n as i64;
    let seed = i64::from(geometry.seed);
    let flavor = i64::from(geometry.flavor);

    let (seg_len, hop) = fold_segment(geometry);
    let stride = 5 + (seed + 3 * flavor).rem_euclid(29);
    let mut cursor = (seed * 37).rem_euclid(len);
    let gain = 0.10 + 0.36 * geometry.chaos;
    let win_denom = seg_len.saturating_sub(1).max(1) as f32;

    for dst in (0..n).step_by(hop) {
        cursor = (cursor + stride * seg_len as i64).rem_euclid(len);
        for k in 0..seg_len {
            let di = dst + k;
            if di >= n {
                break;
            }
            let si = ((cursor + k as i64) % len) as usize;
            let w = raised_cosine(k as f32 / win_denom) * gain;
            for ch in 0..out.num_channels() {
                out.add_sample(ch, di, snapshot.sample(ch, si) * w);
            }
        }
    }
}

/// Phase grammar: a xorshift walk picks one of `5 + flavor` symbols per
/// sample; the symbol sets a prime-hop read-back offset, a polarity, a fold
/// drive and a blend weight for a tanh-folded copy of the delayed signal.
pub fn grammar(out: &mut SampleBuffer, geometry: &PassGeometry) {
    let n = out.len();
    if n == 0 {
        return;
    }
    let snapshot = out.clone();
    let len = n as i64;
    let f = i64::from(geometry.flavor);
    let ff = geometry.flavor as f32;
    let c = geometry.chaos;

    let mut walk = Xorshift32::new((geometry.seed as u32) ^ 0x9e37_79b9);
    let symbol_count = 5 + geometry.flavor;
    let symbol_denom = symbol_count.saturating_sub(1).max(1) as f32;
    let base_blend = 0.04 + (0.18 + 0.05 * ff) * c;

    for i in 0..n {
        let state = walk.next_u32();
        let symbol = (state ^ (i as u32).wrapping_mul(2_654_435_761)) % symbol_count;
        let sym = i64::from(symbol);
        let hop_prime = PRIME_HOPS[(state & 7) as usize];
        let back = (hop_prime * (17 + (7 + f) * sym) + (i as i64 % (29 + (19 + 3 * f) * sym))) % len;
        let read = (i as i64 - back).rem_euclid(len) as usize;

        let src_l = snapshot.sample(0, read);
        let src_r = snapshot.channel_or_last(1)[read];
        let mid = 0.5 * (src_l + src_r);
        let polarity = if (symbol + geometry.flavor) & 1 != 0 {
            -1.0
        } else {
            1.0
        };
        let fold = 0.9 + (2.6 + 0.7 * ff) * c + 0.42 * symbol as f32;
        let blend = base_blend * (0.55 + 0.45 * symbol as f32 / symbol_denom);

        let inject_l = (fold * (src_l + 0.35 * mid)).tanh() * polarity;
        let inject_r = (fold * (src_r - 0.35 * mid)).tanh() * -polarity;
        out.add_sample(0, i, inject_l * blend);
        if out.num_channels() > 1 {
            out.add_sample(1, i, inject_r * blend);
        }
    }
}

/// Base delays (in samples) of the autocatalytic taps.
pub fn catalytic_delays(geometry: &PassGeometry) -> [i64; 3] {
    let f = f64::from(geometry.flavor);
    let c = f64::from(geometry.chaos);
    let rate = geometry.rate;
    let d = |floor: i64, base: f64, per_flavor: f64, chaos_base: f64, chaos_flavor: f64| {
        ((rate * ((base + per_flavor * f) + (chaos_base + chaos_flavor * f) * c)).round() as i64)
            .max(floor)
    };
    [
        d(7, 0.001, 0.0015, 0.007, 0.002),
        d(11, 0.004, 0.0020, 0.010, 0.003),
        d(17, 0.008, 0.0030, 0.014, 0.004),
    ]
}

/// Autocatalytic shadow: three sinusoidally swept taps cross-mixed and
/// folded, with a catalyst coefficient driven by local energy of the live
/// buffer.
pub fn autocatalytic(out: &mut SampleBuffer, geometry: &PassGeometry) {
    let n = out.len();
    if n == 0 || out.num_channels() < 2 {
        return;
    }
    let shadow = out.clone();
    let len = n as i64;
    let c = geometry.chaos;
    let [base1, base2, base3] = catalytic_delays(geometry);
    let (b1, b2, b3) = (base1 as f32, base2 as f32, base3 as f32);
    let denom = (n - 1).max(1) as f32;
    let out_gain = 0.05 + 0.27 * c;

    let sweep = |t: f32, rate: f32, phase: f32, span: f32| {
        ((0.5 + 0.5 * (TWO_PI * (rate * t + phase)).sin()) * span).round() as i64
    };
    let (sh_l, sh_r) = (shadow.channel(0), shadow.channel(1));

    let Some((left, right)) = out.stereo_mut() else {
        return;
    };

    for i in 0..n {
        let t = i as f32 / denom;
        let d1 = base1 + sweep(t, 7.1, 0.0, b2);
        let d2 = base2 + sweep(t, 13.7, 0.3, b3);
        let d3 = base3 + sweep(t, 3.9, 1.1, b1);
        let at = |d: i64| (i as i64 - d).rem_euclid(len) as usize;
        let (r1, r2, r3) = (at(d1), at(d2), at(d3));

        let energy = 0.5 * (left[i].abs() + right[i].abs());
        let catalyst = ((0.15 + 0.85 * c) * (0.3 + 2.3 * energy)).clamp(0.0, 1.0);
        let mix_a = 0.53 - 0.23 * catalyst;
        let mix_b = 0.31 + 0.17 * catalyst;
        let mix_c = 0.16 + 0.21 * catalyst;
        let drive = 1.0 + 2.0 * catalyst;

        let resyn_l = ((mix_a * sh_l[r1] + mix_b * sh_r[r2] - mix_c * sh_l[r3]) * drive).tanh();
        let resyn_r = ((mix_a * sh_r[r1] + mix_b * sh_l[r2] - mix_c * sh_r[r3]) * drive).tanh();

        left[i] += resyn_l * out_gain;
        right[i] += resyn_r * out_gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(flavor: u32, chaos: f32) -> PassGeometry {
        PassGeometry {
            rate: 48_000.0,
            flavor,
            chaos,
            seed: 777,
        }
    }

    fn ramp(n: usize) -> SampleBuffer {
        SampleBuffer::from_stereo(
            (0..n).map(|i| ((i as f32) * 0.01).sin() * 0.5).collect(),
            (0..n).map(|i| ((i as f32) * 0.013).cos() * 0.5).collect(),
        )
    }

    #[test]
    fn fold_segment_minimums() {
        let (seg, hop) = fold_segment(&PassGeometry {
            rate: 1000.0,
            ..geometry(0, 0.0)
        });
        assert_eq!(seg, 64);
        assert_eq!(hop, 32);

        let (seg, hop) = fold_segment(&geometry(2, 1.0));
        // 48000 * (0.05 + 0.125) = 8400, hop = 8400 / (2 + 2)
        assert_eq!(seg, 8400);
        assert_eq!(hop, 2100);
    }

    #[test]
    fn catalytic_delay_floors() {
        let d = catalytic_delays(&PassGeometry {
            rate: 100.0,
            ..geometry(0, 0.0)
        });
        assert_eq!(d, [7, 11, 17]);
    }

    #[test]
    fn silence_stays_silent() {
        for f in 0..4 {
            let mut buf = SampleBuffer::stereo(4096);
            fold(&mut buf, &geometry(f, 0.8));
            grammar(&mut buf, &geometry(f, 0.8));
            assert_eq!(buf.peak(), 0.0, "flavor {f}");
        }
    }

    #[test]
    fn passes_add_energy_to_signal() {
        for f in 0..4 {
            let base = ramp(8192);
            let mut buf = base.clone();
            fold(&mut buf, &geometry(f, 0.5));
            grammar(&mut buf, &geometry(f, 0.5));
            autocatalytic(&mut buf, &geometry(f, 0.5));
            assert_ne!(buf, base);
            assert!(buf.iter_channels().flatten().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn autocatalytic_injection_is_bounded() {
        let base = ramp(4096);
        let mut buf = base.clone();
        autocatalytic(&mut buf, &geometry(1, 1.0));
        for ch in 0..2 {
            for (a, b) in buf.channel(ch).iter().zip(base.channel(ch)) {
                assert!((a - b).abs() <= 0.32 + 1e-6);
            }
        }
    }

    #[test]
    fn tiny_buffers_are_safe() {
        let mut buf = ramp(3);
        let g = geometry(3, 1.0);
        fold(&mut buf, &g);
        grammar(&mut buf, &g);
        autocatalytic(&mut buf, &g);
        assert_eq!(buf.len(), 3);
    }
}
