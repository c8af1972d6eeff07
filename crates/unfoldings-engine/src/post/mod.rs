//! Shared post-processing applied to every engine's output.
//!
//! The pipeline runs `sanitize -> bloom -> sanitize -> normalize`.

pub mod bloom;

pub use bloom::{BLOOM_SEED_OFFSET, apply_bloom, bloom_amount};

use unfoldings_core::{SampleBuffer, sanitize_soft_clip};

/// Peak the normalizer scales to by default.
pub const DEFAULT_PEAK_TARGET: f32 = 0.95;

/// Peaks at or below this are treated as silence and left alone.
pub const SILENCE_FLOOR: f32 = 1.0e-7;

/// Replaces non-finite samples with zero and soft-clips the rest
/// (`tanh(0.7 x) * 1.35`), bounding every sample to `(-1.35, 1.35)`.
pub fn sanitize(buffer: &mut SampleBuffer) {
    for channel in buffer.iter_channels_mut() {
        for s in channel.iter_mut() {
            *s = sanitize_soft_clip(*s);
        }
    }
}

/// Scales the buffer so its peak equals `target`.
///
/// Returns the gain applied, or `None` if the buffer is effectively silent.
pub fn normalize(buffer: &mut SampleBuffer, target: f32) -> Option<f32> {
    let peak = buffer.peak();
    if peak.is_nan() || peak <= SILENCE_FLOOR {
        return None;
    }
    let gain = target / peak;
    buffer.apply_gain(gain);
    Some(gain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_repairs_non_finite() {
        let mut buf = SampleBuffer::from_stereo(
            vec![f32::NAN, f32::INFINITY, 0.5],
            vec![f32::NEG_INFINITY, 1.0e9, -0.5],
        );
        sanitize(&mut buf);
        assert_eq!(buf.sample(0, 0), 0.0);
        assert_eq!(buf.sample(0, 1), 0.0);
        assert_eq!(buf.sample(1, 0), 0.0);
        assert!((buf.sample(1, 1) - 1.35).abs() < 1e-5);
        assert!((buf.sample(0, 2) + buf.sample(1, 2)).abs() < 1e-7);
        assert!(buf.iter_channels().flatten().all(|s| s.abs() <= 1.35));
    }

    #[test]
    fn normalize_hits_target() {
        let mut buf = SampleBuffer::from_stereo(vec![0.1, -0.4], vec![0.2, 0.3]);
        let gain = normalize(&mut buf, DEFAULT_PEAK_TARGET).unwrap();
        assert!((gain - 0.95 / 0.4).abs() < 1e-5);
        assert!((buf.peak() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut buf = SampleBuffer::from_stereo(vec![0.01, -0.03], vec![0.02, 0.0]);
        normalize(&mut buf, DEFAULT_PEAK_TARGET);
        let once = buf.clone();
        let gain = normalize(&mut buf, DEFAULT_PEAK_TARGET).unwrap();
        assert!((gain - 1.0).abs() < 1e-5);
        for (a, b) in buf.channel(0).iter().zip(once.channel(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn silence_is_not_amplified() {
        let mut buf = SampleBuffer::from_stereo(vec![1e-9; 8], vec![0.0; 8]);
        assert_eq!(normalize(&mut buf, DEFAULT_PEAK_TARGET), None);
        assert_eq!(buf.sample(0, 0), 1e-9);
    }
}
