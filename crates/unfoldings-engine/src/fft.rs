//! FFT wrapper and analysis windows.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Complex sample type used by the spectral engines.
pub type Cf32 = Complex<f32>;

/// Forward/inverse FFT pair of one size.
///
/// Forward transforms are unnormalised; [`Fft::inverse`] scales by `1/size`
/// so a forward/inverse pair is the identity.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Plans both directions for `size` points.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(size),
            ifft: planner.plan_fft_inverse(size),
            size,
        }
    }

    /// Transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform in place.
    pub fn forward(&self, buffer: &mut [Cf32]) {
        self.fft.process(buffer);
    }

    /// Inverse transform in place, normalised by `1/size`.
    pub fn inverse(&self, buffer: &mut [Cf32]) {
        self.ifft.process(buffer);
        let scale = 1.0 / self.size as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

/// Symmetric Hann window: `0.5 - 0.5 cos(2πn / (size - 1))`.
///
/// Both endpoints are zero.
pub fn symmetric_hann(size: usize) -> Vec<f32> {
    let denom = size.saturating_sub(1).max(1) as f32;
    (0..size)
        .map(|n| 0.5 - 0.5 * (TAU * n as f32 / denom).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_identity() {
        let fft = Fft::new(256);
        let input: Vec<Cf32> = (0..256)
            .map(|i| Cf32::new((TAU * 10.0 * i as f32 / 256.0).sin(), 0.0))
            .collect();
        let mut buf = input.clone();
        fft.forward(&mut buf);
        fft.inverse(&mut buf);
        for (a, b) in input.iter().zip(&buf) {
            assert!((a.re - b.re).abs() < 1e-4, "{} vs {}", a.re, b.re);
        }
    }

    #[test]
    fn dc_lands_in_bin_zero() {
        let fft = Fft::new(64);
        let mut buf = vec![Cf32::new(1.0, 0.0); 64];
        fft.forward(&mut buf);
        assert!((buf[0].re - 64.0).abs() < 1e-3);
        let rest: f32 = buf[1..].iter().map(|c| c.norm()).sum();
        assert!(rest < 1e-3);
    }

    #[test]
    fn hann_is_symmetric_and_zero_at_edges() {
        let w = symmetric_hann(2048);
        assert!(w[0].abs() < 1e-7);
        assert!(w[2047].abs() < 1e-5);
        for n in 0..1024 {
            assert!((w[n] - w[2047 - n]).abs() < 1e-5);
        }
    }
}
