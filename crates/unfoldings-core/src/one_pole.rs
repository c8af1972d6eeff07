//! One-pole smoothing lowpass.
//!
//! ```text
//! y[n] = y[n-1] + alpha * (x[n] - y[n-1])
//! ```
//!
//! `alpha` is either given directly (the Bloom stage derives it from its
//! amount) or computed from a cutoff as `1 - exp(-2π * freq / sample_rate)`.
//!
//! ```rust
//! use unfoldings_core::OnePole;
//!
//! let mut lp = OnePole::from_alpha(0.1);
//! assert!((lp.process(1.0) - 0.1).abs() < 1e-7);
//! ```

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass.
///
/// # Invariants
///
/// - `alpha` is in `[0, 1]`
/// - `state` is flushed to zero when below 1e-20
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    alpha: f32,
}

impl OnePole {
    /// Lowpass with a -3 dB cutoff at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let alpha = 1.0 - expf(-core::f32::consts::TAU * freq_hz / sample_rate);
        Self::from_alpha(alpha)
    }

    /// Lowpass with an explicit smoothing factor, clamped into `[0, 1]`.
    pub fn from_alpha(alpha: f32) -> Self {
        Self {
            state: 0.0,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Smoothing factor.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(self.state + self.alpha * (input - self.state));
        self.state
    }

    /// Reset state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
