//! Hybrid unfolding: spectral output diffused through a granular pass.

use unfoldings_core::{SampleBuffer, lerp};

use super::granular::{GranularParams, unfold_granular};
use super::spectral::unfold_spectral;
use super::{UnfoldContext, offset_seed};

/// Seed offset of the diffusing granular pass.
pub const GRANULAR_SEED_OFFSET: i32 = 9176;

/// Renders the hybrid mode.
///
/// The granular pass reads the spectral output at the host rate, with grains
/// 1.35x longer and overlap raised by 1.5.
pub fn unfold_hybrid(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    let p = ctx.params;
    let spectral = unfold_spectral(ctx.micro, &ctx.spectral_params());

    let diffused = unfold_granular(
        &spectral,
        &GranularParams {
            micro_rate: ctx.out_rate,
            out_rate: ctx.out_rate,
            out_seconds: ctx.out_seconds(),
            grain_ms: (p.grain_ms * 1.35).clamp(10.0, 220.0),
            overlap: (p.overlap + 1.5).clamp(2.0, 20.0),
            seed: offset_seed(p.seed, GRANULAR_SEED_OFFSET),
        },
    );

    dry_wet(spectral, &diffused, p.hybrid_mix)
}

/// `dry * lerp(1, 0.55, mix) + wet * lerp(0, 0.85, mix)` over the shorter length.
pub fn dry_wet(dry: SampleBuffer, wet: &SampleBuffer, mix: f32) -> SampleBuffer {
    let mut out = dry;
    out.apply_gain(lerp(1.0, 0.55, mix));
    out.add_from(wet, lerp(0.0, 0.85, mix));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_wet_endpoints() {
        let dry = SampleBuffer::from_stereo(vec![1.0; 4], vec![1.0; 4]);
        let wet = SampleBuffer::from_stereo(vec![2.0; 4], vec![2.0; 4]);

        let all_dry = dry_wet(dry.clone(), &wet, 0.0);
        assert_eq!(all_dry.channel(0), &[1.0; 4]);

        let all_wet = dry_wet(dry, &wet, 1.0);
        assert!((all_wet.sample(1, 2) - (0.55 + 1.7)).abs() < 1e-6);
    }

    #[test]
    fn dry_wet_keeps_dry_length() {
        let dry = SampleBuffer::stereo(10);
        let wet = SampleBuffer::from_stereo(vec![1.0; 4], vec![1.0; 4]);
        let out = dry_wet(dry, &wet, 0.5);
        assert_eq!(out.len(), 10);
        assert_eq!(out.sample(0, 9), 0.0);
        assert!(out.sample(0, 3) > 0.0);
    }
}
