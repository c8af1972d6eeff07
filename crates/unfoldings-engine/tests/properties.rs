//! Property-based tests over the parameter space.
//!
//! Every render must come out finite, bounded by the peak target and of the
//! nominal length, whatever the mode and continuous parameters.

use proptest::prelude::*;
use unfoldings_engine::{DEFAULT_PEAK_TARGET, MicroRate, Mode, RenderParameters, Renderer};

const HOST_RATE: f64 = 8_000.0;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn renders_are_finite_and_bounded(
        mode_idx in 0i32..8,
        chaos in 0.0f32..=1.0,
        mix in 0.0f32..=1.0,
        stretch in 2.0f32..=100.0,
        warp in 0.5f32..=6.0,
        grain_ms in 8.0f32..=180.0,
        overlap in 1.5f32..=16.0,
        seed in 1i32..=999_999,
    ) {
        let params = RenderParameters {
            mode: Mode::from_index(mode_idx),
            micro_rate: MicroRate::Hz192k,
            burst_ms: 6.0,
            density: 500,
            out_seconds: 1.0,
            grain_ms,
            overlap,
            stretch,
            warp,
            spectral_chaos: chaos,
            hybrid_mix: mix,
            seed,
            ..RenderParameters::default()
        };
        let out = Renderer::new(HOST_RATE).render(&params);

        prop_assert_eq!(out.num_channels(), 2);
        prop_assert_eq!(out.len(), 8_000);
        for s in out.iter_channels().flatten() {
            prop_assert!(s.is_finite(), "non-finite sample in {}", params.mode);
            prop_assert!(s.abs() <= DEFAULT_PEAK_TARGET + 1e-4, "{} exceeds target in {}", s, params.mode);
        }
    }

    #[test]
    fn clamped_parameters_are_in_range(
        burst in -1e6f32..1e6,
        out_secs in -1e3f32..1e3,
        chaos in -10.0f32..10.0,
        warp in -10.0f32..50.0,
    ) {
        let p = RenderParameters {
            burst_ms: burst,
            out_seconds: out_secs,
            spectral_chaos: chaos,
            warp,
            ..RenderParameters::default()
        }
        .clamped();
        prop_assert!((5.0..=80.0).contains(&p.burst_ms));
        prop_assert!((1.0..=20.0).contains(&p.out_seconds));
        prop_assert!((0.0..=1.0).contains(&p.spectral_chaos));
        prop_assert!((0.5..=6.0).contains(&p.warp));
    }
}
