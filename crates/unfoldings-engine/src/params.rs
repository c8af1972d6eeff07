//! Render parameter snapshot and its enumerated choices.
//!
//! [`RenderParameters`] is taken once per render. The engines read it through
//! [`RenderParameters::clamped`] so every continuous value is inside its valid
//! range before any arithmetic touches it.

use std::fmt;
use std::ops::RangeInclusive;

/// Valid ranges of the continuous and integer parameters.
pub mod ranges {
    use std::ops::RangeInclusive;

    /// Micro-burst length in milliseconds.
    pub const BURST_MS: RangeInclusive<f32> = 5.0..=80.0;
    /// Micro-burst event count.
    pub const DENSITY: RangeInclusive<i32> = 500..=30000;
    /// Output length in seconds.
    pub const OUT_SECONDS: RangeInclusive<f32> = 1.0..=20.0;
    /// Granular output grain length in milliseconds.
    pub const GRAIN_MS: RangeInclusive<f32> = 8.0..=180.0;
    /// Grains overlapping at any output position.
    pub const OVERLAP: RangeInclusive<f32> = 1.5..=16.0;
    /// Phase-vocoder synthesis hop over analysis hop.
    pub const STRETCH: RangeInclusive<f32> = 2.0..=100.0;
    /// Spectral warp exponent.
    pub const WARP: RangeInclusive<f32> = 0.5..=6.0;
    /// Spectral chaos amount.
    pub const SPECTRAL_CHAOS: RangeInclusive<f32> = 0.0..=1.0;
    /// Hybrid diffusion mix.
    pub const HYBRID_MIX: RangeInclusive<f32> = 0.0..=1.0;
    /// User seed.
    pub const SEED: RangeInclusive<i32> = 1..=999_999;
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

/// Unfolding algorithm selected for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Windowed grain cloud over the micro-burst.
    #[default]
    Granular,
    /// Phase-vocoder time stretch with spectral reshaping.
    Spectral,
    /// Spectral output diffused through a second granular pass.
    Hybrid,
    /// Spectral + granular + Hénon map with three transform passes.
    Xeno,
    /// Reaction-diffusion spectrogram driving additive resynthesis.
    Morphogen,
    /// Spectral/granular blend with drone and cross-feedback delay.
    Fennesz,
    /// LFSR-gated clicks and bursts.
    Noto,
    /// LFSR-gated quantised oscillator bank.
    Ikeda,
}

impl Mode {
    /// Every mode in parameter order.
    pub const ALL: [Mode; 8] = [
        Mode::Granular,
        Mode::Spectral,
        Mode::Hybrid,
        Mode::Xeno,
        Mode::Morphogen,
        Mode::Fennesz,
        Mode::Noto,
        Mode::Ikeda,
    ];

    /// Parameter index (0..=7).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Mode for a parameter index; values past the end select [`Mode::Ikeda`],
    /// negative values [`Mode::Granular`].
    pub fn from_index(index: i32) -> Mode {
        let i = index.clamp(0, 7) as usize;
        Self::ALL[i]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Granular => "Granular",
            Mode::Spectral => "Spectral",
            Mode::Hybrid => "Hybrid",
            Mode::Xeno => "Xeno",
            Mode::Morphogen => "Morphogen",
            Mode::Fennesz => "Fennesz",
            Mode::Noto => "Noto",
            Mode::Ikeda => "Ikeda",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Mode> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Internal sample rate of the micro-burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MicroRate {
    /// 192 kHz
    Hz192k,
    /// 384 kHz
    Hz384k,
    /// 768 kHz
    #[default]
    Hz768k,
    /// 1.536 MHz
    Hz1536k,
}

impl MicroRate {
    /// Every choice in parameter order.
    pub const ALL: [MicroRate; 4] = [
        MicroRate::Hz192k,
        MicroRate::Hz384k,
        MicroRate::Hz768k,
        MicroRate::Hz1536k,
    ];

    /// Rate in Hz.
    pub fn hz(self) -> f64 {
        match self {
            MicroRate::Hz192k => 192_000.0,
            MicroRate::Hz384k => 384_000.0,
            MicroRate::Hz768k => 768_000.0,
            MicroRate::Hz1536k => 1_536_000.0,
        }
    }

    /// Parameter choice index (0..=3).
    pub fn choice(self) -> usize {
        self as usize
    }

    /// Choice for an index; out-of-range values clamp to the nearest end.
    pub fn from_choice(choice: i32) -> MicroRate {
        Self::ALL[choice.clamp(0, 3) as usize]
    }
}

/// Canned style overlay applied to the parameter surface before a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeautyScene {
    /// No overwrite.
    Off,
    /// Mode 2, long and diffuse.
    #[default]
    Lush,
    /// Mode 1, bright and glassy.
    Crystalline,
    /// Mode 2, dense and loud.
    Dramatic,
}

impl BeautyScene {
    /// Every scene in parameter order.
    pub const ALL: [BeautyScene; 4] = [
        BeautyScene::Off,
        BeautyScene::Lush,
        BeautyScene::Crystalline,
        BeautyScene::Dramatic,
    ];

    /// Parameter index (0..=3).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Scene for an index, `None` when out of range.
    pub fn from_index(index: i32) -> Option<BeautyScene> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            BeautyScene::Off => "Off",
            BeautyScene::Lush => "Lush",
            BeautyScene::Crystalline => "Crystalline",
            BeautyScene::Dramatic => "Dramatic",
        }
    }
}

impl fmt::Display for BeautyScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of everything a render reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    /// Unfolding algorithm.
    pub mode: Mode,
    /// Micro-burst sample rate.
    pub micro_rate: MicroRate,
    /// Micro-burst length in milliseconds.
    pub burst_ms: f32,
    /// Micro-burst event count.
    pub density: i32,
    /// Output length in seconds.
    pub out_seconds: f32,
    /// Granular grain length at the output rate, in milliseconds.
    pub grain_ms: f32,
    /// Granular overlap factor.
    pub overlap: f32,
    /// Spectral time-stretch factor.
    pub stretch: f32,
    /// Spectral warp exponent.
    pub warp: f32,
    /// Chaos amount in `[0, 1]`.
    pub spectral_chaos: f32,
    /// Hybrid diffusion mix in `[0, 1]`.
    pub hybrid_mix: f32,
    /// Seed for every random draw in the render.
    pub seed: i32,
    /// Scene the parameter surface was pre-populated with.
    pub beauty_scene: BeautyScene,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            mode: Mode::Granular,
            micro_rate: MicroRate::Hz768k,
            burst_ms: 24.0,
            density: 6000,
            out_seconds: 6.0,
            grain_ms: 42.0,
            overlap: 6.0,
            stretch: 18.0,
            warp: 1.7,
            spectral_chaos: 0.45,
            hybrid_mix: 0.5,
            seed: 12345,
            beauty_scene: BeautyScene::Lush,
        }
    }
}

impl RenderParameters {
    /// Copy with every continuous parameter clamped into its valid range.
    ///
    /// NaN maps to the range minimum. Density only loses negative values;
    /// seed is left as given.
    pub fn clamped(&self) -> Self {
        Self {
            burst_ms: clamp_to(self.burst_ms, &ranges::BURST_MS),
            density: self.density.max(0),
            out_seconds: clamp_to(self.out_seconds, &ranges::OUT_SECONDS),
            grain_ms: clamp_to(self.grain_ms, &ranges::GRAIN_MS),
            overlap: clamp_to(self.overlap, &ranges::OVERLAP),
            stretch: clamp_to(self.stretch, &ranges::STRETCH),
            warp: clamp_to(self.warp, &ranges::WARP),
            spectral_chaos: clamp_to(self.spectral_chaos, &ranges::SPECTRAL_CHAOS),
            hybrid_mix: clamp_to(self.hybrid_mix, &ranges::HYBRID_MIX),
            ..self.clone()
        }
    }

    /// Output sample count at `out_rate` for this parameter set.
    pub fn out_samples(&self, out_rate: f64) -> usize {
        nominal_len(out_rate, f64::from(self.out_seconds))
    }
}

/// `max(1, round(rate * seconds))`, the length every engine renders.
pub fn nominal_len(rate: f64, seconds: f64) -> usize {
    ((rate * seconds).round() as i64).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_index_round_trip() {
        for (i, mode) in Mode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
            assert_eq!(Mode::from_index(i as i32), *mode);
        }
    }

    #[test]
    fn mode_from_index_clamps() {
        assert_eq!(Mode::from_index(-3), Mode::Granular);
        assert_eq!(Mode::from_index(42), Mode::Ikeda);
    }

    #[test]
    fn mode_from_name_ignores_case() {
        assert_eq!(Mode::from_name("xeno"), Some(Mode::Xeno));
        assert_eq!(Mode::from_name(" MORPHOGEN "), Some(Mode::Morphogen));
        assert_eq!(Mode::from_name("reverb"), None);
    }

    #[test]
    fn micro_rates() {
        let hz: Vec<f64> = MicroRate::ALL.iter().map(|r| r.hz()).collect();
        assert_eq!(hz, vec![192_000.0, 384_000.0, 768_000.0, 1_536_000.0]);
        assert_eq!(MicroRate::from_choice(9), MicroRate::Hz1536k);
    }

    #[test]
    fn scene_from_index() {
        assert_eq!(BeautyScene::from_index(0), Some(BeautyScene::Off));
        assert_eq!(BeautyScene::from_index(3), Some(BeautyScene::Dramatic));
        assert_eq!(BeautyScene::from_index(4), None);
        assert_eq!(BeautyScene::from_index(-1), None);
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let p = RenderParameters {
            burst_ms: 500.0,
            out_seconds: 0.0,
            overlap: f32::NAN,
            spectral_chaos: 4.0,
            hybrid_mix: -1.0,
            density: -10,
            seed: 5_000_000,
            ..RenderParameters::default()
        }
        .clamped();
        assert_eq!(p.burst_ms, 80.0);
        assert_eq!(p.out_seconds, 1.0);
        assert_eq!(p.overlap, 1.5);
        assert_eq!(p.spectral_chaos, 1.0);
        assert_eq!(p.hybrid_mix, 0.0);
        assert_eq!(p.density, 0);
        assert_eq!(p.seed, 5_000_000);
    }

    #[test]
    fn defaults_are_in_range() {
        let p = RenderParameters::default();
        assert_eq!(p, p.clamped());
    }

    #[test]
    fn nominal_len_rounds() {
        assert_eq!(nominal_len(48000.0, 1.0), 48000);
        assert_eq!(nominal_len(44100.0, 0.5), 22050);
        assert_eq!(nominal_len(48000.0, 0.0), 1);
    }
}
