//! The factory preset bank.
//!
//! Fifty-one named parameter sets. Applying a preset overwrites every
//! parameter except the loop flag.

use unfoldings_engine::{BeautyScene, MicroRate, Mode, RenderParameters};

use crate::error::{ConfigError, Result};
use crate::params::{ParamId, ParameterStore};

/// One factory preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSpec {
    /// Display name.
    pub name: &'static str,
    /// Unfolding mode.
    pub mode: Mode,
    /// Micro-burst rate.
    pub micro_rate: MicroRate,
    /// Micro-burst length in milliseconds.
    pub burst_ms: f32,
    /// Micro-burst event count.
    pub density: i32,
    /// Output length in seconds.
    pub out_seconds: f32,
    /// Granular grain length in milliseconds.
    pub grain_ms: f32,
    /// Granular overlap.
    pub overlap: f32,
    /// Spectral stretch.
    pub stretch: f32,
    /// Spectral warp.
    pub warp: f32,
    /// Chaos amount.
    pub spectral_chaos: f32,
    /// Hybrid diffusion mix.
    pub hybrid_mix: f32,
    /// Render seed.
    pub seed: i32,
    /// Beauty scene stored with the preset.
    pub beauty_scene: BeautyScene,
}

impl PresetSpec {
    /// Writes the preset into `store`, leaving the loop flag alone.
    pub fn apply_to(&self, store: &mut ParameterStore) {
        store.set_mode(self.mode);
        store.set_micro_rate(self.micro_rate);
        store.set(ParamId::BurstMs, self.burst_ms);
        store.set(ParamId::Density, self.density as f32);
        store.set(ParamId::OutSeconds, self.out_seconds);
        store.set(ParamId::GrainMs, self.grain_ms);
        store.set(ParamId::Overlap, self.overlap);
        store.set(ParamId::Stretch, self.stretch);
        store.set(ParamId::Warp, self.warp);
        store.set(ParamId::SpectralChaos, self.spectral_chaos);
        store.set(ParamId::HybridMix, self.hybrid_mix);
        store.set(ParamId::Seed, self.seed as f32);
        store.set_beauty_scene(self.beauty_scene);
    }

    /// The preset as a render snapshot.
    pub fn to_params(&self) -> RenderParameters {
        RenderParameters {
            mode: self.mode,
            micro_rate: self.micro_rate,
            burst_ms: self.burst_ms,
            density: self.density,
            out_seconds: self.out_seconds,
            grain_ms: self.grain_ms,
            overlap: self.overlap,
            stretch: self.stretch,
            warp: self.warp,
            spectral_chaos: self.spectral_chaos,
            hybrid_mix: self.hybrid_mix,
            seed: self.seed,
            beauty_scene: self.beauty_scene,
        }
    }
}

macro_rules! preset {
    (
        $name:literal, $mode:ident, $rate:ident, $burst:expr, $density:expr, $out:expr,
        $grain:expr, $overlap:expr, $stretch:expr, $warp:expr, $chaos:expr, $mix:expr,
        $seed:expr, $scene:ident
    ) => {
        PresetSpec {
            name: $name,
            mode: Mode::$mode,
            micro_rate: MicroRate::$rate,
            burst_ms: $burst,
            density: $density,
            out_seconds: $out,
            grain_ms: $grain,
            overlap: $overlap,
            stretch: $stretch,
            warp: $warp,
            spectral_chaos: $chaos,
            hybrid_mix: $mix,
            seed: $seed,
            beauty_scene: BeautyScene::$scene,
        }
    };
}

/// Number of factory presets.
pub const PRESET_COUNT: usize = 51;

/// The factory bank in program order.
pub static PRESETS: [PresetSpec; PRESET_COUNT] = [
    preset!("Porcelain Air", Spectral, Hz192k, 6.5, 2800, 3.6, 8.0, 1.9, 14.0, 5.6, 0.08, 0.04, 1101, Off),
    preset!("Tape Halo", Morphogen, Hz384k, 26.0, 7400, 9.0, 62.0, 7.4, 22.0, 1.2, 0.28, 0.64, 2202, Lush),
    preset!("Star Fracture", Xeno, Hz1536k, 9.0, 7000, 5.6, 12.0, 2.4, 74.0, 5.6, 0.98, 0.08, 3303, Crystalline),
    preset!("Coal Cathedral", Hybrid, Hz768k, 62.0, 24_000, 18.0, 150.0, 15.8, 52.0, 1.4, 0.88, 0.93, 4404, Dramatic),
    preset!("Needle Rain", Granular, Hz1536k, 16.0, 5400, 7.2, 22.0, 4.2, 14.0, 2.5, 0.36, 0.30, 5505, Off),
    preset!("Salt Bells", Spectral, Hz768k, 8.4, 3900, 4.4, 9.0, 2.1, 64.0, 5.8, 0.86, 0.03, 6606, Crystalline),
    preset!("Moss Choir", Morphogen, Hz384k, 44.0, 11_800, 13.5, 102.0, 12.4, 30.0, 1.6, 0.54, 0.82, 7707, Lush),
    preset!("Rust Sparks", Xeno, Hz384k, 26.0, 18_600, 9.8, 26.0, 6.8, 18.0, 1.4, 0.67, 0.62, 8808, Off),
    preset!("Frozen Organ", Hybrid, Hz1536k, 36.0, 15_000, 12.0, 66.0, 8.9, 40.0, 2.9, 0.73, 0.69, 9909, Dramatic),
    preset!("Paper Wind", Granular, Hz192k, 30.0, 4100, 10.0, 86.0, 10.5, 10.0, 1.0, 0.18, 0.42, 1110, Off),
    preset!("Chrome Bloom", Spectral, Hz768k, 14.0, 8200, 7.5, 16.0, 3.3, 50.0, 3.9, 0.67, 0.11, 1212, Crystalline),
    preset!("Velour Sea", Hybrid, Hz768k, 52.0, 10_400, 15.2, 128.0, 14.0, 24.0, 1.1, 0.33, 0.89, 1313, Lush),
    preset!("Glitch Psalms", Xeno, Hz1536k, 31.0, 28_000, 12.2, 34.0, 4.2, 92.0, 3.0, 1.00, 0.12, 1414, Dramatic),
    preset!("Ivory Mist", Morphogen, Hz384k, 18.0, 5800, 8.8, 20.0, 3.8, 28.0, 2.1, 0.31, 0.18, 1515, Off),
    preset!("Tin Jungle", Granular, Hz768k, 28.0, 17_000, 11.0, 40.0, 6.0, 12.0, 2.2, 0.62, 0.38, 1616, Off),
    preset!("Night Plume", Hybrid, Hz384k, 58.0, 19_600, 17.0, 140.0, 15.4, 36.0, 1.9, 0.77, 0.87, 1717, Dramatic),
    preset!("Opal Threads", Morphogen, Hz768k, 14.0, 6200, 10.8, 30.0, 4.4, 36.0, 2.8, 0.55, 0.24, 1818, Crystalline),
    preset!("Sunken Choir", Morphogen, Hz192k, 48.0, 9000, 14.6, 116.0, 13.2, 20.0, 1.3, 0.42, 0.84, 1919, Lush),
    preset!("Quartz Static", Xeno, Hz1536k, 6.0, 3000, 4.2, 10.0, 1.8, 54.0, 6.0, 0.90, 0.02, 2020, Off),
    preset!("Monolith Flood", Hybrid, Hz768k, 64.0, 28_000, 19.5, 160.0, 16.0, 56.0, 2.2, 1.00, 0.95, 2121, Dramatic),
    preset!("Glass Drizzle", Spectral, Hz192k, 5.4, 1800, 2.1, 8.0, 1.6, 32.0, 5.9, 0.22, 0.03, 2301, Crystalline),
    preset!("Abyss Lantern", Morphogen, Hz1536k, 72.0, 25_000, 20.0, 174.0, 16.0, 58.0, 0.9, 0.71, 0.91, 2402, Dramatic),
    preset!("Helix Dust", Xeno, Hz192k, 11.0, 6200, 6.9, 58.0, 13.0, 12.0, 0.7, 0.41, 0.93, 2503, Off),
    preset!("Ion Choir", Hybrid, Hz1536k, 41.0, 9000, 16.3, 132.0, 15.0, 18.0, 1.0, 0.26, 0.98, 2604, Lush),
    preset!("Broken Neutrino", Spectral, Hz1536k, 7.2, 24_000, 5.0, 8.5, 1.7, 96.0, 4.9, 0.97, 0.01, 2705, Off),
    preset!("Pollen Array", Granular, Hz384k, 22.0, 9500, 8.2, 26.0, 3.3, 6.0, 3.1, 0.52, 0.21, 2806, Off),
    preset!("Silt Harmonics", Morphogen, Hz768k, 31.0, 6800, 12.7, 92.0, 9.9, 44.0, 2.8, 0.63, 0.27, 2907, Crystalline),
    preset!("Razor Kelp", Xeno, Hz384k, 14.0, 21_000, 7.1, 16.0, 2.1, 84.0, 5.7, 0.99, 0.06, 3008, Dramatic),
    preset!("Cathedral Frost", Hybrid, Hz192k, 80.0, 5000, 19.0, 180.0, 16.0, 8.0, 0.6, 0.11, 0.99, 3109, Lush),
    preset!("Grit Orbit", Granular, Hz1536k, 13.0, 26_000, 6.5, 14.0, 2.0, 4.0, 4.7, 0.83, 0.12, 3210, Off),
    preset!("Coastal Melt", Fennesz, Hz384k, 46.0, 9000, 14.0, 118.0, 12.8, 24.0, 1.4, 0.32, 0.82, 3301, Lush),
    preset!("Burning Tape Sky", Fennesz, Hz768k, 58.0, 13_000, 17.2, 146.0, 14.6, 30.0, 1.1, 0.58, 0.91, 3302, Dramatic),
    preset!("Soft Rust Choir", Fennesz, Hz192k, 34.0, 7000, 11.8, 96.0, 10.2, 18.0, 1.7, 0.24, 0.73, 3303, Lush),
    preset!("Solar Foam", Fennesz, Hz1536k, 22.0, 5400, 9.6, 68.0, 7.0, 42.0, 2.2, 0.49, 0.64, 3304, Crystalline),
    preset!("Velvet Collapse", Fennesz, Hz768k, 64.0, 18_000, 20.0, 172.0, 16.0, 54.0, 0.9, 0.77, 0.95, 3305, Dramatic),
    preset!("Pulse Lattice A", Noto, Hz1536k, 8.0, 12_000, 6.0, 12.0, 2.2, 48.0, 4.0, 0.68, 0.08, 3401, Off),
    preset!("Pulse Lattice B", Noto, Hz384k, 10.0, 9000, 7.4, 16.0, 3.0, 22.0, 2.0, 0.42, 0.06, 3402, Off),
    preset!("Sparse Click Field", Noto, Hz192k, 6.2, 3500, 5.2, 8.0, 1.6, 14.0, 5.2, 0.21, 0.03, 3403, Off),
    preset!("Grid Failure", Noto, Hz768k, 12.0, 20_000, 8.8, 20.0, 3.4, 70.0, 3.6, 0.92, 0.15, 3404, Dramatic),
    preset!("Binary Rain", Noto, Hz1536k, 16.0, 26_000, 10.2, 24.0, 3.8, 84.0, 2.8, 1.00, 0.18, 3405, Dramatic),
    preset!("Data Monolith", Ikeda, Hz1536k, 7.0, 5000, 6.6, 10.0, 2.0, 40.0, 5.6, 0.84, 0.02, 3501, Off),
    preset!("White Vector", Ikeda, Hz768k, 5.8, 2800, 4.1, 8.0, 1.4, 18.0, 6.0, 0.16, 0.01, 3502, Off),
    preset!("Quantized Beam", Ikeda, Hz384k, 9.4, 4600, 5.8, 10.0, 1.8, 28.0, 4.9, 0.33, 0.02, 3503, Crystalline),
    preset!("Telemetry Storm", Ikeda, Hz1536k, 14.0, 14_000, 9.4, 18.0, 2.9, 76.0, 3.1, 0.96, 0.05, 3504, Dramatic),
    preset!("Atomic Corridor", Ikeda, Hz192k, 11.0, 8000, 8.0, 14.0, 2.2, 52.0, 3.8, 0.59, 0.03, 3505, Crystalline),
    preset!("Diskont Crackle Grid", Noto, Hz768k, 12.5, 22_000, 9.0, 16.0, 2.6, 78.0, 3.8, 0.94, 0.09, 3601, Dramatic),
    preset!("Diskont Skipping Plate", Xeno, Hz384k, 18.0, 17_000, 10.5, 22.0, 3.2, 66.0, 4.6, 0.97, 0.12, 3602, Dramatic),
    preset!("Diskont Data Erosion", Ikeda, Hz1536k, 9.0, 12_000, 8.4, 14.0, 2.4, 58.0, 4.9, 0.88, 0.04, 3603, Off),
    preset!("Ovalcommers Soft Mosaic", Hybrid, Hz768k, 29.0, 11_200, 13.8, 76.0, 9.6, 34.0, 2.7, 0.56, 0.72, 3611, Crystalline),
    preset!("Ovalcommers Bloom Skip", Fennesz, Hz768k, 32.0, 9400, 13.8, 62.0, 8.2, 28.0, 1.9, 0.41, 0.66, 3612, Lush),
    preset!("Ovalcommers Neon Drift", Hybrid, Hz384k, 24.0, 8600, 11.6, 56.0, 7.0, 22.0, 2.2, 0.52, 0.72, 3613, Lush),
];

/// Every preset name in program order.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

/// Preset by program index.
pub fn preset(index: usize) -> Option<&'static PresetSpec> {
    PRESETS.get(index)
}

/// Preset by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> Option<(usize, &'static PresetSpec)> {
    let name = name.trim();
    PRESETS
        .iter()
        .enumerate()
        .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
}

/// Preset by program index or by name.
pub fn resolve_preset(key: &str) -> Result<(usize, &'static PresetSpec)> {
    if let Ok(index) = key.trim().parse::<usize>() {
        return preset(index)
            .map(|p| (index, p))
            .ok_or_else(|| ConfigError::PresetNotFound(key.to_string()));
    }
    find_preset(key).ok_or_else(|| ConfigError::PresetNotFound(key.to_string()))
}

/// Writes preset `index` into `store`. An unknown index leaves the store
/// untouched.
pub fn apply_preset(store: &mut ParameterStore, index: usize) -> Result<&'static PresetSpec> {
    let spec = preset(index).ok_or_else(|| ConfigError::PresetNotFound(index.to_string()))?;
    spec.apply_to(store);
    Ok(spec)
}

/// Mode index of preset `index`; 0 when out of range.
pub fn preset_mode(index: i32) -> i32 {
    usize::try_from(index)
        .ok()
        .and_then(preset)
        .map_or(0, |p| p.mode.index() as i32)
}

/// ARGB display colour of a mode index.
pub fn mode_colour(mode: i32) -> u32 {
    match mode {
        0 => 0xFFCA_CACA,
        1 => 0xFFBF_BFBF,
        2 => 0xFFD8_D8D8,
        3 => 0xFFAF_AFAF,
        4 => 0xFFE2_E2E2,
        5 => 0xFFC4_C4C4,
        6 => 0xFFB4_B4B4,
        7 => 0xFFF0_F0F0,
        _ => 0xFFB8_B8B8,
    }
}

/// ARGB display colour of preset `index`, taken from its mode.
pub fn preset_colour(index: i32) -> u32 {
    mode_colour(preset_mode(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_size_and_unique_names() {
        let names: Vec<_> = preset_names().collect();
        assert_eq!(names.len(), PRESET_COUNT);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), PRESET_COUNT);
    }

    #[test]
    fn applied_presets_land_in_range() {
        for (index, p) in PRESETS.iter().enumerate() {
            let mut store = ParameterStore::new();
            apply_preset(&mut store, index).unwrap();
            assert_eq!(store.snapshot(), p.to_params().clamped(), "{}", p.name);
        }
    }

    #[test]
    fn out_of_range_literal_is_clamped() {
        let (index, _) = find_preset("White Vector").unwrap();
        let mut store = ParameterStore::new();
        apply_preset(&mut store, index).unwrap();
        assert_eq!(store.get(ParamId::Overlap), 1.5);
    }

    #[test]
    fn lookup_by_name_and_index() {
        assert_eq!(find_preset("porcelain air").map(|(i, _)| i), Some(0));
        assert_eq!(resolve_preset("1").unwrap().1.name, "Tape Halo");
        assert!(matches!(
            resolve_preset("No Such Thing"),
            Err(ConfigError::PresetNotFound(_))
        ));
        assert!(matches!(resolve_preset("51"), Err(ConfigError::PresetNotFound(_))));
    }

    #[test]
    fn unknown_index_leaves_store() {
        let mut store = ParameterStore::new();
        store.set(ParamId::Warp, 3.3);
        let before = store.clone();
        assert!(apply_preset(&mut store, PRESET_COUNT).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn apply_keeps_loop_flag() {
        let mut store = ParameterStore::new();
        store.set_looping(false);
        apply_preset(&mut store, 3).unwrap();
        assert!(!store.looping());
        assert_eq!(store.snapshot(), PRESETS[3].to_params());
    }

    #[test]
    fn colours() {
        assert_eq!(preset_mode(0), 1);
        assert_eq!(preset_mode(-1), 0);
        assert_eq!(preset_mode(999), 0);
        assert_eq!(preset_colour(0), 0xFFBF_BFBF);
        assert_eq!(mode_colour(7), 0xFFF0_F0F0);
        assert_eq!(mode_colour(8), 0xFFB8_B8B8);
    }
}
