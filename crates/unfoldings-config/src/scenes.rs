//! Beauty scenes.
//!
//! A scene overwrites ten parameters with a fixed style. The scene choice
//! itself, the seed, the micro rate and the loop flag are never touched.

use unfoldings_engine::{BeautyScene, Mode};

use crate::error::{ConfigError, Result};
use crate::params::{ParamId, ParameterStore};

/// Values a scene writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    /// Unfolding mode.
    pub mode: Mode,
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
}

/// Parameters a scene overwrites.
pub const SCENE_PARAMS: [ParamId; 10] = [
    ParamId::Mode,
    ParamId::BurstMs,
    ParamId::Density,
    ParamId::OutSeconds,
    ParamId::GrainMs,
    ParamId::Overlap,
    ParamId::Stretch,
    ParamId::Warp,
    ParamId::SpectralChaos,
    ParamId::HybridMix,
];

impl SceneSettings {
    /// `(param, value)` pairs in [`SCENE_PARAMS`] order.
    pub fn values(&self) -> [(ParamId, f32); 10] {
        [
            (ParamId::Mode, self.mode.index() as f32),
            (ParamId::BurstMs, self.burst_ms),
            (ParamId::Density, self.density as f32),
            (ParamId::OutSeconds, self.out_seconds),
            (ParamId::GrainMs, self.grain_ms),
            (ParamId::Overlap, self.overlap),
            (ParamId::Stretch, self.stretch),
            (ParamId::Warp, self.warp),
            (ParamId::SpectralChaos, self.spectral_chaos),
            (ParamId::HybridMix, self.hybrid_mix),
        ]
    }
}

/// Settings of `scene`; `None` for [`BeautyScene::Off`].
pub fn scene_settings(scene: BeautyScene) -> Option<SceneSettings> {
    let settings = match scene {
        BeautyScene::Off => return None,
        BeautyScene::Lush => SceneSettings {
            mode: Mode::Hybrid,
            burst_ms: 38.0,
            density: 12000,
            out_seconds: 11.0,
            grain_ms: 78.0,
            overlap: 10.0,
            stretch: 28.0,
            warp: 1.4,
            spectral_chaos: 0.62,
            hybrid_mix: 0.72,
        },
        BeautyScene::Crystalline => SceneSettings {
            mode: Mode::Spectral,
            burst_ms: 18.0,
            density: 9000,
            out_seconds: 8.0,
            grain_ms: 24.0,
            overlap: 5.0,
            stretch: 34.0,
            warp: 2.9,
            spectral_chaos: 0.78,
            hybrid_mix: 0.25,
        },
        BeautyScene::Dramatic => SceneSettings {
            mode: Mode::Hybrid,
            burst_ms: 52.0,
            density: 18000,
            out_seconds: 14.0,
            grain_ms: 95.0,
            overlap: 12.5,
            stretch: 42.0,
            warp: 1.9,
            spectral_chaos: 0.93,
            hybrid_mix: 0.84,
        },
    };
    Some(settings)
}

/// Scene for a parameter index.
pub fn scene_from_index(index: i32) -> Result<BeautyScene> {
    BeautyScene::from_index(index).ok_or(ConfigError::SceneOutOfRange(index))
}

/// Scene by name or index, ignoring ASCII case.
pub fn resolve_scene(key: &str) -> Result<BeautyScene> {
    let key = key.trim();
    if let Ok(index) = key.parse::<i32>() {
        return scene_from_index(index);
    }
    BeautyScene::ALL
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(key))
        .ok_or_else(|| ConfigError::invalid_choice(ParamId::BeautyScene.id(), key))
}

/// Writes `scene` into `store`. Returns false for [`BeautyScene::Off`].
pub fn apply_scene(store: &mut ParameterStore, scene: BeautyScene) -> bool {
    let Some(settings) = scene_settings(scene) else {
        return false;
    };
    for (id, value) in settings.values() {
        store.set(id, value);
    }
    tracing::debug!(scene = %scene, "beauty scene applied");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_changes_nothing() {
        let mut store = ParameterStore::new();
        store.set(ParamId::Warp, 4.4);
        let before = store.clone();
        assert!(!apply_scene(&mut store, BeautyScene::Off));
        assert_eq!(store, before);
    }

    #[test]
    fn crystalline_values() {
        let mut store = ParameterStore::new();
        assert!(apply_scene(&mut store, BeautyScene::Crystalline));
        assert_eq!(store.mode(), Mode::Spectral);
        assert_eq!(store.get(ParamId::Density), 9000.0);
        assert_eq!(store.get(ParamId::Warp), 2.9);
        assert_eq!(store.get(ParamId::HybridMix), 0.25);
    }

    #[test]
    fn untouched_parameters_survive() {
        let mut store = ParameterStore::new();
        store.set(ParamId::Seed, 4242.0);
        store.set_looping(false);
        store.set(ParamId::MicroRate, 0.0);
        store.set(ParamId::BeautyScene, 0.0);
        apply_scene(&mut store, BeautyScene::Dramatic);
        assert_eq!(store.seed(), 4242);
        assert!(!store.looping());
        assert_eq!(store.get(ParamId::MicroRate), 0.0);
        assert_eq!(store.get(ParamId::BeautyScene), 0.0);
    }

    #[test]
    fn applies_stored_scene() {
        let mut store = ParameterStore::new();
        store.apply_beauty_scene();
        assert_eq!(store.get(ParamId::OutSeconds), 11.0);
        assert_eq!(store.mode(), Mode::Hybrid);
    }

    #[test]
    fn scene_lookup() {
        assert_eq!(scene_from_index(3).unwrap(), BeautyScene::Dramatic);
        assert!(matches!(scene_from_index(4), Err(ConfigError::SceneOutOfRange(4))));
        assert_eq!(resolve_scene("lush").unwrap(), BeautyScene::Lush);
        assert_eq!(resolve_scene("0").unwrap(), BeautyScene::Off);
        assert!(matches!(
            resolve_scene("glossy"),
            Err(ConfigError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn scene_values_are_in_range() {
        for scene in BeautyScene::ALL {
            if let Some(settings) = scene_settings(scene) {
                for (id, value) in settings.values() {
                    assert_eq!(id.spec().clamp(value), value, "{scene} {id:?}");
                }
            }
        }
    }
}
