//! The host-style parameter surface.
//!
//! Fourteen parameters, each described by a static [`ParamSpec`]. The
//! [`ParameterStore`] holds one plain value per parameter, clamps every
//! write into range and produces the [`RenderParameters`] snapshot a render
//! reads.
//!
//! Writes are not snapped to the step grid, so values written from the
//! preset bank read back exactly. Normalised (0..1) values follow the skew
//! convention of a JUCE `NormalisableRange`: `normalised = proportion^skew`.

use unfoldings_engine::{BeautyScene, MicroRate, Mode, RenderParameters};

use crate::error::{ConfigError, Result};

/// Parameter identifiers in surface order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    /// Unfolding mode.
    Mode,
    /// Beauty scene applied before a render.
    BeautyScene,
    /// Micro-burst length.
    BurstMs,
    /// Micro-burst sample rate choice.
    MicroRate,
    /// Micro-burst event count.
    Density,
    /// Output length.
    OutSeconds,
    /// Granular grain length.
    GrainMs,
    /// Granular overlap.
    Overlap,
    /// Spectral stretch.
    Stretch,
    /// Spectral warp.
    Warp,
    /// Chaos amount.
    SpectralChaos,
    /// Hybrid diffusion mix.
    HybridMix,
    /// Playback loop flag.
    Loop,
    /// Render seed.
    Seed,
}

impl ParamId {
    /// Every parameter in surface order.
    pub const ALL: [ParamId; 14] = [
        ParamId::Mode,
        ParamId::BeautyScene,
        ParamId::BurstMs,
        ParamId::MicroRate,
        ParamId::Density,
        ParamId::OutSeconds,
        ParamId::GrainMs,
        ParamId::Overlap,
        ParamId::Stretch,
        ParamId::Warp,
        ParamId::SpectralChaos,
        ParamId::HybridMix,
        ParamId::Loop,
        ParamId::Seed,
    ];

    /// Position on the surface.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable string id, as used in session files.
    pub fn id(self) -> &'static str {
        self.spec().id
    }

    /// Looks up an id, ignoring ASCII case.
    pub fn from_id(id: &str) -> Option<ParamId> {
        let id = id.trim();
        ParamId::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id))
    }

    /// Static descriptor.
    pub fn spec(self) -> &'static ParamSpec {
        &PARAM_SPECS[self.index()]
    }
}

/// Value domain of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous value.
    Float,
    /// Integer value.
    Int,
    /// Index into a list of option names.
    Choice(&'static [&'static str]),
    /// On/off, stored as 0 or 1.
    Bool,
}

/// Option names of the mode choice.
pub const MODE_CHOICES: &[&str] = &[
    "Granular",
    "Spectral",
    "Hybrid",
    "Xeno",
    "Morphogen",
    "Fennesz",
    "Noto",
    "Ikeda",
];

/// Option names of the beauty scene choice.
pub const SCENE_CHOICES: &[&str] = &["Off", "Lush", "Crystalline", "Dramatic"];

/// Option names of the micro rate choice.
pub const MICRO_RATE_CHOICES: &[&str] = &["192000", "384000", "768000", "1536000"];

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Stable string id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Value domain.
    pub kind: ParamKind,
    /// Lowest plain value.
    pub min: f32,
    /// Highest plain value.
    pub max: f32,
    /// Value of a fresh store.
    pub default: f32,
    /// UI step interval (display only; writes are not snapped).
    pub step: f32,
    /// Skew of the normalised mapping; 1 is linear.
    pub skew: f32,
}

impl ParamSpec {
    const fn float(
        id: &'static str,
        name: &'static str,
        range: (f32, f32),
        step: f32,
        skew: f32,
        default: f32,
    ) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Float,
            min: range.0,
            max: range.1,
            default,
            step,
            skew,
        }
    }

    const fn int(id: &'static str, name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Int,
            min,
            max,
            default,
            step: 1.0,
            skew: 1.0,
        }
    }

    const fn choice(
        id: &'static str,
        name: &'static str,
        options: &'static [&'static str],
        default: f32,
    ) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Choice(options),
            min: 0.0,
            max: (options.len() - 1) as f32,
            default,
            step: 1.0,
            skew: 1.0,
        }
    }

    /// Brings a plain value into range. NaN becomes the default; integer,
    /// choice and bool values are rounded.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        match self.kind {
            ParamKind::Float => value.clamp(self.min, self.max),
            ParamKind::Int | ParamKind::Choice(_) => value.round().clamp(self.min, self.max),
            ParamKind::Bool => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Plain value to `[0, 1]`.
    pub fn normalise(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        let proportion = ((self.clamp(value) - self.min) / span).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// `[0, 1]` to a plain value, clamped and rounded like a write.
    pub fn denormalise(&self, normalised: f32) -> f32 {
        let n = if normalised.is_nan() {
            0.0
        } else {
            normalised.clamp(0.0, 1.0)
        };
        let proportion = if self.skew == 1.0 || n == 0.0 {
            n
        } else {
            n.powf(1.0 / self.skew)
        };
        self.clamp(self.min + (self.max - self.min) * proportion)
    }

    /// Option index for a choice name, ignoring ASCII case.
    pub fn choice_index(&self, name: &str) -> Option<usize> {
        match self.kind {
            ParamKind::Choice(options) => options
                .iter()
                .position(|o| o.eq_ignore_ascii_case(name.trim())),
            _ => None,
        }
    }

    /// Human-readable rendering of a plain value.
    pub fn format(&self, value: f32) -> String {
        match self.kind {
            ParamKind::Choice(options) => options
                .get(value.max(0.0) as usize)
                .map_or_else(|| value.to_string(), |s| (*s).to_string()),
            ParamKind::Bool => if value >= 0.5 { "on" } else { "off" }.to_string(),
            ParamKind::Int => format!("{}", value as i64),
            ParamKind::Float => value.to_string(),
        }
    }
}

/// Descriptors of every parameter, indexed by [`ParamId::index`].
pub static PARAM_SPECS: [ParamSpec; 14] = [
    ParamSpec::choice("mode", "Mode", MODE_CHOICES, 0.0),
    ParamSpec::choice("beautyScene", "Beauty Scene", SCENE_CHOICES, 1.0),
    ParamSpec::float("burstMs", "Burst (ms)", (5.0, 80.0), 0.1, 0.35, 24.0),
    ParamSpec::choice("microRate", "Micro Rate", MICRO_RATE_CHOICES, 2.0),
    ParamSpec::int("density", "Event Density", 500.0, 30000.0, 6000.0),
    ParamSpec::float("outSeconds", "Output Seconds", (1.0, 20.0), 0.01, 0.4, 6.0),
    ParamSpec::float("grainMs", "Grain Out (ms)", (8.0, 180.0), 0.1, 0.4, 42.0),
    ParamSpec::float("overlap", "Granular Overlap", (1.5, 16.0), 0.01, 0.4, 6.0),
    ParamSpec::float("stretch", "Spectral Stretch", (2.0, 100.0), 0.01, 0.35, 18.0),
    ParamSpec::float("warp", "Spectral Warp", (0.5, 6.0), 0.001, 0.4, 1.7),
    ParamSpec::float("spectralChaos", "Spectral Chaos", (0.0, 1.0), 0.001, 1.0, 0.45),
    ParamSpec::float("hybridMix", "Hybrid Diffusion Mix", (0.0, 1.0), 0.001, 1.0, 0.5),
    ParamSpec {
        id: "loop",
        name: "Loop",
        kind: ParamKind::Bool,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 1.0,
        skew: 1.0,
    },
    ParamSpec::int("seed", "Seed", 1.0, 999_999.0, 12345.0),
];

/// Plain values of every parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    values: [f32; 14],
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            values: PARAM_SPECS.map(|s| s.default),
        }
    }
}

impl ParameterStore {
    /// Store holding every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores every default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Plain value of `id`.
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    /// Writes a plain value, clamped into range. Returns the stored value.
    pub fn set(&mut self, id: ParamId, value: f32) -> f32 {
        let stored = id.spec().clamp(value);
        self.values[id.index()] = stored;
        stored
    }

    /// Writes by string id.
    pub fn set_by_id(&mut self, id: &str, value: f32) -> Result<f32> {
        let param = ParamId::from_id(id).ok_or_else(|| ConfigError::UnknownParameter(id.to_string()))?;
        Ok(self.set(param, value))
    }

    /// Writes a choice parameter by option name.
    pub fn set_choice(&mut self, id: ParamId, option: &str) -> Result<f32> {
        let index = id
            .spec()
            .choice_index(option)
            .ok_or_else(|| ConfigError::invalid_choice(id.id(), option))?;
        Ok(self.set(id, index as f32))
    }

    /// Normalised value of `id`.
    pub fn normalised(&self, id: ParamId) -> f32 {
        id.spec().normalise(self.get(id))
    }

    /// Writes a normalised value. Returns the stored plain value.
    pub fn set_normalised(&mut self, id: ParamId, normalised: f32) -> f32 {
        let plain = id.spec().denormalise(normalised);
        self.set(id, plain)
    }

    /// `(id, value)` for every parameter in surface order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, f32)> + '_ {
        ParamId::ALL.into_iter().map(|id| (id, self.get(id)))
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        Mode::from_index(self.get(ParamId::Mode) as i32)
    }

    /// Sets the mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.set(ParamId::Mode, mode.index() as f32);
    }

    /// Current micro rate.
    pub fn micro_rate(&self) -> MicroRate {
        MicroRate::from_choice(self.get(ParamId::MicroRate) as i32)
    }

    /// Sets the micro rate.
    pub fn set_micro_rate(&mut self, rate: MicroRate) {
        self.set(ParamId::MicroRate, rate.choice() as f32);
    }

    /// Current beauty scene.
    pub fn beauty_scene(&self) -> BeautyScene {
        BeautyScene::from_index(self.get(ParamId::BeautyScene) as i32).unwrap_or_default()
    }

    /// Sets the beauty scene (without applying it).
    pub fn set_beauty_scene(&mut self, scene: BeautyScene) {
        self.set(ParamId::BeautyScene, scene.index() as f32);
    }

    /// Whether playback loops.
    pub fn looping(&self) -> bool {
        self.get(ParamId::Loop) >= 0.5
    }

    /// Sets the loop flag.
    pub fn set_looping(&mut self, looping: bool) {
        self.set(ParamId::Loop, if looping { 1.0 } else { 0.0 });
    }

    /// Current seed.
    pub fn seed(&self) -> i32 {
        self.get(ParamId::Seed) as i32
    }

    /// Overwrites the scene's parameters with the scene currently stored in
    /// `beautyScene`. Scene Off changes nothing.
    pub fn apply_beauty_scene(&mut self) {
        crate::scenes::apply_scene(self, self.beauty_scene());
    }

    /// Immutable snapshot for a render.
    pub fn snapshot(&self) -> RenderParameters {
        RenderParameters {
            mode: self.mode(),
            micro_rate: self.micro_rate(),
            burst_ms: self.get(ParamId::BurstMs),
            density: self.get(ParamId::Density) as i32,
            out_seconds: self.get(ParamId::OutSeconds),
            grain_ms: self.get(ParamId::GrainMs),
            overlap: self.get(ParamId::Overlap),
            stretch: self.get(ParamId::Stretch),
            warp: self.get(ParamId::Warp),
            spectral_chaos: self.get(ParamId::SpectralChaos),
            hybrid_mix: self.get(ParamId::HybridMix),
            seed: self.seed(),
            beauty_scene: self.beauty_scene(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_table_in_id_order() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_id(id.spec().id), Some(id));
        }
        assert_eq!(ParamId::from_id("SPECTRALCHAOS"), Some(ParamId::SpectralChaos));
        assert_eq!(ParamId::from_id("gain"), None);
    }

    #[test]
    fn defaults_match_render_defaults() {
        assert_eq!(ParameterStore::new().snapshot(), RenderParameters::default());
        assert!(ParameterStore::new().looping());
    }

    #[test]
    fn writes_clamp_and_round() {
        let mut store = ParameterStore::new();
        assert_eq!(store.set(ParamId::BurstMs, 500.0), 80.0);
        assert_eq!(store.set(ParamId::Density, 123.4), 500.0);
        assert_eq!(store.set(ParamId::Density, 7000.6), 7001.0);
        assert_eq!(store.set(ParamId::Mode, 11.0), 7.0);
        assert_eq!(store.set(ParamId::Loop, 0.2), 0.0);
        assert_eq!(store.set(ParamId::Warp, f32::NAN), 1.7);
        assert_eq!(store.set(ParamId::Seed, 0.0), 1.0);
    }

    #[test]
    fn writes_are_not_snapped_to_step() {
        let mut store = ParameterStore::new();
        assert_eq!(store.set(ParamId::BurstMs, 6.54321), 6.54321);
    }

    #[test]
    fn skewed_normalisation() {
        let spec = ParamId::Stretch.spec();
        assert_eq!(spec.normalise(2.0), 0.0);
        assert_eq!(spec.normalise(100.0), 1.0);
        let mid = spec.normalise(51.0);
        assert!((mid - 0.5f32.powf(0.35)).abs() < 1e-6);
        assert!((spec.denormalise(mid) - 51.0).abs() < 1e-3);
    }

    #[test]
    fn linear_normalisation() {
        let spec = ParamId::SpectralChaos.spec();
        assert_eq!(spec.normalise(0.25), 0.25);
        assert_eq!(spec.denormalise(0.75), 0.75);
    }

    #[test]
    fn choices_by_name() {
        let mut store = ParameterStore::new();
        store.set_choice(ParamId::Mode, "xeno").unwrap();
        assert_eq!(store.mode(), Mode::Xeno);
        store.set_choice(ParamId::MicroRate, "1536000").unwrap();
        assert_eq!(store.micro_rate(), MicroRate::Hz1536k);
        assert!(matches!(
            store.set_choice(ParamId::Mode, "reverb"),
            Err(ConfigError::InvalidChoice { .. })
        ));
        assert!(matches!(
            store.set_choice(ParamId::Warp, "fast"),
            Err(ConfigError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn unknown_id_rejected() {
        let mut store = ParameterStore::new();
        assert!(matches!(
            store.set_by_id("gain", 1.0),
            Err(ConfigError::UnknownParameter(ref id)) if id == "gain"
        ));
        assert_eq!(store.set_by_id("seed", 77.0).unwrap(), 77.0);
    }

    #[test]
    fn formatting() {
        assert_eq!(ParamId::Mode.spec().format(3.0), "Xeno");
        assert_eq!(ParamId::Loop.spec().format(1.0), "on");
        assert_eq!(ParamId::Density.spec().format(6000.0), "6000");
        assert_eq!(ParamId::Warp.spec().format(1.7), "1.7");
    }
}
