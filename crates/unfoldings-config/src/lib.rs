//! Parameter surface and preset management for unfoldings.
//!
//! # Features
//!
//! - **Parameters**: the fourteen-parameter surface with ranges, skews and
//!   normalised conversion ([`ParameterStore`])
//! - **Presets**: the 51-entry factory bank ([`PRESETS`])
//! - **Beauty scenes**: style overlays written before a render
//! - **Sessions**: TOML snapshots of the whole surface ([`Session`])
//!
//! # Example
//!
//! ```rust,no_run
//! use unfoldings_config::{ParameterStore, Session, apply_preset, find_preset};
//!
//! let mut store = ParameterStore::new();
//! let (index, _) = find_preset("Tape Halo").unwrap();
//! apply_preset(&mut store, index).unwrap();
//! store.apply_beauty_scene();
//!
//! Session::from_store(&store, Some(48_000.0))
//!     .save("tape-halo.toml")
//!     .unwrap();
//! let params = store.snapshot();
//! ```

mod error;
pub mod params;
pub mod paths;
pub mod presets;
pub mod scenes;
pub mod session;

pub use error::{ConfigError, Result};
pub use params::{PARAM_SPECS, ParamId, ParamKind, ParamSpec, ParameterStore};
pub use presets::{
    PRESET_COUNT, PRESETS, PresetSpec, apply_preset, find_preset, mode_colour, preset,
    preset_colour, preset_mode, preset_names, resolve_preset,
};
pub use scenes::{SceneSettings, apply_scene, resolve_scene, scene_from_index, scene_settings};
pub use session::Session;
