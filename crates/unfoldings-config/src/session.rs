//! Saved parameter state.
//!
//! A session is a TOML file with one `[params]` entry per parameter id.
//! Choice parameters are written by option name, the loop flag as a bool,
//! integers as integers:
//!
//! ```toml
//! host_sample_rate = 48000.0
//!
//! [params]
//! mode = "Spectral"
//! density = 2800
//! loop = true
//! warp = 5.6
//! ```
//!
//! Loading validates every entry before writing any of them, so a bad file
//! leaves the store as it was.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::params::{ParamId, ParamKind, ParameterStore};

/// Serialized parameter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    /// Host rate the session was rendered at, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_sample_rate: Option<f64>,
    /// Values keyed by parameter id.
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,
}

impl Session {
    /// Captures every parameter of `store`.
    pub fn from_store(store: &ParameterStore, host_sample_rate: Option<f64>) -> Self {
        let params = store
            .iter()
            .map(|(id, value)| (id.id().to_string(), to_toml_value(id, value)))
            .collect();
        Self {
            host_sample_rate,
            params,
        }
    }

    /// Writes the session into `store`. Parameters the session omits keep
    /// their current values.
    pub fn apply_to(&self, store: &mut ParameterStore) -> Result<()> {
        let mut parsed = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            let id =
                ParamId::from_id(key).ok_or_else(|| ConfigError::UnknownParameter(key.clone()))?;
            parsed.push((id, from_toml_value(id, value)?));
        }
        for (id, value) in parsed {
            store.set(id, value);
        }
        Ok(())
    }

    /// A default store with the session applied.
    pub fn to_store(&self) -> Result<ParameterStore> {
        let mut store = ParameterStore::new();
        self.apply_to(&mut store)?;
        Ok(store)
    }

    /// Parses a session from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the session as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads a session file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let session = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), entries = session.params.len(), "session loaded");
        Ok(session)
    }

    /// Saves to `path`, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }
}

fn to_toml_value(id: ParamId, value: f32) -> toml::Value {
    let spec = id.spec();
    match spec.kind {
        ParamKind::Choice(_) => toml::Value::String(spec.format(value)),
        ParamKind::Bool => toml::Value::Boolean(value >= 0.5),
        ParamKind::Int => toml::Value::Integer(value as i64),
        // shortest f32 text, so 0.45 is written as 0.45 rather than its f64 widening
        ParamKind::Float => {
            toml::Value::Float(value.to_string().parse().unwrap_or(f64::from(value)))
        }
    }
}

fn from_toml_value(id: ParamId, value: &toml::Value) -> Result<f32> {
    let invalid = || ConfigError::invalid_choice(id.id(), value.to_string());
    match value {
        toml::Value::Float(v) => Ok(*v as f32),
        toml::Value::Integer(v) => Ok(*v as f32),
        toml::Value::Boolean(v) => Ok(if *v { 1.0 } else { 0.0 }),
        toml::Value::String(s) => id
            .spec()
            .choice_index(s)
            .map(|i| i as f32)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_written_by_name() {
        let session = Session::from_store(&ParameterStore::new(), None);
        assert_eq!(
            session.params.get("mode"),
            Some(&toml::Value::String("Granular".into()))
        );
        assert_eq!(
            session.params.get("microRate"),
            Some(&toml::Value::String("768000".into()))
        );
        assert_eq!(session.params.get("loop"), Some(&toml::Value::Boolean(true)));
        assert_eq!(session.params.get("seed"), Some(&toml::Value::Integer(12345)));
        assert_eq!(session.params.get("spectralChaos"), Some(&toml::Value::Float(0.45)));
    }

    #[test]
    fn toml_round_trip_is_exact() {
        let mut store = ParameterStore::new();
        store.set(ParamId::Warp, 5.6);
        store.set(ParamId::HybridMix, 0.04);
        store.set_looping(false);
        let text = Session::from_store(&store, Some(44_100.0)).to_toml().unwrap();
        let back = Session::from_toml(&text).unwrap();
        assert_eq!(back.host_sample_rate, Some(44_100.0));
        assert_eq!(back.to_store().unwrap(), store);
    }

    #[test]
    fn unknown_key_rejected_and_store_untouched() {
        let session = Session::from_toml(
            r#"
            [params]
            warp = 3.0
            gain = 1.0
            "#,
        )
        .unwrap();
        let mut store = ParameterStore::new();
        let before = store.clone();
        assert!(matches!(
            session.apply_to(&mut store),
            Err(ConfigError::UnknownParameter(ref k)) if k == "gain"
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn bad_choice_rejected() {
        let session = Session::from_toml("[params]\nmode = \"Reverb\"\n").unwrap();
        assert!(matches!(
            session.to_store(),
            Err(ConfigError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn partial_session_keeps_other_values() {
        let session = Session::from_toml("[params]\nseed = 7\nmode = \"ikeda\"\n").unwrap();
        let store = session.to_store().unwrap();
        assert_eq!(store.seed(), 7);
        assert_eq!(store.get(ParamId::Mode), 7.0);
        assert_eq!(store.get(ParamId::Warp), 1.7);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let session = Session::from_toml("[params]\ndensity = 90000\nwarp = -2.0\n").unwrap();
        let store = session.to_store().unwrap();
        assert_eq!(store.get(ParamId::Density), 30000.0);
        assert_eq!(store.get(ParamId::Warp), 0.5);
    }

    #[test]
    fn unknown_top_level_field_is_parse_error() {
        assert!(matches!(
            Session::from_toml("volume = 3\n"),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
