//! Engine configuration and persisted player settings.

use std::fs;
use std::path::Path;

use log::{error, info, warn};

use crate::quiz::QUESTIONS_PER_ROUND;
use crate::store::{ANIMATION_KEY, KeyValueStore, SOUND_KEY, StoreError, TUTORIAL_KEY};

/// Environment variable naming a JSON file with [`EngineConfig`] overrides.
pub const CONFIG_ENV_VAR: &str = "PAINTQUIZ_CONFIG";

fn default_round_size() -> usize {
    QUESTIONS_PER_ROUND
}

fn default_min_pool_size() -> usize {
    4
}

fn default_min_genre_variety() -> usize {
    3
}

/// Tunable round parameters. Every field falls back to its default when
/// missing from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_round_size")]
    pub round_size: usize,
    /// Smallest pool a round may start from.
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: usize,
    /// Distinct genres a pool needs before a genre-mode round may start.
    #[serde(default = "default_min_genre_variety")]
    pub min_genre_variety: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round_size: default_round_size(),
            min_pool_size: default_min_pool_size(),
            min_genre_variety: default_min_genre_variety(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ParseError {
        path: String,
        source: serde_json::Error,
    },
    #[error("round size must be at least 1")]
    EmptyRound,
    #[error("minimum pool size must be at least 1")]
    EmptyPool,
}

impl PartialEq for ConfigError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ReadError { path: left, .. }, Self::ReadError { path: right, .. }) => {
                left == right
            }
            (Self::ParseError { path: left, .. }, Self::ParseError { path: right, .. }) => {
                left == right
            }
            (Self::EmptyRound, Self::EmptyRound) => true,
            (Self::EmptyPool, Self::EmptyPool) => true,
            _ => false,
        }
    }
}

impl Eq for ConfigError {}

impl EngineConfig {
    pub fn from_json_str(origin: &str, json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::ParseError {
            path: origin.to_string(),
            source,
        })?;

        if config.round_size == 0 {
            return Err(ConfigError::EmptyRound);
        }
        if config.min_pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_str(&path.display().to_string(), &contents)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or defaults when the
    /// variable is unset or the file is unusable.
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        match Self::from_path(&path) {
            Ok(config) => {
                info!("loaded engine config from {path}");
                config
            }
            Err(err) => {
                error!("ignoring engine config: {err}");
                Self::default()
            }
        }
    }
}

/// Player toggles kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Settings {
    pub sound_enabled: bool,
    pub animation_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            animation_enabled: true,
        }
    }
}

fn read_flag<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> bool {
    match store.get(key) {
        Ok(value) => value.as_deref() != Some("false"),
        Err(err) => {
            warn!("could not read setting {key}: {err}");
            true
        }
    }
}

impl Settings {
    /// Reads the toggles; anything but an explicit `"false"` means enabled.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self {
            sound_enabled: read_flag(store, SOUND_KEY),
            animation_enabled: read_flag(store, ANIMATION_KEY),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.set(SOUND_KEY, &self.sound_enabled.to_string())?;
        store.set(ANIMATION_KEY, &self.animation_enabled.to_string())
    }
}

/// Whether the introductory slides have been dismissed before.
pub fn tutorial_shown<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    match store.get(TUTORIAL_KEY) {
        Ok(value) => value.is_some(),
        Err(err) => {
            warn!("could not read tutorial flag: {err}");
            false
        }
    }
}

pub fn mark_tutorial_shown<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.set(TUTORIAL_KEY, "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn missing_fields_use_defaults() {
        let config = EngineConfig::from_json_str("inline", r#"{"round_size": 5}"#)
            .expect("partial config should parse");

        assert_eq!(
            config,
            EngineConfig {
                round_size: 5,
                ..EngineConfig::default()
            }
        );
        assert_eq!(EngineConfig::default().round_size, 10);
    }

    #[test]
    fn rejects_empty_rounds() {
        assert_eq!(
            EngineConfig::from_json_str("inline", r#"{"round_size": 0}"#),
            Err(ConfigError::EmptyRound)
        );
    }

    #[test]
    fn rejects_zero_minimum_pool() {
        assert_eq!(
            EngineConfig::from_json_str("inline", r#"{"min_pool_size": 0}"#),
            Err(ConfigError::EmptyPool)
        );
    }

    #[test]
    fn reads_config_from_disk() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("engine.json");
        fs::write(&path, r#"{"min_pool_size": 6, "min_genre_variety": 2}"#)
            .expect("config file should be written");

        let config = EngineConfig::from_path(&path).expect("config should load");

        assert_eq!(config.min_pool_size, 6);
        assert_eq!(config.min_genre_variety, 2);
        assert_eq!(config.round_size, 10);
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("absent.json");

        assert_eq!(
            EngineConfig::from_path(&path),
            Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        );
    }

    #[test]
    fn settings_default_to_enabled() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn settings_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            sound_enabled: false,
            animation_enabled: true,
        };

        settings.save(&mut store).expect("save succeeds");

        assert_eq!(store.get(SOUND_KEY), Ok(Some("false".to_string())));
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn tutorial_flag_persists() {
        let mut store = MemoryStore::new();
        assert!(!tutorial_shown(&store));

        mark_tutorial_shown(&mut store).expect("set succeeds");

        assert!(tutorial_shown(&store));
    }

    #[test]
    fn only_explicit_false_disables() {
        let mut store = MemoryStore::new();
        store.set(ANIMATION_KEY, "0").expect("set succeeds");

        assert!(Settings::load(&store).animation_enabled);
    }
}
