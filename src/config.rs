//! Game Configuration
//!
//! JSON configuration for the game layer. Every field has a default, so an
//! empty object (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use crate::game::session::SessionConfig;
use crate::guns::gun::Gun;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ARENA_CONFIG";

/// Errors loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for [`GameConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game layer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Session tick period (ms). One tick is one game-second.
    pub tick_interval_ms: u64,
    /// Seed for spread, damage and map selection.
    pub rng_seed: u64,
    /// Defaults for new arena sessions.
    pub session: SessionConfig,
    /// Directory arena worlds are copied into.
    pub worlds_dir: PathBuf,
    /// Directory holding source maps, one directory per map.
    pub maps_dir: PathBuf,
    /// Guns registered at startup.
    pub guns: Vec<Gun>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: crate::TICK_INTERVAL_MS,
            rng_seed: 0x5EED,
            session: SessionConfig::default(),
            worlds_dir: PathBuf::from("worlds"),
            maps_dir: PathBuf::from("maps"),
            guns: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load from the file named by `ARENA_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.session.max_players, 16);
    }

    #[test]
    fn test_partial_session_override() {
        let config = GameConfig::from_json_str(
            r#"{ "rng_seed": 7, "session": { "max_players": 4, "warmup_secs": 3 } }"#,
        )
        .unwrap();

        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.session.max_players, 4);
        assert_eq!(config.session.warmup_secs, 3);
        assert_eq!(config.session.min_players, 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tick_interval_ms": 250, "maps_dir": "/srv/maps" }}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.maps_dir, PathBuf::from("/srv/maps"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(GameConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
        assert!(matches!(GameConfig::load("/definitely/not/here.json"), Err(ConfigError::Io(_))));
    }
}
