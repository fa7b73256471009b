//! Game configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! The logical game resolution lives here instead of in process-wide
//! globals; it is handed to the switcher and to every scene factory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config {}: {field} must be a positive size, got {value}", path.display())]
    Invalid {
        path: PathBuf,
        field: &'static str,
        value: f32,
    },
}

/// Game-wide settings shared by the window bootstrap and every scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Window title
    pub title: String,
    /// Logical game width in pixels (render target size)
    pub game_width: f32,
    /// Logical game height in pixels (render target size)
    pub game_height: f32,
    /// Initial window width
    pub window_width: i32,
    /// Initial window height
    pub window_height: i32,
    /// Grid cell size used by scenes until a tilemap provides its own
    pub tile_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "sine".to_string(),
            game_width: 640.0,
            game_height: 360.0,
            window_width: 1280,
            window_height: 720,
            tile_size: 16.0,
        }
    }
}

impl GameConfig {
    /// Parse a config from a RON string. Missing fields take their defaults.
    /// Sizes are not checked here; see [`GameConfig::invalid_field`].
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match config.invalid_field() {
            Some((field, value)) => Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field,
                value,
            }),
            None => Ok(config),
        }
    }

    /// First size that is zero, negative or not finite
    pub fn invalid_field(&self) -> Option<(&'static str, f32)> {
        [
            ("game_width", self.game_width),
            ("game_height", self.game_height),
            ("tile_size", self.tile_size),
        ]
        .into_iter()
        .find(|&(_, value)| !(value.is_finite() && value > 0.0))
    }

    /// Load a config file, falling back to defaults when it is missing or broken
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}, using default config", e);
                Self::default()
            }
        }
    }

    /// Logical game size as a vector
    pub fn game_size(&self) -> macroquad::math::Vec2 {
        macroquad::math::vec2(self.game_width, self.game_height)
    }

    /// Center of the logical game area
    pub fn game_center(&self) -> macroquad::math::Vec2 {
        self.game_size() * 0.5
    }
}
