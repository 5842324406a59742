use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_SPEED, FLASH_INTERVAL_MS, FLASH_TIME_MS, FPS, FRIGHTENED_SECONDS,
    GHOST_CAPTURE_BASE_VALUE, LARGE_PELLET_VALUE, RELEASE_TIMER_SECONDS, SMALL_PELLET_VALUE,
    STARTING_LIVES, TILE_SIZE,
};
use crate::error::{EngineError, Result};

/// Immutable round parameters handed to every component at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub tile_size: f32,
    pub fps: u32,
    pub base_speed: f32,
    pub frightened_seconds: f32,
    pub release_timer_seconds: f32,
    pub ghost_capture_base_value: u32,
    pub small_pellet_value: u32,
    pub large_pellet_value: u32,
    pub starting_lives: u32,
    pub flash_time_ms: u64,
    pub flash_interval_ms: u64,
    pub seed: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            fps: FPS,
            base_speed: BASE_SPEED,
            frightened_seconds: FRIGHTENED_SECONDS,
            release_timer_seconds: RELEASE_TIMER_SECONDS,
            ghost_capture_base_value: GHOST_CAPTURE_BASE_VALUE,
            small_pellet_value: SMALL_PELLET_VALUE,
            large_pellet_value: LARGE_PELLET_VALUE,
            starting_lives: STARTING_LIVES,
            flash_time_ms: FLASH_TIME_MS,
            flash_interval_ms: FLASH_INTERVAL_MS,
            seed: 1,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Frame duration at the configured rate, in seconds.
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tile_size.is_finite() && self.tile_size >= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "tileSize must be at least 1, got {}",
                self.tile_size
            )));
        }
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "baseSpeed must be positive, got {}",
                self.base_speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_keys() {
        let config = SimulationConfig::from_json_str(r#"{"seed":42,"frightenedSeconds":3.5}"#)
            .expect("config should parse");
        assert_eq!(config.seed, 42);
        assert_eq!(config.frightened_seconds, 3.5);
        assert_eq!(config.tile_size, TILE_SIZE);
        assert_eq!(config.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let result = SimulationConfig::from_json_str(r#"{"tileSize":0}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("pacman-round-engine-missing-config.json");
        let error = SimulationConfig::from_json_file(&path).expect_err("file does not exist");
        assert!(error.to_string().contains("pacman-round-engine-missing-config.json"));
    }
}
