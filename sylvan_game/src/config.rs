use std::path::Path;

use serde::{Deserialize, Serialize};
use sylvan_worldgen::FloraConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("block size must be positive, got {0}")]
    BlockSize(i32),
    #[error("window {width}x{height} is smaller than one block")]
    Window { width: f32, height: f32 },
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("fruit palette is empty")]
    EmptyPalette,
    #[error("foliage size must be at least 2, got {0}")]
    FoliageSize(i32),
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("chunk radii invalid: load {load}, unload {unload}")]
    ChunkRadius { load: i32, unload: i32 },
}

/// Movement and energy constants of the controlled character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Side of the avatar's square box
    pub size: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub max_energy: f32,
    /// Energy gained per fruit eaten
    pub fruit_energy: f32,
    /// Energy regained per frame while standing still
    pub idle_restore: f32,
    /// Energy spent per frame of running
    pub run_cost: f32,
    pub jump_cost: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            run_speed: 400.0,
            jump_speed: 650.0,
            gravity: 600.0,
            max_energy: 100.0,
            fruit_energy: 10.0,
            idle_restore: 1.0,
            run_cost: 0.5,
            jump_cost: 10.0,
        }
    }
}

/// Everything needed to build a world, fixed once the world exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u32,
    pub window_width: f32,
    pub window_height: f32,
    pub block_size: i32,
    /// Seconds for one full day; also the fruit respawn delay
    pub day_night_cycle_length: f32,
    /// Width of a streaming chunk, in columns
    pub chunk_columns: i32,
    pub load_radius: i32,
    pub unload_radius: i32,
    pub flora: FloraConfig,
    pub avatar: AvatarConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            window_width: 800.0,
            window_height: 600.0,
            block_size: 30,
            day_night_cycle_length: 30.0,
            chunk_columns: 16,
            load_radius: 1,
            unload_radius: 2,
            flora: FloraConfig::default(),
            avatar: AvatarConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Read a JSON config; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn chunk_width(&self) -> i32 {
        self.chunk_columns * self.block_size
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size <= 0 {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        let block = self.block_size as f32;
        if self.window_width < block || self.window_height < block {
            return Err(ConfigError::Window {
                width: self.window_width,
                height: self.window_height,
            });
        }

        let recipe = &self.flora.recipe;
        for (name, value) in [
            ("plant_probability", self.flora.plant_probability),
            ("leaf_probability", recipe.leaf_probability),
            ("fruit_probability", recipe.fruit_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        if recipe.fruit_palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if recipe.foliage_size < 2 {
            return Err(ConfigError::FoliageSize(recipe.foliage_size));
        }

        for (name, value) in [
            ("day_night_cycle_length", self.day_night_cycle_length),
            ("leaf_cycle_length", recipe.leaf_cycle_length),
            ("jump_leaf_duration", recipe.jump_leaf_duration),
            ("max_height_blocks", self.flora.max_height_blocks as f32),
            ("chunk_columns", self.chunk_columns as f32),
            ("avatar.size", self.avatar.size),
            ("avatar.max_energy", self.avatar.max_energy),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.load_radius < 0 || self.unload_radius < self.load_radius {
            return Err(ConfigError::ChunkRadius {
                load: self.load_radius,
                unload: self.unload_radius,
            });
        }
        Ok(())
    }
}
