// src/config.rs
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// How the player picks its horizontal speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locomotion {
    // Constant forward run, only jumping is under player control
    #[default]
    AutoRun,
    // A/D steer with acceleration, skidding and idling
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub jump_power: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub skid_threshold: f32,
    pub skid_deceleration: f32,
    pub run_speed: f32,
    pub booster_power: f32,
    pub locomotion: Locomotion,
    pub width: f32,
    pub height: f32,
    pub hitbox_offset: (f32, f32),
    pub hitbox_size: (f32, f32),
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: 300.0,        // Manual mode speed cap
            acceleration: 5.0,       // Added per frame while steering
            deceleration: 0.9,       // Removed per frame while coasting
            jump_power: -500.0,      // Initial vertical velocity of a jump
            gravity: 1000.0,         // Downward acceleration
            max_fall_speed: 2000.0,  // Terminal velocity
            skid_threshold: 100.0,   // Speed above which a reversal skids
            skid_deceleration: 12.0, // Removed per frame while skidding
            run_speed: 100.0,        // Auto-run forward speed
            booster_power: -650.0,   // Launch velocity from a booster tile
            locomotion: Locomotion::AutoRun,
            width: 16.0,
            height: 16.0,
            hitbox_offset: (3.0, 1.0),
            hitbox_size: (10.0, 15.0),
        }
    }
}

// Pixel thresholds used by the tile collision resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub platform_landing_tolerance: f32,
    pub pressure_block_tolerance: f32,
    pub platform_side_margin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            platform_landing_tolerance: 8.0,
            pressure_block_tolerance: 8.0,
            platform_side_margin: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub collision: CollisionConfig,
    pub autosave_interval: f32,
    pub spawn: (f32, f32),
    pub max_frame_delta: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            collision: CollisionConfig::default(),
            autosave_interval: 2.0,
            spawn: (2.0 * 16.0, 15.0 * 16.0),
            max_frame_delta: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    // Sizes and intervals that must be positive for the game to make sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("player.hitbox_size.0", self.player.hitbox_size.0),
            ("player.hitbox_size.1", self.player.hitbox_size.1),
            ("autosave_interval", self.autosave_interval),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (field, value) in positive {
            // NaN fails this too
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
