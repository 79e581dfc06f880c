//! Game balance configuration
//!
//! Everything a designer might want to tweak without touching the rules.
//! Fixed geometry (grid size, sub-block and tank dimensions) lives in `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_SPEED;
use crate::session::SaveError;

/// Data-driven balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Base player speed (pixels per second)
    pub player_speed: f32,
    /// Speed multiplier while any footprint cell is ice
    pub ice_speed_multiplier: f32,
    /// Player bullets allowed in flight at once
    pub max_player_bullets: usize,
    pub start_lives: u32,
    /// Seconds between death and respawn
    pub respawn_delay: f32,
    /// Shield granted on respawn (seconds)
    pub respawn_shield: f32,

    // === Enemies ===
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Delay before the first spawn of a stage
    pub initial_spawn_delay: f32,
    /// Cap on enemies alive at once
    pub max_active_enemies: usize,
    /// Queue length per stage
    pub enemies_per_level: usize,
    /// AI re-decision timer range (seconds)
    pub ai_direction_min: f32,
    pub ai_direction_max: f32,

    // === Power-ups ===
    /// Helmet, Shovel and Clock duration (seconds)
    pub powerup_duration: f32,
    /// Flat score for any pickup
    pub powerup_bonus: u64,

    // === Loop ===
    /// Upper bound applied to every tick's dt
    pub max_frame_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            ice_speed_multiplier: 1.6,
            max_player_bullets: 2,
            start_lives: 3,
            respawn_delay: 2.0,
            respawn_shield: 3.0,

            spawn_interval: 3.0,
            initial_spawn_delay: 2.0,
            max_active_enemies: 4,
            enemies_per_level: 20,
            ai_direction_min: 0.5,
            ai_direction_max: 2.5,

            powerup_duration: 15.0,
            powerup_bonus: 500,

            max_frame_dt: 0.05,
        }
    }
}

impl Tuning {
    /// Repair values that would break the simulation (negative times, inverted ranges)
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let non_negative = |v: f32, fallback: f32| {
            if v.is_finite() && v >= 0.0 { v } else { fallback }
        };

        self.player_speed = non_negative(self.player_speed, defaults.player_speed);
        self.ice_speed_multiplier =
            non_negative(self.ice_speed_multiplier, defaults.ice_speed_multiplier);
        self.respawn_delay = non_negative(self.respawn_delay, defaults.respawn_delay);
        self.respawn_shield = non_negative(self.respawn_shield, defaults.respawn_shield);
        self.spawn_interval = non_negative(self.spawn_interval, defaults.spawn_interval);
        self.initial_spawn_delay =
            non_negative(self.initial_spawn_delay, defaults.initial_spawn_delay);
        self.powerup_duration = non_negative(self.powerup_duration, defaults.powerup_duration);

        self.ai_direction_min = non_negative(self.ai_direction_min, defaults.ai_direction_min);
        self.ai_direction_max = non_negative(self.ai_direction_max, defaults.ai_direction_max);
        if self.ai_direction_max < self.ai_direction_min {
            std::mem::swap(&mut self.ai_direction_min, &mut self.ai_direction_max);
        }

        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            self.max_frame_dt = defaults.max_frame_dt;
        }
        self
    }

    /// Load tuning from a JSON file; missing keys keep their defaults.
    /// Unreadable files fall back to defaults entirely.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(SaveError::from)
            .and_then(|json| serde_json::from_str::<Tuning>(&json).map_err(SaveError::from));
        match parsed {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning.sanitized()
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write tuning as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
