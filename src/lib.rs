//! Tank Strike - A tile-grid tank battle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, tanks, bullets, AI, game state)
//! - `platform`: Input snapshot and edge detection
//! - `session`: Persisted progress (high score, max level)
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

pub use session::{SaveError, Session};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame (prevents spiral of death)
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid dimensions (in sub-blocks)
    pub const GRID_WIDTH: usize = 26;
    pub const GRID_HEIGHT: usize = 26;
    /// Pixels per sub-block
    pub const SUB_BLOCK: f32 = 24.0;

    /// Play area dimensions in pixels
    pub const PLAY_AREA_WIDTH: f32 = GRID_WIDTH as f32 * SUB_BLOCK; // 624
    pub const PLAY_AREA_HEIGHT: f32 = GRID_HEIGHT as f32 * SUB_BLOCK; // 624

    /// Tank footprint (2x2 sub-blocks)
    pub const TANK_SIZE: f32 = SUB_BLOCK * 2.0;
    /// Bullet box edge length
    pub const BULLET_SIZE: f32 = 4.0;
    /// Power-up box edge length
    pub const POWERUP_SIZE: f32 = 24.0;
    /// Distance from tank center to the barrel tip
    pub const BARREL_REACH: f32 = 28.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 120.0;
    pub const PLAYER_BULLET_SPEED: f32 = 300.0;
    pub const PLAYER_COOLDOWN: f32 = 0.3;
    /// Player spawn cell (top-left of footprint)
    pub const PLAYER_SPAWN_CELL: (i32, i32) = (8, 24);

    /// Enemy defaults
    pub const ENEMY_BULLET_SPEED: f32 = 200.0;
    pub const ENEMY_COOLDOWN: f32 = 1.0;

    /// Star level cap
    pub const MAX_STARS: u8 = 3;
    /// Bullet power needed to break steel
    pub const STEEL_PIERCE_POWER: u8 = 3;

    /// Tread animation frame duration (seconds)
    pub const TREAD_FRAME_TIME: f32 = 0.08;

    /// Screen timers (seconds)
    pub const LEVEL_INTRO_TIME: f32 = 2.0;
    pub const GAME_OVER_TIME: f32 = 2.0;
    pub const LEVEL_COMPLETE_TIME: f32 = 1.5;

    /// Enemy score values
    pub const SCORE_BASIC: u64 = 100;
    pub const SCORE_FAST: u64 = 200;
    pub const SCORE_POWER: u64 = 300;
    pub const SCORE_ARMOUR: u64 = 400;
}

use consts::SUB_BLOCK;

/// Snap a pixel coordinate to the nearest sub-block grid line
#[inline]
pub fn snap_to_grid(v: f32) -> f32 {
    (v / SUB_BLOCK).round() * SUB_BLOCK
}

/// Sub-block cell containing a pixel coordinate (floors negatives)
#[inline]
pub fn cell_of(v: f32) -> i32 {
    (v / SUB_BLOCK).floor() as i32
}

/// Top-left pixel position of a sub-block cell
#[inline]
pub fn cell_to_pixel(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 * SUB_BLOCK, y as f32 * SUB_BLOCK)
}
