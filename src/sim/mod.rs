//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, clamped to the tuning's upper bound
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod grid;
pub mod levels;
pub mod powerup;
pub mod spawner;
pub mod state;
pub mod tick;

pub use ai::{AiTargets, choose_direction, direction_toward, should_shoot, update_enemy_ai};
pub use collision::{
    Aabb, bullet_grid_collision, bullet_tank_collision, count_player_bullets, footprint_on_ice,
    footprint_passable, move_player_tank, move_tank,
};
pub use grid::{Grid, TileType};
pub use levels::{LEVEL_COUNT, LEVELS};
pub use powerup::{fortify, fortify_ring, unfortify};
pub use spawner::{SPAWN_POINTS, Spawner};
pub use state::{
    Bullet, Direction, Eagle, EnemyKind, EnemyProfile, EnemyTank, GameEvent, GamePhase, GameState,
    Impact, ImpactKind, PlayerTank, PowerUp, PowerUpKind, Tank,
};
pub use tick::{TickInput, tick};
