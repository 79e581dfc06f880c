//! Enemy decision making
//!
//! No pathfinding: a weighted dice roll between wandering, chasing the
//! player and heading for the eagle, re-rolled when blocked or on a timer.

use glam::Vec2;
use rand::Rng;

use super::collision::{Aabb, move_tank};
use super::grid::Grid;
use super::state::{Direction, EnemyTank};
use crate::tuning::Tuning;

/// Below this roll the new heading is uniformly random
const WANDER_ROLL: f32 = 0.4;
/// Below this roll (and above `WANDER_ROLL`) the enemy turns toward the player
const CHASE_ROLL: f32 = 0.7;

/// Where the enemy is heading for this decision
#[derive(Debug, Clone, Copy)]
pub struct AiTargets {
    pub player: Vec2,
    pub eagle: Vec2,
}

/// Cardinal direction from `from` toward `to`, on the axis with the larger delta.
/// Equal deltas resolve horizontally.
pub fn direction_toward(from: Vec2, to: Vec2) -> Direction {
    let d = to - from;
    if d.x.abs() >= d.y.abs() {
        if d.x > 0.0 { Direction::Right } else { Direction::Left }
    } else if d.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Roll a new heading for an enemy centered at `from`
pub fn choose_direction<R: Rng + ?Sized>(
    rng: &mut R,
    from: Vec2,
    targets: &AiTargets,
) -> Direction {
    let roll: f32 = rng.random();
    if roll < WANDER_ROLL {
        Direction::ALL[rng.random_range(0..Direction::ALL.len())]
    } else if roll < CHASE_ROLL {
        direction_toward(from, targets.player)
    } else {
        direction_toward(from, targets.eagle)
    }
}

/// Move the enemy and re-decide its heading when blocked or when its timer runs out.
///
/// Cooldown and animation are advanced separately by `EnemyTank::update`, so a
/// frozen enemy keeps animating without calling this.
pub fn update_enemy_ai<R: Rng + ?Sized>(
    enemy: &mut EnemyTank,
    grid: &Grid,
    dt: f32,
    others: &[Aabb],
    targets: &AiTargets,
    tuning: &Tuning,
    rng: &mut R,
) {
    if !enemy.tank.alive {
        return;
    }

    enemy.dir_timer -= dt;
    let moved = move_tank(&mut enemy.tank, grid, dt, others);

    if !moved || enemy.dir_timer <= 0.0 {
        enemy.tank.dir = choose_direction(rng, enemy.tank.center(), targets);
        enemy.tank.moving = true;
        enemy.dir_timer = rng.random_range(tuning.ai_direction_min..=tuning.ai_direction_max);
    }
}

/// Per-tick Bernoulli draw approximating `shoot_chance` shots per second
pub fn should_shoot<R: Rng + ?Sized>(enemy: &EnemyTank, dt: f32, rng: &mut R) -> bool {
    if !enemy.tank.can_shoot() {
        return false;
    }
    rng.random::<f32>() < enemy.shoot_chance * dt
}
