//! Enemy wave scheduling

use std::collections::VecDeque;

use rand::Rng;

use super::collision::Aabb;
use super::state::{EnemyKind, EnemyTank};
use crate::cell_to_pixel;
use crate::tuning::Tuning;

/// Enemy spawn cells along the top row (left, center, right)
pub const SPAWN_POINTS: [(i32, i32); 3] = [(0, 0), (12, 0), (24, 0)];

/// Every Nth spawn (0-indexed N-1, 2N-1, ...) carries a power-up
const CARRIER_EVERY: usize = 4;

/// Pre-rolled queue of enemies for one stage
#[derive(Debug, Clone)]
pub struct Spawner {
    queue: VecDeque<EnemyKind>,
    timer: f32,
    interval: f32,
    max_active: usize,
    next_point: usize,
    total_spawned: usize,
}

/// Roll one enemy type; later stages shift toward tougher tanks
fn roll_kind<R: Rng + ?Sized>(level: usize, rng: &mut R) -> EnemyKind {
    let roll: f32 = rng.random();
    let thresholds: [f32; 3] = match level {
        0..3 => [0.6, 0.85, 1.0],
        3..6 => [0.35, 0.6, 0.85],
        _ => [0.2, 0.45, 0.7],
    };
    match thresholds.iter().position(|&t| roll < t) {
        Some(0) => EnemyKind::Basic,
        Some(1) => EnemyKind::Fast,
        Some(2) => EnemyKind::Power,
        _ => EnemyKind::Armour,
    }
}

impl Spawner {
    /// Build the queue for a stage
    pub fn new<R: Rng + ?Sized>(level: usize, tuning: &Tuning, rng: &mut R) -> Self {
        Self::from_queue((0..tuning.enemies_per_level).map(|_| roll_kind(level, rng)), tuning)
    }

    /// A spawner with nothing queued
    pub fn empty(tuning: &Tuning) -> Self {
        Self::from_queue(std::iter::empty(), tuning)
    }

    /// A spawner with an explicit queue
    pub fn from_queue(kinds: impl IntoIterator<Item = EnemyKind>, tuning: &Tuning) -> Self {
        Self {
            queue: kinds.into_iter().collect(),
            timer: tuning.initial_spawn_delay,
            interval: tuning.spawn_interval,
            max_active: tuning.max_active_enemies,
            next_point: 0,
            total_spawned: 0,
        }
    }

    /// Advance the spawn timer; may emit one enemy.
    ///
    /// `blocked` holds the boxes of every live tank. A spawn point covered by
    /// one of them holds the spawn until it clears.
    pub fn update(&mut self, dt: f32, active: usize, blocked: &[Aabb]) -> Option<EnemyTank> {
        if self.queue.is_empty() || active >= self.max_active {
            return None;
        }

        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }

        let (cx, cy) = SPAWN_POINTS[self.next_point % SPAWN_POINTS.len()];
        let pos = cell_to_pixel(cx, cy);
        let footprint = Aabb::tank(pos);
        if blocked.iter().any(|b| b.overlaps(&footprint)) {
            self.timer = 0.0;
            return None;
        }

        let kind = self.queue.pop_front()?;
        self.timer = self.interval;
        self.next_point += 1;

        let carries_powerup = self.total_spawned % CARRIER_EVERY == CARRIER_EVERY - 1;
        self.total_spawned += 1;

        log::debug!(
            "Spawned {:?} at cell ({}, {}){}",
            kind,
            cx,
            cy,
            if carries_powerup { " carrying power-up" } else { "" }
        );
        Some(EnemyTank::new(pos, kind, carries_powerup))
    }

    /// Enemies still queued
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Queue exhausted (live enemies are not counted)
    pub fn done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn total_spawned(&self) -> usize {
        self.total_spawned
    }
}
