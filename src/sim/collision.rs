//! Movement and collision against the tile grid and other tanks
//!
//! Everything is axis-aligned: tanks are 48px boxes, bullets 4px boxes.
//! Tanks move along lanes; the axis perpendicular to travel is snapped to
//! the sub-block grid every step.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, TileType};
use super::state::{Bullet, Impact, ImpactKind, PlayerTank, Tank};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{cell_of, cell_to_pixel, snap_to_grid};

/// Axis-aligned bounding box (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Box of a tank footprint at the given top-left
    pub fn tank(pos: Vec2) -> Self {
        Self::new(pos, Vec2::splat(TANK_SIZE))
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap: boxes that only touch along an edge do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

/// Sub-block cells covered by a tank footprint at `pos` (inclusive ranges)
fn footprint_cells(pos: Vec2) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
    let x0 = cell_of(pos.x);
    let y0 = cell_of(pos.y);
    let x1 = ((pos.x + TANK_SIZE) / SUB_BLOCK).ceil() as i32 - 1;
    let y1 = ((pos.y + TANK_SIZE) / SUB_BLOCK).ceil() as i32 - 1;
    (x0..=x1, y0..=y1)
}

/// Whether every sub-block under a tank footprint is passable
pub fn footprint_passable(pos: Vec2, grid: &Grid) -> bool {
    let (xs, mut ys) = footprint_cells(pos);
    ys.all(|y| xs.clone().all(|x| grid.get(x, y).is_passable()))
}

/// Whether any sub-block under a tank footprint is ice
pub fn footprint_on_ice(pos: Vec2, grid: &Grid) -> bool {
    let (xs, mut ys) = footprint_cells(pos);
    ys.any(|y| xs.clone().any(|x| grid.get(x, y) == TileType::Ice))
}

/// Try to move a tank one step along its facing direction.
///
/// Returns false (position untouched) if the tank is dead or idle, or if the
/// candidate footprint hits an impassable tile or overlaps any of `others`.
pub fn move_tank(tank: &mut Tank, grid: &Grid, dt: f32, others: &[Aabb]) -> bool {
    if !tank.alive || !tank.moving {
        return false;
    }

    let mut next = tank.pos + tank.dir.delta() * tank.speed * dt;

    // Clamp to play area
    next.x = next.x.clamp(0.0, PLAY_AREA_WIDTH - TANK_SIZE);
    next.y = next.y.clamp(0.0, PLAY_AREA_HEIGHT - TANK_SIZE);

    // Snap the perpendicular axis so tanks re-align to lanes when turning
    if tank.dir.is_vertical() {
        next.x = snap_to_grid(tank.pos.x);
    } else {
        next.y = snap_to_grid(tank.pos.y);
    }

    if !footprint_passable(next, grid) {
        return false;
    }

    let candidate = Aabb::tank(next);
    if others.iter().any(|other| candidate.overlaps(other)) {
        return false;
    }

    tank.pos = next;
    true
}

/// Player movement: ice boosts speed, otherwise plain `move_tank`
pub fn move_player_tank(
    player: &mut PlayerTank,
    grid: &Grid,
    dt: f32,
    others: &[Aabb],
    tuning: &Tuning,
) -> bool {
    if !player.tank.alive || player.respawning {
        return false;
    }

    player.on_ice = footprint_on_ice(player.tank.pos, grid);
    player.tank.speed = if player.on_ice {
        tuning.player_speed * tuning.ice_speed_multiplier
    } else {
        tuning.player_speed
    };

    if !player.tank.moving {
        return false;
    }
    move_tank(&mut player.tank, grid, dt, others)
}

/// Resolve a bullet against the tile under its center. Returns true if consumed.
///
/// Brick breaks, steel breaks only for power >= 3 (otherwise it sparks),
/// eagle dies. The bullet is consumed by any blocking tile.
pub fn bullet_grid_collision(
    bullet: &mut Bullet,
    grid: &mut Grid,
    impacts: &mut Vec<Impact>,
) -> bool {
    if !bullet.active {
        return false;
    }

    let center = bullet.center();
    let (cx, cy) = (cell_of(center.x), cell_of(center.y));
    let tile = grid.get(cx, cy);
    if !tile.blocks_bullets() {
        return false;
    }

    let cell_center = cell_to_pixel(cx, cy) + Vec2::splat(SUB_BLOCK / 2.0);
    let kind = match tile {
        TileType::Brick => {
            grid.destroy(cx, cy, bullet.power);
            ImpactKind::Debris
        }
        TileType::Steel => {
            if grid.destroy(cx, cy, bullet.power) {
                ImpactKind::Debris
            } else {
                ImpactKind::Spark
            }
        }
        TileType::Eagle => {
            grid.destroy(cx, cy, bullet.power);
            ImpactKind::Explosion
        }
        _ => ImpactKind::Spark,
    };

    impacts.push(Impact { kind, pos: cell_center });
    bullet.active = false;
    true
}

/// Whether an active bullet overlaps a live tank. Ownership is the caller's concern.
pub fn bullet_tank_collision(bullet: &Bullet, tank: &Tank) -> bool {
    bullet.active && tank.alive && bullet.bbox().overlaps(&tank.bbox())
}

/// Active bullets fired by the player
pub fn count_player_bullets(bullets: &[Bullet]) -> usize {
    bullets.iter().filter(|b| b.active && b.from_player).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Direction;
    use proptest::prelude::*;

    fn tank_at(x: f32, y: f32, dir: Direction, speed: f32) -> Tank {
        let mut tank = Tank::new(Vec2::new(x, y), speed, 1);
        tank.dir = dir;
        tank.moving = true;
        tank
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Aabb::tank(Vec2::new(0.0, 0.0));
        let touching = Aabb::tank(Vec2::new(48.0, 0.0));
        let overlapping = Aabb::tank(Vec2::new(47.5, 10.0));
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&overlapping));
        assert!(overlapping.overlaps(&a));
    }

    #[test]
    fn test_move_tank_open_field() {
        let grid = Grid::new();
        let mut tank = tank_at(96.0, 96.0, Direction::Right, 60.0);
        assert!(move_tank(&mut tank, &grid, 0.5, &[]));
        assert_eq!(tank.pos, Vec2::new(126.0, 96.0));
    }

    #[test]
    fn test_move_tank_idle_or_dead_is_noop() {
        let grid = Grid::new();
        let mut tank = tank_at(96.0, 96.0, Direction::Right, 60.0);
        tank.moving = false;
        assert!(!move_tank(&mut tank, &grid, 0.5, &[]));
        tank.moving = true;
        tank.alive = false;
        assert!(!move_tank(&mut tank, &grid, 0.5, &[]));
        assert_eq!(tank.pos, Vec2::new(96.0, 96.0));
    }

    #[test]
    fn test_move_tank_snaps_when_turning() {
        let grid = Grid::new();
        // Mid-lane on x, now heading up: x snaps to nearest line
        let mut tank = tank_at(100.0, 96.0, Direction::Up, 60.0);
        assert!(move_tank(&mut tank, &grid, 0.1, &[]));
        assert_eq!(tank.pos.x, 96.0);
        assert!((tank.pos.y - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_tank_clamps_to_play_area() {
        let grid = Grid::new();
        let mut tank = tank_at(0.0, 2.0, Direction::Up, 120.0);
        assert!(move_tank(&mut tank, &grid, 0.5, &[]));
        assert_eq!(tank.pos.y, 0.0);
    }

    #[test]
    fn test_move_tank_blocked_by_tile() {
        let mut grid = Grid::new();
        grid.set(6, 4, TileType::Brick);
        let mut tank = tank_at(96.0, 96.0, Direction::Right, 60.0);
        // Footprint covers cells 4..5; moving right enters cell 6
        assert!(!move_tank(&mut tank, &grid, 0.1, &[]));
        assert_eq!(tank.pos, Vec2::new(96.0, 96.0));

        grid.set(6, 4, TileType::Water);
        assert!(!move_tank(&mut tank, &grid, 0.1, &[]));
        grid.set(6, 4, TileType::Forest);
        assert!(move_tank(&mut tank, &grid, 0.1, &[]));
    }

    #[test]
    fn test_move_tank_blocked_by_other_tank() {
        let grid = Grid::new();
        let mut tank = tank_at(96.0, 96.0, Direction::Right, 60.0);
        let other = Aabb::tank(Vec2::new(148.0, 96.0));
        assert!(!move_tank(&mut tank, &grid, 0.1, &[other]));
        assert_eq!(tank.pos.x, 96.0);
        // Touching after the step is fine
        let touching = Aabb::tank(Vec2::new(150.0, 96.0));
        let mut tank = tank_at(96.0, 96.0, Direction::Right, 60.0);
        assert!(move_tank(&mut tank, &grid, 0.1, &[touching]));
        assert_eq!(tank.pos.x, 102.0);
    }

    #[test]
    fn test_player_ice_boost() {
        let tuning = Tuning::default();
        let mut grid = Grid::new();
        grid.set(8, 24, TileType::Ice);
        let mut player = PlayerTank::new(&tuning);
        player.tank.dir = Direction::Right;
        player.tank.moving = true;
        assert!(move_player_tank(&mut player, &grid, 0.1, &[], &tuning));
        assert!(player.on_ice);
        let expected =
            PlayerTank::spawn_pos().x + tuning.player_speed * tuning.ice_speed_multiplier * 0.1;
        assert!((player.tank.pos.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_player_respawning_does_not_move() {
        let tuning = Tuning::default();
        let grid = Grid::new();
        let mut player = PlayerTank::new(&tuning);
        player.tank.moving = true;
        player.respawning = true;
        assert!(!move_player_tank(&mut player, &grid, 0.1, &[], &tuning));
    }

    #[test]
    fn test_bullet_grid_rules() {
        let mut grid = Grid::new();
        let mut impacts = Vec::new();
        grid.set(5, 5, TileType::Brick);
        grid.set(6, 5, TileType::Steel);
        grid.set(7, 5, TileType::Water);

        let at = |cx: i32, power: u8| {
            Bullet::new(cell_to_pixel(cx, 5) + Vec2::splat(10.0), Direction::Up, 0.0, power, true)
        };

        let mut b = at(5, 0);
        assert!(bullet_grid_collision(&mut b, &mut grid, &mut impacts));
        assert!(!b.active);
        assert_eq!(grid.get(5, 5), TileType::Empty);

        let mut b = at(6, 0);
        assert!(bullet_grid_collision(&mut b, &mut grid, &mut impacts));
        assert_eq!(grid.get(6, 5), TileType::Steel);
        assert_eq!(impacts.last().map(|i| i.kind), Some(ImpactKind::Spark));

        let mut b = at(6, 3);
        assert!(bullet_grid_collision(&mut b, &mut grid, &mut impacts));
        assert_eq!(grid.get(6, 5), TileType::Empty);

        // Bullets fly over water
        let mut b = at(7, 0);
        assert!(!bullet_grid_collision(&mut b, &mut grid, &mut impacts));
        assert!(b.active);
    }

    #[test]
    fn test_brick_ring_protects_eagle_until_breached() {
        // Ring of brick around a single eagle cell at the center
        let mut rows = vec![".".repeat(26); 26];
        rows[12] = format!("{}BBB{}", ".".repeat(12), ".".repeat(11));
        rows[13] = format!("{}BEB{}", ".".repeat(12), ".".repeat(11));
        rows[14] = format!("{}BBB{}", ".".repeat(12), ".".repeat(11));
        let mut grid = Grid::from_level(&rows.join("\n"));
        let mut impacts = Vec::new();
        assert_eq!(grid.get(13, 13), TileType::Eagle);

        // A bullet travelling left from the open field stops at the brick at (14, 13)
        let origin = Vec2::new(20.0 * SUB_BLOCK, 13.0 * SUB_BLOCK + 10.0);
        let mut b = Bullet::new(origin, Direction::Left, 300.0, 0, true);
        while b.active {
            b.update(1.0 / 60.0);
            bullet_grid_collision(&mut b, &mut grid, &mut impacts);
        }
        assert_eq!(grid.get(14, 13), TileType::Empty);
        assert_eq!(grid.get(13, 13), TileType::Eagle);

        // The next bullet on the same row reaches the eagle and kills it in one hit
        let origin = Vec2::new(20.0 * SUB_BLOCK, 13.0 * SUB_BLOCK + 10.0);
        let mut b = Bullet::new(origin, Direction::Left, 300.0, 0, true);
        while b.active {
            b.update(1.0 / 60.0);
            bullet_grid_collision(&mut b, &mut grid, &mut impacts);
        }
        assert_eq!(grid.get(13, 13), TileType::EagleDead);
        assert_eq!(grid.get(12, 13), TileType::Brick);
        assert_eq!(impacts.last().map(|i| i.kind), Some(ImpactKind::Explosion));
    }

    #[test]
    fn test_bullet_tank_collision() {
        let tank = Tank::new(Vec2::new(96.0, 96.0), 60.0, 1);
        let inside = Bullet::new(Vec2::new(100.0, 100.0), Direction::Up, 0.0, 0, true);
        let touching = Bullet::new(Vec2::new(144.0, 100.0), Direction::Up, 0.0, 0, true);
        assert!(bullet_tank_collision(&inside, &tank));
        assert!(!bullet_tank_collision(&touching, &tank));

        let mut spent = inside.clone();
        spent.active = false;
        assert!(!bullet_tank_collision(&spent, &tank));
    }

    #[test]
    fn test_count_player_bullets() {
        let mut bullets = vec![
            Bullet::new(Vec2::ZERO, Direction::Up, 0.0, 0, true),
            Bullet::new(Vec2::ZERO, Direction::Up, 0.0, 0, false),
            Bullet::new(Vec2::ZERO, Direction::Up, 0.0, 0, true),
        ];
        assert_eq!(count_player_bullets(&bullets), 2);
        bullets[0].active = false;
        assert_eq!(count_player_bullets(&bullets), 1);
    }

    fn any_dir() -> impl Strategy<Value = Direction> {
        proptest::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_move_snaps_perpendicular_axis(
            x in 0.0f32..576.0,
            y in 0.0f32..576.0,
            dir in any_dir(),
            dt in 0.001f32..0.05,
        ) {
            let grid = Grid::new();
            let mut tank = tank_at(x, y, dir, 120.0);
            if move_tank(&mut tank, &grid, dt, &[]) {
                let perp = if dir.is_vertical() { tank.pos.x } else { tank.pos.y };
                prop_assert_eq!(perp % SUB_BLOCK, 0.0);
            }
        }

        #[test]
        fn prop_tank_never_ends_overlapping(
            x in 0.0f32..576.0,
            y in 0.0f32..576.0,
            dir in any_dir(),
            wall_x in 0i32..26,
            wall_y in 0i32..26,
            ox in 0.0f32..576.0,
            oy in 0.0f32..576.0,
        ) {
            let mut grid = Grid::new();
            grid.set(wall_x, wall_y, TileType::Steel);
            let other = Aabb::tank(Vec2::new(ox, oy));
            let mut tank = tank_at(x, y, dir, 120.0);
            if move_tank(&mut tank, &grid, 1.0 / 60.0, &[other]) {
                prop_assert!(footprint_passable(tank.pos, &grid));
                prop_assert!(!tank.bbox().overlaps(&other));
            }
        }

        #[test]
        fn prop_bullet_leaving_area_deactivates(
            x in 0.0f32..624.0,
            y in 0.0f32..624.0,
            dir in any_dir(),
            speed in 0.0f32..2000.0,
        ) {
            let mut b = Bullet::new(Vec2::new(x, y), dir, speed, 0, true);
            b.update(1.0 / 60.0);
            let inside = (0.0..=PLAY_AREA_WIDTH).contains(&b.pos.x)
                && (0.0..=PLAY_AREA_HEIGHT).contains(&b.pos.y);
            prop_assert_eq!(b.active, inside);
        }
    }
}
