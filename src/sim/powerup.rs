//! Power-up collection and effects

use glam::Vec2;

use super::collision::Aabb;
use super::grid::{Grid, TileType};
use super::state::{Eagle, GameEvent, GameState, Impact, ImpactKind, PowerUpKind};
use crate::cell_to_pixel;
use crate::consts::SUB_BLOCK;

/// Cells on the outer ring of the 4x4 area around the 2x2 eagle
pub fn fortify_ring(eagle_cell: (i32, i32)) -> impl Iterator<Item = (i32, i32)> {
    let (ex, ey) = eagle_cell;
    (ey - 1..=ey + 2).flat_map(move |y| {
        (ex - 1..=ex + 2)
            .filter(move |&x| !((ex..=ex + 1).contains(&x) && (ey..=ey + 1).contains(&y)))
            .map(move |x| (x, y))
    })
}

/// Turn the brick/empty ring around the eagle into steel.
///
/// Cells under a live tank are left alone. Converted cells are recorded on the
/// eagle so `unfortify` can put them back. Re-fortifying refreshes the timer.
pub fn fortify(grid: &mut Grid, eagle: &mut Eagle, tanks: &[Aabb], duration: f32) {
    for (x, y) in fortify_ring(eagle.cell) {
        if !matches!(grid.get(x, y), TileType::Brick | TileType::Empty) {
            continue;
        }
        let cell_box = Aabb::new(cell_to_pixel(x, y), Vec2::splat(SUB_BLOCK));
        if tanks.iter().any(|t| t.overlaps(&cell_box)) {
            continue;
        }
        grid.set(x, y, TileType::Steel);
        if !eagle.fortified_cells.contains(&(x, y)) {
            eagle.fortified_cells.push((x, y));
        }
    }
    eagle.fortified = true;
    eagle.fort_timer = duration;
}

/// Revert recorded fortification cells that are still steel back to brick
pub fn unfortify(grid: &mut Grid, eagle: &mut Eagle) {
    for (x, y) in eagle.fortified_cells.drain(..) {
        if grid.get(x, y) == TileType::Steel {
            grid.set(x, y, TileType::Brick);
        }
    }
    eagle.fortified = false;
    eagle.fort_timer = 0.0;
}

impl GameState {
    /// Pick up any power-up the player is touching
    pub fn collect_powerups(&mut self) {
        if !self.player.tank.alive {
            return;
        }
        let player_box = self.player.tank.bbox();

        let mut collected = Vec::new();
        for powerup in self.powerups.iter_mut().filter(|p| p.active) {
            if player_box.overlaps(&powerup.bbox()) {
                powerup.active = false;
                collected.push(powerup.kind);
            }
        }

        for kind in collected {
            self.apply_powerup(kind);
            self.player.score += self.tuning.powerup_bonus;
            self.events.push(GameEvent::PowerUpCollected);
            log::info!("Collected {} power-up", kind.name());
        }
    }

    /// Apply a power-up effect to the current game
    pub fn apply_powerup(&mut self, kind: PowerUpKind) {
        let duration = self.tuning.powerup_duration;
        match kind {
            PowerUpKind::Star => self.player.apply_star(),
            PowerUpKind::Tank => self.player.lives += 1,
            PowerUpKind::Helmet => self.player.shield_timer = duration,
            PowerUpKind::Shovel => {
                let tanks = self.tank_boxes_excluding(None);
                fortify(&mut self.grid, &mut self.eagle, &tanks, duration);
            }
            PowerUpKind::Bomb => {
                for enemy in self.enemies.iter_mut().filter(|e| e.tank.alive) {
                    if enemy.tank.hit(enemy.tank.hp) {
                        self.player.score += enemy.score_value;
                        self.impacts.push(Impact {
                            kind: ImpactKind::Explosion,
                            pos: enemy.tank.center(),
                        });
                        self.events.push(GameEvent::Explosion);
                    }
                }
            }
            PowerUpKind::Clock => self.freeze_timer = duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::sim::state::{EnemyKind, EnemyTank, PowerUp};
    use crate::tuning::Tuning;

    fn playing_state() -> GameState {
        let mut state = GameState::new(1, Session::default(), Tuning::default());
        state.start_game(0);
        state
    }

    #[test]
    fn test_ring_has_twelve_cells_around_eagle() {
        let ring: Vec<_> = fortify_ring((5, 5)).collect();
        assert_eq!(ring.len(), 12);
        for cell in [(5, 5), (6, 5), (5, 6), (6, 6)] {
            assert!(!ring.contains(&cell));
        }
        assert!(ring.contains(&(4, 4)));
        assert!(ring.contains(&(7, 7)));
    }

    #[test]
    fn test_fortify_and_revert() {
        let mut grid = Grid::new();
        let mut eagle = Eagle::new((5, 5));
        grid.set(4, 5, TileType::Brick);
        grid.set(7, 5, TileType::Water);

        fortify(&mut grid, &mut eagle, &[], 15.0);
        assert!(eagle.fortified);
        assert_eq!(eagle.fortified_cells.len(), 11);
        assert_eq!(grid.get(4, 5), TileType::Steel);
        assert_eq!(grid.get(4, 4), TileType::Steel);
        assert_eq!(grid.get(7, 5), TileType::Water);

        unfortify(&mut grid, &mut eagle);
        assert!(!eagle.fortified);
        assert!(eagle.fortified_cells.is_empty());
        assert_eq!(grid.get(4, 5), TileType::Brick);
        assert_eq!(grid.get(4, 4), TileType::Brick);
        assert_eq!(grid.get(7, 5), TileType::Water);
    }

    #[test]
    fn test_fortify_skips_cells_under_tanks() {
        let mut grid = Grid::new();
        let mut eagle = Eagle::new((5, 5));
        // Tank covering cells (2..=3, 4..=5) touches ring cell (4, y) only by edge
        let edge_tank = Aabb::tank(cell_to_pixel(2, 4));
        // Tank covering cells (7..=8, 6..=7)
        let ring_tank = Aabb::tank(cell_to_pixel(7, 6));
        fortify(&mut grid, &mut eagle, &[edge_tank, ring_tank], 15.0);
        assert_eq!(grid.get(4, 4), TileType::Steel);
        assert_eq!(grid.get(7, 6), TileType::Empty);
        assert_eq!(grid.get(7, 7), TileType::Empty);
        assert_eq!(eagle.fortified_cells.len(), 10);
    }

    #[test]
    fn test_second_shovel_refreshes() {
        let mut grid = Grid::new();
        let mut eagle = Eagle::new((5, 5));
        fortify(&mut grid, &mut eagle, &[], 15.0);
        eagle.update(10.0);
        fortify(&mut grid, &mut eagle, &[], 15.0);
        assert_eq!(eagle.fort_timer, 15.0);
        assert_eq!(eagle.fortified_cells.len(), 12);
    }

    #[test]
    fn test_pierced_fortification_stays_open() {
        let mut grid = Grid::new();
        let mut eagle = Eagle::new((5, 5));
        fortify(&mut grid, &mut eagle, &[], 15.0);
        grid.destroy(4, 4, 3);
        unfortify(&mut grid, &mut eagle);
        assert_eq!(grid.get(4, 4), TileType::Empty);
        assert_eq!(grid.get(4, 5), TileType::Brick);
    }

    #[test]
    fn test_collect_applies_effect_and_bonus() {
        let mut state = playing_state();
        let pos = state.player.tank.pos + Vec2::splat(12.0);
        state.powerups.push(PowerUp::new(pos, PowerUpKind::Tank));
        state.powerups.push(PowerUp::new(Vec2::ZERO, PowerUpKind::Clock));
        let lives = state.player.lives;

        state.collect_powerups();
        assert_eq!(state.player.lives, lives + 1);
        assert_eq!(state.player.score, state.tuning.powerup_bonus);
        assert!(!state.powerups[0].active);
        assert!(state.powerups[1].active);
        assert_eq!(state.freeze_timer, 0.0);
        assert!(state.events.contains(&GameEvent::PowerUpCollected));
    }

    #[test]
    fn test_bomb_destroys_all_enemies_with_score() {
        let mut state = playing_state();
        state.enemies.push(EnemyTank::new(Vec2::ZERO, EnemyKind::Armour, true));
        state.enemies.push(EnemyTank::new(Vec2::new(288.0, 0.0), EnemyKind::Fast, false));
        state.apply_powerup(PowerUpKind::Bomb);
        assert_eq!(state.alive_enemy_count(), 0);
        assert_eq!(state.player.score, 400 + 200);
        // No drops from bombed carriers
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_timed_effects_use_powerup_duration() {
        let mut state = playing_state();
        state.apply_powerup(PowerUpKind::Helmet);
        assert_eq!(state.player.shield_timer, state.tuning.powerup_duration);
        state.apply_powerup(PowerUpKind::Clock);
        assert_eq!(state.freeze_timer, state.tuning.powerup_duration);
        state.apply_powerup(PowerUpKind::Star);
        assert_eq!(state.player.stars, 1);
    }

    #[test]
    fn test_shovel_on_stage_layout() {
        let mut state = playing_state();
        let brick_cell = (11, 23);
        assert_eq!(state.grid.get(brick_cell.0, brick_cell.1), TileType::Brick);
        state.apply_powerup(PowerUpKind::Shovel);
        assert!(state.eagle.fortified);
        assert_eq!(state.grid.get(brick_cell.0, brick_cell.1), TileType::Steel);
        // Eagle tiles are untouched
        assert_eq!(state.grid.get(12, 24), TileType::Eagle);
    }
}
