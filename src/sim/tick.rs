//! Fixed timestep simulation tick
//!
//! The state machine: one call advances every component in a fixed order.
//! Entities are only marked dead or inactive while iterating; removal happens
//! once, at the end of a playing tick.

use super::ai::{AiTargets, should_shoot, update_enemy_ai};
use super::collision::{
    bullet_grid_collision, bullet_tank_collision, count_player_bullets, move_player_tank,
};
use super::levels::LEVEL_COUNT;
use super::powerup::unfortify;
use super::state::{GameEvent, GamePhase, GameState, Impact, ImpactKind};
use crate::consts::*;
use crate::platform::Keys;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Keys currently held
    pub held: Keys,
    /// Keys that went down this frame
    pub pressed: Keys,
}

impl TickInput {
    /// Start / continue / acknowledge
    fn confirmed(&self) -> bool {
        self.pressed.confirm || self.pressed.fire
    }
}

/// Advance the game state by one timestep. `dt` is clamped to `tuning.max_frame_dt`;
/// a non-finite `dt` counts as zero.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt } else { 0.0 };
    let dt = dt.clamp(0.0, state.tuning.max_frame_dt);
    state.time += dt;
    state.impacts.clear();

    match state.phase {
        GamePhase::Menu => tick_menu(state, input),
        GamePhase::LevelIntro => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 {
                state.phase = GamePhase::Playing;
                log::info!("Stage {} start", state.level + 1);
            }
        }
        GamePhase::Playing => tick_playing(state, input, dt),
        GamePhase::Paused => {
            if input.pressed.pause || input.pressed.confirm {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
        }
        GamePhase::GameOver => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 && input.confirmed() {
                state.phase = GamePhase::Menu;
                state.menu_index = 0;
            }
        }
        GamePhase::LevelComplete => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 && input.confirmed() {
                let next = state.level + 1;
                if next < LEVEL_COUNT {
                    state.start_level(next);
                } else {
                    log::info!("All stages cleared with score {}", state.player.score);
                    state.phase = GamePhase::Menu;
                    state.menu_index = 0;
                }
            }
        }
    }
}

/// Menu entries: 0 = new game, 1 = continue from the furthest stage reached
const MENU_ENTRIES: usize = 2;

fn tick_menu(state: &mut GameState, input: &TickInput) {
    let cursor = state.menu_index;
    if input.pressed.up {
        state.menu_index = state.menu_index.saturating_sub(1);
    }
    if input.pressed.down {
        state.menu_index = (state.menu_index + 1).min(MENU_ENTRIES - 1);
    }
    if state.menu_index != cursor {
        state.events.push(GameEvent::MenuMove);
    }

    if input.confirmed() {
        let level = if state.menu_index == 0 {
            0
        } else {
            state.session().max_level
        };
        log::info!("Starting new game at stage {}", level + 1);
        state.start_game(level);
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pressed.pause {
        state.phase = GamePhase::Paused;
        log::info!("Paused");
        return;
    }

    if input.pressed.skip_level {
        let next = state.level + 1;
        if next < LEVEL_COUNT {
            log::debug!("Skipping to stage {}", next + 1);
            state.start_level(next);
            return;
        }
    }

    update_player(state, input, dt);

    // Spawner
    let active = state.alive_enemy_count();
    let occupied = state.tank_boxes_excluding(None);
    if let Some(enemy) = state.spawner.update(dt, active, &occupied) {
        state.enemies.push(enemy);
    }

    update_enemies(state, dt);

    if state.eagle.update(dt) {
        unfortify(&mut state.grid, &mut state.eagle);
        log::debug!("Eagle fortification expired");
    }

    for powerup in &mut state.powerups {
        powerup.update(dt);
    }

    // Bullets: advance all, then grid, then player shots, then enemy shots
    for bullet in &mut state.bullets {
        bullet.update(dt);
    }
    for bullet in &mut state.bullets {
        bullet_grid_collision(bullet, &mut state.grid, &mut state.impacts);
    }
    resolve_player_hits(state);
    resolve_enemy_hits(state);

    state.collect_powerups();

    state.eagle.sync(&state.grid);
    check_end_conditions(state);

    state.compact();
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let others = state.enemy_boxes();
    state.player.handle_input(&input.held);
    state.player.update(dt, &state.tuning, &others);

    move_player_tank(&mut state.player, &state.grid, dt, &others, &state.tuning);

    let player = &mut state.player;
    if input.held.fire
        && !player.respawning
        && player.tank.can_shoot()
        && count_player_bullets(&state.bullets) < state.tuning.max_player_bullets
    {
        state.bullets.push(player.tank.fire(true));
        state.events.push(GameEvent::Shoot);
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let frozen = state.freeze_timer > 0.0;
    let targets = AiTargets {
        player: state.player.tank.center(),
        eagle: state.eagle.center(),
    };

    for i in 0..state.enemies.len() {
        state.enemies[i].update(dt);
        if frozen || !state.enemies[i].tank.alive {
            continue;
        }

        let others = state.tank_boxes_excluding(Some(i));
        let enemy = &mut state.enemies[i];
        update_enemy_ai(
            enemy,
            &state.grid,
            dt,
            &others,
            &targets,
            &state.tuning,
            &mut state.rng,
        );

        if should_shoot(enemy, dt, &mut state.rng) {
            state.bullets.push(enemy.tank.fire(false));
        }
    }

    if frozen {
        state.freeze_timer = (state.freeze_timer - dt).max(0.0);
    }
}

/// Player bullets against enemies: first enemy hit consumes the bullet
fn resolve_player_hits(state: &mut GameState) {
    let mut drops = 0;

    for bullet in state.bullets.iter_mut().filter(|b| b.active && b.from_player) {
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| bullet_tank_collision(bullet, &e.tank))
        else {
            continue;
        };

        bullet.active = false;
        if enemy.tank.hit(1) {
            state.player.score += enemy.score_value;
            state.impacts.push(Impact {
                kind: ImpactKind::Explosion,
                pos: enemy.tank.center(),
            });
            state.events.push(GameEvent::Explosion);
            if enemy.carries_powerup {
                drops += 1;
            }
            log::debug!("{:?} destroyed (+{})", enemy.kind, enemy.score_value);
        } else {
            state.impacts.push(Impact {
                kind: ImpactKind::Spark,
                pos: bullet.center(),
            });
        }
    }

    for _ in 0..drops {
        state.spawn_powerup();
    }
}

/// Enemy bullets against the player. Skipped entirely while shielded.
fn resolve_enemy_hits(state: &mut GameState) {
    if state.player.is_invulnerable() {
        return;
    }

    for bullet in state.bullets.iter_mut().filter(|b| b.active && !b.from_player) {
        if !bullet_tank_collision(bullet, &state.player.tank) {
            continue;
        }
        bullet.active = false;
        if state.player.tank.hit(1) {
            state.impacts.push(Impact {
                kind: ImpactKind::Explosion,
                pos: state.player.tank.center(),
            });
            state.events.push(GameEvent::Explosion);
            state.player.die(state.tuning.respawn_delay);
            log::info!("Player destroyed, {} lives left", state.player.lives);
        }
    }
}

fn check_end_conditions(state: &mut GameState) {
    if !state.eagle.alive || state.player.is_out() {
        state.phase = GamePhase::GameOver;
        state.phase_timer = GAME_OVER_TIME;
        state.events.push(GameEvent::GameOver);
        let (score, level) = (state.player.score, state.level);
        state.session_mut().record(score, level);
        log::info!(
            "Game over on stage {} ({}), score {}",
            level + 1,
            if state.eagle.alive { "out of lives" } else { "eagle destroyed" },
            score
        );
    } else if state.spawner.done() && state.alive_enemy_count() == 0 {
        state.phase = GamePhase::LevelComplete;
        state.phase_timer = LEVEL_COMPLETE_TIME;
        let score = state.player.score;
        let unlocked = (state.level + 1).min(LEVEL_COUNT - 1);
        state.session_mut().record(score, unlocked);
        log::info!("Stage {} complete, score {}", state.level + 1, score);
    }
}
