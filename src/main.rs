//! Tank Strike headless runner
//!
//! Drives the simulation with a simple autopilot at a fixed timestep, logs
//! what happens and persists the session afterwards. Useful for soak tests
//! and balance checks without a window.

use std::path::PathBuf;

use clap::Parser;

use tank_strike::consts::*;
use tank_strike::platform::{InputTracker, Keys};
use tank_strike::sim::{Direction, GameEvent, GamePhase, GameState, tick};
use tank_strike::{Session, Tuning};

#[derive(Parser, Debug)]
#[command(name = "tank-strike", version, about = "Run a headless Tank Strike session")]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Simulated render frame rate feeding the fixed-step loop
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Session file (high score, furthest stage)
    #[arg(long, default_value = "tank-strike-session.json")]
    save: PathBuf,
    /// Optional tuning JSON
    #[arg(long)]
    tuning: Option<PathBuf>,
}

/// Tallies of what happened during the run
#[derive(Debug, Default)]
struct RunStats {
    shots: u32,
    explosions: u32,
    powerups: u32,
    stages_started: u32,
    game_overs: u32,
}

impl RunStats {
    fn record(&mut self, event: GameEvent) {
        match event {
            GameEvent::Shoot => self.shots += 1,
            GameEvent::Explosion => self.explosions += 1,
            GameEvent::PowerUpCollected => self.powerups += 1,
            GameEvent::LevelStart => self.stages_started += 1,
            GameEvent::GameOver => self.game_overs += 1,
            GameEvent::MenuMove => {}
        }
    }
}

/// Headless driver: accumulator-based fixed timestep like a real frontend
struct Runner {
    state: GameState,
    tracker: InputTracker,
    accumulator: f32,
    frame: u64,
    last_phase: GamePhase,
    stats: RunStats,
}

impl Runner {
    fn new(seed: u64, session: Session, tuning: Tuning) -> Self {
        let state = GameState::new(seed, session, tuning);
        let last_phase = state.phase;
        Self {
            state,
            tracker: InputTracker::new(),
            accumulator: 0.0,
            frame: 0,
            last_phase,
            stats: RunStats::default(),
        }
    }

    /// Advance one render frame of `dt` seconds
    fn update(&mut self, dt: f32) {
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let held = autopilot(&self.state, self.frame);
            let input = self.tracker.frame(held);
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.frame += 1;

            for event in self.state.drain_events() {
                log::debug!("event: {:?}", event);
                self.stats.record(event);
            }

            if self.state.phase != self.last_phase {
                log::info!(
                    "[{:>7.2}s] {:?} -> {:?}",
                    self.state.time,
                    self.last_phase,
                    self.state.phase
                );
                self.last_phase = self.state.phase;
            }
        }
    }
}

/// Keys a very simple bot would hold this frame
fn autopilot(state: &GameState, frame: u64) -> Keys {
    // Menus and result screens want a fresh press; tap every other frame
    let tap = frame.is_multiple_of(2);
    match state.phase {
        GamePhase::Menu | GamePhase::GameOver | GamePhase::LevelComplete => Keys {
            confirm: tap,
            ..Default::default()
        },
        GamePhase::Paused => Keys {
            pause: tap,
            ..Default::default()
        },
        GamePhase::LevelIntro => Keys::default(),
        GamePhase::Playing => chase_nearest_enemy(state),
    }
}

/// Line up with the nearest enemy on one axis, then face it and fire
fn chase_nearest_enemy(state: &GameState) -> Keys {
    let mut keys = Keys {
        fire: true,
        ..Default::default()
    };
    let me = state.player.tank.center();
    let Some(target) = state
        .enemies
        .iter()
        .filter(|e| e.tank.alive)
        .map(|e| e.tank.center())
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
    else {
        return keys;
    };

    let d = target - me;
    let dir = if d.x.abs() > SUB_BLOCK / 2.0 {
        if d.x > 0.0 { Direction::Right } else { Direction::Left }
    } else if d.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };
    match dir {
        Direction::Up => keys.up = true,
        Direction::Down => keys.down = true,
        Direction::Left => keys.left = true,
        Direction::Right => keys.right = true,
    }
    keys
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::info!("Tank Strike (headless) starting with seed {}", args.seed);

    let tuning = args
        .tuning
        .as_deref()
        .map(Tuning::load)
        .unwrap_or_default();
    let session = Session::load(&args.save);

    let fps = if args.fps > 0.0 { args.fps } else { 60.0 };
    let frame_dt = 1.0 / fps;
    let frames = (args.seconds.max(0.0) * fps).round() as u64;

    let mut runner = Runner::new(args.seed, session, tuning);
    for _ in 0..frames {
        runner.update(frame_dt);
    }

    let state = &runner.state;
    let stats = &runner.stats;
    println!(
        "seed {} | {:.1}s simulated | phase {:?} | stage {} | score {} | lives {} | enemies left {}",
        args.seed,
        state.time,
        state.phase,
        state.level + 1,
        state.player.score,
        state.player.lives,
        state.enemies_remaining()
    );
    println!(
        "shots {} | explosions {} | power-ups {} | stages started {} | game overs {}",
        stats.shots, stats.explosions, stats.powerups, stats.stages_started, stats.game_overs
    );
    println!(
        "high score {} | furthest stage {}",
        state.session().high_score,
        state.session().max_level + 1
    );

    if let Err(e) = state.session().save(&args.save) {
        log::error!("Failed to save session to {}: {}", args.save.display(), e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless runner is native only
}
