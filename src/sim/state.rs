//! Game state and core simulation types
//!
//! Entities are plain records; per-type update rules live next to them.
//! `GameState` owns every collection and is advanced by `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::grid::{Grid, TileType};
use super::levels;
use super::spawner::Spawner;
use crate::cell_to_pixel;
use crate::consts::*;
use crate::platform::Keys;
use crate::session::Session;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title menu
    Menu,
    /// "STAGE N" card before play starts
    LevelIntro,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Eagle lost or lives exhausted
    GameOver,
    /// All enemies of the stage destroyed
    LevelComplete,
}

/// Discrete triggers for an audio collaborator. No effect on simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Shoot,
    Explosion,
    PowerUpCollected,
    GameOver,
    LevelStart,
    MenuMove,
}

/// Visual-only impact kinds (particle hints for a renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactKind {
    /// Tile broken
    Debris,
    /// Bullet bounced off steel
    Spark,
    /// Tank or eagle destroyed
    Explosion,
}

/// A visual impact at a pixel position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub kind: ImpactKind,
    pub pos: Vec2,
}

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in screen space (y grows downward)
    pub fn delta(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// State shared by player and enemy tanks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    /// Top-left of the 48px footprint
    pub pos: Vec2,
    pub dir: Direction,
    /// Pixels per second
    pub speed: f32,
    pub hp: u8,
    pub max_hp: u8,
    pub alive: bool,
    pub moving: bool,
    /// Tread animation frame (0-3)
    pub tread_frame: u8,
    pub tread_timer: f32,
    /// Seconds until the next shot is allowed
    pub shoot_cooldown: f32,
    /// Seconds between shots
    pub cooldown_rate: f32,
    pub bullet_speed: f32,
    /// Bullet power (0-3); 3 breaks steel
    pub power: u8,
}

impl Tank {
    pub fn new(pos: Vec2, speed: f32, hp: u8) -> Self {
        Self {
            pos,
            dir: Direction::Up,
            speed,
            hp,
            max_hp: hp,
            alive: true,
            moving: false,
            tread_frame: 0,
            tread_timer: 0.0,
            shoot_cooldown: 0.0,
            cooldown_rate: 0.5,
            bullet_speed: PLAYER_BULLET_SPEED,
            power: 0,
        }
    }

    /// Advance cooldown and tread animation
    pub fn update(&mut self, dt: f32) {
        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
        if self.moving {
            self.tread_timer += dt;
            if self.tread_timer > TREAD_FRAME_TIME {
                self.tread_timer = 0.0;
                self.tread_frame = (self.tread_frame + 1) % 4;
            }
        }
    }

    pub fn can_shoot(&self) -> bool {
        self.alive && self.shoot_cooldown <= 0.0
    }

    /// Start the cooldown and return the bullet spawn position (barrel tip)
    pub fn shoot(&mut self) -> Vec2 {
        self.shoot_cooldown = self.cooldown_rate;
        self.center() + self.dir.delta() * BARREL_REACH - Vec2::splat(BULLET_SIZE / 2.0)
    }

    /// Fire a bullet from the barrel tip
    pub fn fire(&mut self, from_player: bool) -> Bullet {
        let pos = self.shoot();
        Bullet::new(pos, self.dir, self.bullet_speed, self.power, from_player)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(TANK_SIZE / 2.0)
    }

    pub fn bbox(&self) -> Aabb {
        Aabb::tank(self.pos)
    }

    /// Apply damage. Returns true if this hit destroyed the tank.
    pub fn hit(&mut self, damage: u8) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = self.hp.saturating_sub(damage);
        if self.hp == 0 {
            self.alive = false;
            self.moving = false;
            return true;
        }
        false
    }
}

/// The player's tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTank {
    pub tank: Tank,
    pub lives: u32,
    pub score: u64,
    /// Upgrade level (0-3)
    pub stars: u8,
    /// Invulnerability remaining
    pub shield_timer: f32,
    pub respawn_timer: f32,
    pub respawning: bool,
    /// Whether any occupied sub-block is ice (set by movement)
    pub on_ice: bool,
}

impl PlayerTank {
    pub fn new(tuning: &Tuning) -> Self {
        let mut tank = Tank::new(Self::spawn_pos(), tuning.player_speed, 1);
        tank.bullet_speed = PLAYER_BULLET_SPEED;
        tank.cooldown_rate = PLAYER_COOLDOWN;
        Self {
            tank,
            lives: tuning.start_lives,
            score: 0,
            stars: 0,
            shield_timer: 0.0,
            respawn_timer: 0.0,
            respawning: false,
            on_ice: false,
        }
    }

    pub fn spawn_pos() -> Vec2 {
        cell_to_pixel(PLAYER_SPAWN_CELL.0, PLAYER_SPAWN_CELL.1)
    }

    /// Read held keys into heading/moving (first match wins: up, down, left, right)
    pub fn handle_input(&mut self, held: &Keys) {
        self.tank.moving = false;
        if !self.tank.alive || self.respawning {
            return;
        }
        let dir = if held.up {
            Direction::Up
        } else if held.down {
            Direction::Down
        } else if held.left {
            Direction::Left
        } else if held.right {
            Direction::Right
        } else {
            return;
        };
        self.tank.dir = dir;
        self.tank.moving = true;
    }

    /// Put the tank back at the spawn cell with a short shield
    pub fn respawn(&mut self, shield: f32) {
        self.tank.pos = Self::spawn_pos();
        self.tank.dir = Direction::Up;
        self.tank.hp = 1;
        self.tank.alive = true;
        self.tank.moving = false;
        self.tank.shoot_cooldown = 0.0;
        self.respawning = false;
        self.respawn_timer = 0.0;
        self.shield_timer = shield;
        self.on_ice = false;
    }

    /// Advance timers; respawns once the respawn delay runs out and the
    /// spawn footprint is clear of every box in `occupied`
    pub fn update(&mut self, dt: f32, tuning: &Tuning, occupied: &[Aabb]) {
        self.tank.update(dt);

        if self.shield_timer > 0.0 {
            self.shield_timer = (self.shield_timer - dt).max(0.0);
        }

        if self.respawning {
            self.respawn_timer -= dt;
            if self.respawn_timer <= 0.0 {
                let spawn = Aabb::tank(Self::spawn_pos());
                if occupied.iter().any(|other| spawn.overlaps(other)) {
                    self.respawn_timer = 0.0;
                } else {
                    self.respawn(tuning.respawn_shield);
                }
            }
        }
    }

    /// Lose a life; schedule a respawn if any remain
    pub fn die(&mut self, respawn_delay: f32) {
        self.tank.alive = false;
        self.tank.moving = false;
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.respawning = true;
            self.respawn_timer = respawn_delay;
        }
    }

    /// Star upgrade: faster fire and bullets, steel-piercing at 3
    pub fn apply_star(&mut self) {
        if self.stars < MAX_STARS {
            self.stars += 1;
        }
        self.tank.power = self.stars;
        let (cooldown, speed_mult) = match self.stars {
            0 => (PLAYER_COOLDOWN, 1.0),
            1 => (0.2, 1.2),
            2 => (0.15, 1.4),
            _ => (0.1, 1.6),
        };
        self.tank.cooldown_rate = cooldown;
        self.tank.bullet_speed = PLAYER_BULLET_SPEED * speed_mult;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.shield_timer > 0.0
    }

    /// Lives exhausted and not on the field
    pub fn is_out(&self) -> bool {
        self.lives == 0 && !self.tank.alive
    }
}

/// Enemy tank types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Power,
    Armour,
}

/// Per-type enemy parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub speed: f32,
    pub hp: u8,
    /// Shots per second while the cooldown allows
    pub shoot_chance: f32,
    /// Initial direction-change interval
    pub dir_interval: f32,
    pub score: u64,
    pub bullet_speed: f32,
}

const ENEMY_PROFILES: [EnemyProfile; 4] = [
    EnemyProfile {
        speed: 60.0,
        hp: 1,
        shoot_chance: 0.8,
        dir_interval: 2.0,
        score: SCORE_BASIC,
        bullet_speed: ENEMY_BULLET_SPEED,
    },
    EnemyProfile {
        speed: 120.0,
        hp: 1,
        shoot_chance: 1.2,
        dir_interval: 1.0,
        score: SCORE_FAST,
        bullet_speed: ENEMY_BULLET_SPEED,
    },
    EnemyProfile {
        speed: 80.0,
        hp: 1,
        shoot_chance: 2.0,
        dir_interval: 1.5,
        score: SCORE_POWER,
        bullet_speed: ENEMY_BULLET_SPEED * 1.3,
    },
    EnemyProfile {
        speed: 50.0,
        hp: 4,
        shoot_chance: 0.6,
        dir_interval: 2.5,
        score: SCORE_ARMOUR,
        bullet_speed: ENEMY_BULLET_SPEED,
    },
];

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Power,
        EnemyKind::Armour,
    ];

    pub fn profile(self) -> &'static EnemyProfile {
        &ENEMY_PROFILES[self as usize]
    }
}

/// An AI-controlled tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTank {
    pub tank: Tank,
    pub kind: EnemyKind,
    /// Time until the next direction decision
    pub dir_timer: f32,
    pub dir_interval: f32,
    pub shoot_chance: f32,
    pub score_value: u64,
    /// Drops a power-up when destroyed
    pub carries_powerup: bool,
    /// Flash phase for carriers
    pub flash_timer: f32,
}

impl EnemyTank {
    pub fn new(pos: Vec2, kind: EnemyKind, carries_powerup: bool) -> Self {
        let profile = kind.profile();
        let mut tank = Tank::new(pos, profile.speed, profile.hp);
        tank.bullet_speed = profile.bullet_speed;
        tank.cooldown_rate = ENEMY_COOLDOWN;
        tank.dir = Direction::Down;
        tank.moving = true;
        Self {
            tank,
            kind,
            dir_timer: profile.dir_interval,
            dir_interval: profile.dir_interval,
            shoot_chance: profile.shoot_chance,
            score_value: profile.score,
            carries_powerup,
            flash_timer: 0.0,
        }
    }

    /// Animation and cooldown; runs even while enemies are frozen
    pub fn update(&mut self, dt: f32) {
        self.tank.update(dt);
        if self.carries_powerup {
            self.flash_timer += dt;
        }
    }

    /// Bright phase of the carrier flash
    pub fn is_flashing(&self) -> bool {
        self.carries_powerup && ((self.flash_timer * 6.0) as u32).is_multiple_of(2)
    }
}

/// Number of trail slots kept per bullet
pub const TRAIL_LENGTH: usize = 3;

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub dir: Direction,
    pub speed: f32,
    /// 0 normal, >= 3 breaks steel
    pub power: u8,
    pub from_player: bool,
    pub active: bool,
    /// Previous positions, oldest first
    pub trail: [Vec2; TRAIL_LENGTH],
    pub trail_len: usize,
}

impl Bullet {
    pub fn new(pos: Vec2, dir: Direction, speed: f32, power: u8, from_player: bool) -> Self {
        Self {
            pos,
            dir,
            speed,
            power,
            from_player,
            active: true,
            trail: [Vec2::ZERO; TRAIL_LENGTH],
            trail_len: 0,
        }
    }

    /// Record trail, move, and deactivate once outside the play area
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        if self.trail_len < TRAIL_LENGTH {
            self.trail[self.trail_len] = self.pos;
            self.trail_len += 1;
        } else {
            self.trail.rotate_left(1);
            self.trail[TRAIL_LENGTH - 1] = self.pos;
        }

        self.pos += self.dir.delta() * self.speed * dt;

        if self.pos.x < 0.0
            || self.pos.x > PLAY_AREA_WIDTH
            || self.pos.y < 0.0
            || self.pos.y > PLAY_AREA_HEIGHT
        {
            self.active = false;
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(BULLET_SIZE / 2.0)
    }

    pub fn bbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(BULLET_SIZE))
    }

    /// Trail positions recorded so far, oldest first
    pub fn trail(&self) -> &[Vec2] {
        &self.trail[..self.trail_len]
    }
}

/// The player's base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eagle {
    /// Top-left sub-block of the 2x2 eagle
    pub cell: (i32, i32),
    /// Derived from the grid each tick; the EagleDead tile is authoritative
    pub alive: bool,
    pub fortified: bool,
    pub fort_timer: f32,
    /// Ring cells currently turned to steel
    pub fortified_cells: Vec<(i32, i32)>,
}

impl Eagle {
    pub fn new(cell: (i32, i32)) -> Self {
        Self {
            cell,
            alive: true,
            fortified: false,
            fort_timer: 0.0,
            fortified_cells: Vec::new(),
        }
    }

    /// Locate the eagle on a freshly loaded grid
    pub fn from_grid(grid: &Grid) -> Self {
        let cell = grid.find(TileType::Eagle).unwrap_or(DEFAULT_EAGLE_CELL);
        let mut eagle = Self::new(cell);
        eagle.sync(grid);
        eagle
    }

    pub fn pos(&self) -> Vec2 {
        cell_to_pixel(self.cell.0, self.cell.1)
    }

    pub fn center(&self) -> Vec2 {
        self.pos() + Vec2::splat(SUB_BLOCK)
    }

    /// Re-derive `alive` from the grid
    pub fn sync(&mut self, grid: &Grid) {
        self.alive = !grid.contains(TileType::EagleDead);
    }

    /// Count down fortification. Returns true on the tick it expires.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.fortified {
            return false;
        }
        self.fort_timer -= dt;
        if self.fort_timer <= 0.0 {
            self.fortified = false;
            self.fort_timer = 0.0;
            return true;
        }
        false
    }
}

/// Where the eagle sits in the built-in stages
pub const DEFAULT_EAGLE_CELL: (i32, i32) = (12, 24);

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Upgrade fire power
    Star,
    /// Extra life
    Tank,
    /// Temporary invulnerability
    Helmet,
    /// Fortify the eagle with steel
    Shovel,
    /// Destroy all active enemies
    Bomb,
    /// Freeze all enemies
    Clock,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Star,
        PowerUpKind::Tank,
        PowerUpKind::Helmet,
        PowerUpKind::Shovel,
        PowerUpKind::Bomb,
        PowerUpKind::Clock,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Star => "STAR",
            PowerUpKind::Tank => "TANK",
            PowerUpKind::Helmet => "HELMET",
            PowerUpKind::Shovel => "SHOVEL",
            PowerUpKind::Bomb => "BOMB",
            PowerUpKind::Clock => "CLOCK",
        }
    }
}

/// A collectible on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub active: bool,
    pub flash_timer: f32,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind) -> Self {
        Self {
            pos,
            kind,
            active: true,
            flash_timer: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.flash_timer += dt;
    }

    /// Blink phase for rendering
    pub fn is_visible(&self) -> bool {
        ((self.flash_timer * 4.0) as u32).is_multiple_of(2)
    }

    pub fn bbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(POWERUP_SIZE))
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// Current stage index (0-based)
    pub level: usize,
    /// Seconds since start, for animations
    pub time: f32,
    /// Remaining time on the intro/game-over/level-complete screen
    pub phase_timer: f32,
    /// Menu cursor (0 = new game, 1 = continue)
    pub menu_index: usize,
    pub grid: Grid,
    pub player: PlayerTank,
    pub eagle: Eagle,
    pub enemies: Vec<EnemyTank>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    pub spawner: Spawner,
    /// Clock power-up: enemies hold still while > 0
    pub freeze_timer: f32,
    /// Audio triggers since the last drain
    pub events: Vec<GameEvent>,
    /// Visual impacts from the most recent tick
    pub impacts: Vec<Impact>,
    pub tuning: Tuning,
    session: Session,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game sitting at the menu
    pub fn new(seed: u64, session: Session, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            seed,
            phase: GamePhase::Menu,
            level: 0,
            time: 0.0,
            phase_timer: 0.0,
            menu_index: 0,
            grid: Grid::new(),
            player: PlayerTank::new(&tuning),
            eagle: Eagle::new(DEFAULT_EAGLE_CELL),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            spawner: Spawner::empty(&tuning),
            freeze_timer: 0.0,
            events: Vec::new(),
            impacts: Vec::new(),
            tuning,
            session,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Persisted progress, updated on game over and level completion
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Take the pending audio events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a fresh run at the given stage
    pub fn start_game(&mut self, level: usize) {
        self.player = PlayerTank::new(&self.tuning);
        self.start_level(level.min(levels::LEVEL_COUNT - 1));
    }

    /// Load a stage and reset all per-level state. Returns false for an unknown index.
    pub fn start_level(&mut self, index: usize) -> bool {
        let Some(layout) = levels::level(index) else {
            return false;
        };

        self.level = index;
        self.grid.load_level(layout);
        self.bullets.clear();
        self.enemies.clear();
        self.powerups.clear();
        self.freeze_timer = 0.0;
        self.spawner = Spawner::new(index, &self.tuning, &mut self.rng);
        self.eagle = Eagle::from_grid(&self.grid);
        self.player.respawn(self.tuning.respawn_shield);

        self.phase = GamePhase::LevelIntro;
        self.phase_timer = LEVEL_INTRO_TIME;
        self.events.push(GameEvent::LevelStart);
        log::info!(
            "Stage {} loaded: {} enemies queued",
            index + 1,
            self.spawner.remaining()
        );
        true
    }

    pub fn alive_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.tank.alive).count()
    }

    /// Enemies still to fight: queued plus on the field
    pub fn enemies_remaining(&self) -> usize {
        self.spawner.remaining() + self.alive_enemy_count()
    }

    /// Boxes of all live enemies
    pub fn enemy_boxes(&self) -> Vec<Aabb> {
        self.enemies
            .iter()
            .filter(|e| e.tank.alive)
            .map(|e| e.tank.bbox())
            .collect()
    }

    /// Boxes of every live tank except the enemy at `skip`
    pub fn tank_boxes_excluding(&self, skip: Option<usize>) -> Vec<Aabb> {
        let mut boxes = Vec::with_capacity(self.enemies.len() + 1);
        if self.player.tank.alive {
            boxes.push(self.player.tank.bbox());
        }
        boxes.extend(
            self.enemies
                .iter()
                .enumerate()
                .filter(|&(i, e)| e.tank.alive && Some(i) != skip)
                .map(|(_, e)| e.tank.bbox()),
        );
        boxes
    }

    /// Drop a power-up on a random sub-block aligned cell
    pub fn spawn_powerup(&mut self) {
        let x = self.rng.random_range(2..24);
        let y = self.rng.random_range(2..24);
        let kind = PowerUpKind::random(&mut self.rng);
        let pos = cell_to_pixel(x, y);
        log::debug!("Power-up {} dropped at {:?}", kind.name(), pos);
        self.powerups.push(PowerUp::new(pos, kind));
    }

    /// Remove dead tanks and spent bullets/power-ups
    pub fn compact(&mut self) {
        self.bullets.retain(|b| b.active);
        self.enemies.retain(|e| e.tank.alive);
        self.powerups.retain(|p| p.active);
    }
}
