//! Tile grid for the destructible battlefield
//!
//! The world is a fixed 26x26 array of sub-blocks. Tanks occupy a 2x2
//! footprint; bullets test the single cell under their center.

use serde::{Deserialize, Serialize};

use crate::consts::{GRID_HEIGHT, GRID_WIDTH, STEEL_PIERCE_POWER};

/// Tile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    /// Destructible wall
    Brick,
    /// Indestructible wall (unless 3-star)
    Steel,
    /// Impassable to tanks, bullets pass over
    Water,
    /// Tanks move faster on ice
    Ice,
    /// Visual overlay, tanks pass under
    Forest,
    /// Player base (must protect)
    Eagle,
    /// Destroyed base
    EagleDead,
}

impl TileType {
    pub const ALL: [TileType; 8] = [
        TileType::Empty,
        TileType::Brick,
        TileType::Steel,
        TileType::Water,
        TileType::Ice,
        TileType::Forest,
        TileType::Eagle,
        TileType::EagleDead,
    ];

    /// Whether tanks can move through this tile
    pub fn is_passable(self) -> bool {
        matches!(self, TileType::Empty | TileType::Ice | TileType::Forest)
    }

    /// Whether bullets are stopped by this tile
    pub fn blocks_bullets(self) -> bool {
        matches!(
            self,
            TileType::Brick | TileType::Steel | TileType::Eagle | TileType::EagleDead
        )
    }

    /// Level-format character for this tile
    pub fn as_char(self) -> char {
        match self {
            TileType::Empty => '.',
            TileType::Brick => 'B',
            TileType::Steel => 'S',
            TileType::Water => 'W',
            TileType::Ice => 'I',
            TileType::Forest => 'F',
            TileType::Eagle | TileType::EagleDead => 'E',
        }
    }

    /// Parse a level-format character; unknown characters yield `None`
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(TileType::Empty),
            'B' => Some(TileType::Brick),
            'S' => Some(TileType::Steel),
            'W' => Some(TileType::Water),
            'I' => Some(TileType::Ice),
            'F' => Some(TileType::Forest),
            'E' => Some(TileType::Eagle),
            _ => None,
        }
    }
}

/// The 26x26 sub-block world
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grid {
    tiles: [[TileType; GRID_WIDTH]; GRID_HEIGHT],
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from level text
    pub fn from_level(text: &str) -> Self {
        let mut grid = Self::new();
        grid.load_level(text);
        grid
    }

    #[inline]
    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < GRID_WIDTH && (y as usize) < GRID_HEIGHT
    }

    /// Tile at a sub-block position. Out of bounds reads as Steel.
    pub fn get(&self, x: i32, y: i32) -> TileType {
        if Self::in_bounds(x, y) {
            self.tiles[y as usize][x as usize]
        } else {
            TileType::Steel
        }
    }

    /// Place a tile. No-op out of bounds.
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if Self::in_bounds(x, y) {
            self.tiles[y as usize][x as usize] = tile;
        }
    }

    /// Destroy a tile with the given attack power. Returns true if the tile changed.
    ///
    /// Brick always breaks, Steel needs power >= 3, Eagle becomes EagleDead.
    /// Everything else (including an already dead eagle) is untouched.
    pub fn destroy(&mut self, x: i32, y: i32, power: u8) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        let cell = &mut self.tiles[y as usize][x as usize];
        match *cell {
            TileType::Brick => {
                *cell = TileType::Empty;
                true
            }
            TileType::Steel if power >= STEEL_PIERCE_POWER => {
                *cell = TileType::Empty;
                true
            }
            TileType::Eagle => {
                *cell = TileType::EagleDead;
                true
            }
            _ => false,
        }
    }

    /// Whether a 2x2 tank footprint rooted at (x, y) fits on passable tiles
    pub fn is_passable_footprint(&self, x: i32, y: i32) -> bool {
        (0..2).all(|dy| (0..2).all(|dx| self.get(x + dx, y + dy).is_passable()))
    }

    /// Reset every tile to Empty
    pub fn clear(&mut self) {
        self.tiles = [[TileType::Empty; GRID_WIDTH]; GRID_HEIGHT];
    }

    /// Parse level text into the grid, clearing it first.
    ///
    /// One character per cell, `\n` separates rows. Unknown characters and
    /// anything past the 26x26 bounds are ignored (the cell stays Empty).
    pub fn load_level(&mut self, text: &str) {
        self.clear();
        let (mut x, mut y) = (0usize, 0usize);
        for ch in text.chars() {
            if ch == '\n' {
                y += 1;
                x = 0;
                continue;
            }
            if x < GRID_WIDTH && y < GRID_HEIGHT {
                if let Some(tile) = TileType::from_char(ch) {
                    self.tiles[y][x] = tile;
                }
            }
            x += 1;
        }
    }

    /// First cell (row-major) holding the given tile
    pub fn find(&self, tile: TileType) -> Option<(i32, i32)> {
        self.cells().find(|&(_, _, t)| t == tile).map(|(x, y, _)| (x, y))
    }

    /// Whether any cell holds the given tile
    pub fn contains(&self, tile: TileType) -> bool {
        self.tiles.iter().flatten().any(|&t| t == tile)
    }

    /// Iterate every cell as (x, y, tile) in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, TileType)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &t)| (x as i32, y as i32, t))
        })
    }

    /// Render back to level text (EagleDead prints as `E`)
    pub fn to_level_string(&self) -> String {
        let mut out = String::with_capacity((GRID_WIDTH + 1) * GRID_HEIGHT);
        for (y, row) in self.tiles.iter().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|t| t.as_char()));
        }
        out
    }
}
