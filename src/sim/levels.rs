//! Built-in stage layouts
//!
//! Each stage is 26 rows of 26 characters: `.` empty, `B` brick, `S` steel,
//! `W` water, `I` ice, `F` forest, `E` eagle. The eagle sits at cells
//! (12, 24)-(13, 25) behind a brick ring; spawn points and the player start
//! are left clear.

/// Number of built-in stages
pub const LEVEL_COUNT: usize = 4;

/// Stage layouts in play order
pub const LEVELS: [&str; LEVEL_COUNT] = [
    // Brick columns
    concat!(
        "..........................\n",
        "..........................\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..........................\n",
        "............SS............\n",
        "BB..BBBB....SS....BBBB..BB\n",
        "....BBBB..........BBBB....\n",
        "..........................\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BBBBBB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..BB..BB..BB..BB..BB..BB..\n",
        "..........................\n",
        "...........BBBB...........\n",
        "...........BEEB...........\n",
        "...........BEEB...........",
    ),
    // Steel and water
    concat!(
        "..........................\n",
        "..........................\n",
        "..SSSS......SS......SSSS..\n",
        "..SSSS......SS......SSSS..\n",
        "........BB..SS..BB........\n",
        "........BB..SS..BB........\n",
        "........BB......BB........\n",
        "........BB......BB........\n",
        "..WWWW..BBSS..SSBB..WWWW..\n",
        "..WWWW..BBSS..SSBB..WWWW..\n",
        "..WWWW......BB......WWWW..\n",
        "..WWWW......BB......WWWW..\n",
        "............BB............\n",
        "............BB............\n",
        "....BBBBBB..BB..BBBBBB....\n",
        "....BBBBBB..BB..BBBBBB....\n",
        "..........................\n",
        "..........................\n",
        "SSSS..BBBB......BBBB..SSSS\n",
        "SSSS..BBBB......BBBB..SSSS\n",
        "......BBBB......BBBB......\n",
        "..........................\n",
        "..........................\n",
        "...........BBBB...........\n",
        "...........BEEB...........\n",
        "...........BEEB...........",
    ),
    // Forest and ice
    concat!(
        "..........................\n",
        "..........................\n",
        "..........................\n",
        "..........................\n",
        "FFFFFFFF..IIIIII..FFFFFFFF\n",
        "FFFFFFFF..IIIIII..FFFFFFFF\n",
        "FFFFFFFF..IIIIII..FFFFFFFF\n",
        "FFFFFFFF..IIIIII..FFFFFFFF\n",
        "..........................\n",
        "..........................\n",
        "..BBBB..SS......SS..BBBB..\n",
        "..BBBB..SS......SS..BBBB..\n",
        "........SS.FFFF.SS........\n",
        "........SS.FFFF.SS........\n",
        "..IIII..SS.FFFF.SS..IIII..\n",
        "..IIII..SS.FFFF.SS..IIII..\n",
        "..IIII..............IIII..\n",
        "..IIII..............IIII..\n",
        "..........................\n",
        "....BBBB..BB..BB..BBBB....\n",
        "....BBBB..BB..BB..BBBB....\n",
        "..........................\n",
        "..........................\n",
        "...........BBBB...........\n",
        "...........BEEB...........\n",
        "...........BEEB...........",
    ),
    // Fortress
    concat!(
        "..........................\n",
        "..........................\n",
        "..SS..BB..........BB..SS..\n",
        "..SS..BB..........BB..SS..\n",
        "..SS..BB..BBBBBB..BB..SS..\n",
        "..SS..BB..BBBBBB..BB..SS..\n",
        "..SS..BB..........BB..SS..\n",
        "..SS..BB..........BB..SS..\n",
        "..SS......FFFFFF......SS..\n",
        "..SS......FFFFFF......SS..\n",
        "..SSWWWWWWFFFFFFWWWWWWSS..\n",
        "..SSWWWWWWFFFFFFWWWWWWSS..\n",
        "..........FFFFFF..........\n",
        "..........FFFFFF..........\n",
        "..BBBBBBBB......BBBBBBBB..\n",
        "..BBBBBBBB......BBBBBBBB..\n",
        "............SS............\n",
        "............SS............\n",
        "..II..SSSS......SSSS..II..\n",
        "..II..SSSS......SSSS..II..\n",
        "..II..................II..\n",
        "..II..................II..\n",
        "..........................\n",
        "...........BBBB...........\n",
        "...........BEEB...........\n",
        "...........BEEB...........",
    ),
];

/// Layout for a stage index, if it exists
pub fn level(index: usize) -> Option<&'static str> {
    LEVELS.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{GRID_HEIGHT, GRID_WIDTH, PLAYER_SPAWN_CELL};
    use crate::sim::grid::{Grid, TileType};
    use crate::sim::spawner::SPAWN_POINTS;

    #[test]
    fn test_levels_are_full_size() {
        for (i, text) in LEVELS.iter().enumerate() {
            let rows: Vec<&str> = text.split('\n').collect();
            assert_eq!(rows.len(), GRID_HEIGHT, "level {i}");
            assert!(rows.iter().all(|r| r.len() == GRID_WIDTH), "level {i}");
        }
    }

    #[test]
    fn test_levels_keep_spawns_clear_and_eagle_placed() {
        for (i, text) in LEVELS.iter().enumerate() {
            let grid = Grid::from_level(text);
            assert_eq!(grid.find(TileType::Eagle), Some((12, 24)), "level {i}");
            for &(x, y) in &SPAWN_POINTS {
                assert!(grid.is_passable_footprint(x, y), "level {i} spawn ({x},{y})");
            }
            let (px, py) = PLAYER_SPAWN_CELL;
            assert!(grid.is_passable_footprint(px, py), "level {i} player spawn");
        }
    }

    #[test]
    fn test_level_lookup() {
        assert!(level(0).is_some());
        assert!(level(LEVEL_COUNT).is_none());
    }
}
