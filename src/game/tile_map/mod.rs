use bevy::prelude::*;
use serde::{Deserialize, Serialize};

mod io;
pub mod generation;

pub use io::{MapError, TileMapSnapshot, SNAPSHOT_VERSION};

/// Integer code stored per tile.
pub type TileCode = i32;

/// Named tile codes used by the platformer scene.
///
/// Only the solid range `[SOLID_MIN, SOLID_MAX)` carries meaning for the
/// pathfinder and the collider; everything else is a gameplay marker.
pub mod codes {
    use super::TileCode;

    pub const EMPTY: TileCode = 0;
    pub const TREE: TileCode = 2;
    pub const EXTRA_LIFE: TileCode = 10;
    pub const SPIKES: TileCode = 20;
    pub const HEAL: TileCode = 21;
    pub const EXIT: TileCode = 99;
    pub const SOLID_MIN: TileCode = 100;
    pub const SOLID_MAX: TileCode = 200;
    pub const PLAYER_SPAWN: TileCode = 200;
    pub const ENEMY_SPAWN: TileCode = 300;
}

/// A tile is solid iff its code lies in `[100, 200)`.
#[inline]
pub fn is_solid(code: TileCode) -> bool {
    (codes::SOLID_MIN..codes::SOLID_MAX).contains(&code)
}

/// Grid coordinate of a tile: `x` is the column, `y` is the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: usize,
    pub y: usize,
}

impl TilePos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Leveled 2D tile grid.
///
/// Storage is row-major with row 0 at the TOP of the level, the way the
/// level tables are authored. World space has its origin at the
/// bottom-left. Every accessor therefore takes an `invert` flag that maps
/// a bottom-left row to its storage row via `rows - 1 - row`; collision and
/// pathfinding always pass `invert = true`, table IO never does.
///
/// # Example
///
/// ```rust
/// use bevy::math::Vec2;
/// use gdt_framework::game::tile_map::{TileMap, TilePos};
///
/// let mut map = TileMap::new(1, 24, 32, Vec2::splat(25.0));
/// map.set(0, 3, 101, true); // bottom row, 4th column
///
/// assert_eq!(map.get(23, 3, false), Some(101)); // same cell, storage order
/// assert_eq!(map.tile_at_position(Vec2::new(80.0, 10.0)), Some(TilePos::new(3, 0)));
/// assert!(map.is_solid_at(0, 3, true));
/// ```
///
/// # Invariants
///
/// - Dimensions are fixed at construction; loads never resize.
/// - `current_level < levels` at all times.
#[derive(Resource, Clone, Debug)]
pub struct TileMap {
    levels: usize,
    rows: usize,
    cols: usize,
    tile_size: Vec2,
    current_level: usize,
    tiles: Vec<Vec<TileCode>>,
}

impl TileMap {
    /// Allocate `levels` zero-filled levels of `rows x cols` tiles.
    pub fn new(levels: usize, rows: usize, cols: usize, tile_size: Vec2) -> Self {
        let levels = levels.max(1);
        Self {
            levels,
            rows,
            cols,
            tile_size,
            current_level: 0,
            tiles: vec![vec![codes::EMPTY; rows * cols]; levels],
        }
    }

    // Getters for grid parameters
    pub fn levels(&self) -> usize { self.levels }
    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn tile_size(&self) -> Vec2 { self.tile_size }
    pub fn current_level(&self) -> usize { self.current_level }

    /// World-space width and height of a level.
    pub fn map_extent(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * self.tile_size.x, self.rows as f32 * self.tile_size.y)
    }

    /// Switch the active level. Out-of-range requests are ignored.
    pub fn set_current_level(&mut self, level: usize) {
        if level >= self.levels {
            warn!("[TILE_MAP] Ignoring switch to level {} ({} levels loaded)", level, self.levels);
            return;
        }
        self.current_level = level;
    }

    /// Convert a world position to the tile containing it.
    ///
    /// Positions outside `[0, cols*tile_w) x [0, rows*tile_h)` yield `None`.
    pub fn tile_at_position(&self, pos: Vec2) -> Option<TilePos> {
        let extent = self.map_extent();
        if !(pos.x >= 0.0 && pos.x < extent.x && pos.y >= 0.0 && pos.y < extent.y) {
            return None;
        }

        let col = (pos.x / self.tile_size.x) as usize;
        let row = (pos.y / self.tile_size.y) as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }

        Some(TilePos::new(col, row))
    }

    /// World position of the centre of a (bottom-left origin) tile.
    pub fn tile_center(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            col as f32 * self.tile_size.x + self.tile_size.x * 0.5,
            row as f32 * self.tile_size.y + self.tile_size.y * 0.5,
        )
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline]
    fn storage_idx(&self, row: usize, col: usize, invert: bool) -> Option<usize> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let row = if invert { self.rows - 1 - row } else { row };
        Some(row * self.cols + col)
    }

    /// Write a tile code on the current level. Returns false when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: TileCode, invert: bool) -> bool {
        match self.storage_idx(row, col, invert) {
            Some(idx) => {
                self.tiles[self.current_level][idx] = value;
                true
            }
            None => false,
        }
    }

    /// Read a tile code from the current level.
    pub fn get(&self, row: usize, col: usize, invert: bool) -> Option<TileCode> {
        self.storage_idx(row, col, invert)
            .map(|idx| self.tiles[self.current_level][idx])
    }

    pub fn clear_cell(&mut self, row: usize, col: usize, invert: bool) -> bool {
        self.set(row, col, codes::EMPTY, invert)
    }

    /// Solidity test. Out-of-bounds tiles are not solid; callers that care
    /// about the map edge bounds-check first.
    #[inline]
    pub fn is_solid_at(&self, row: usize, col: usize, invert: bool) -> bool {
        self.get(row, col, invert).is_some_and(is_solid)
    }

    /// Find the first tile holding `value` in storage order (top to bottom,
    /// left to right). The returned row is flipped when `invert` is set.
    /// Nothing is cleared; the caller erases the marker if it consumes it.
    pub fn find_value(&self, value: TileCode, invert: bool) -> Option<TilePos> {
        let level = &self.tiles[self.current_level];
        let idx = level.iter().position(|&code| code == value)?;
        let (row, col) = (idx / self.cols, idx % self.cols);
        let row = if invert { self.rows - 1 - row } else { row };
        Some(TilePos::new(col, row))
    }

    /// Raw storage of one level, row-major with row 0 at the top.
    pub fn level_tiles(&self, level: usize) -> Option<&[TileCode]> {
        self.tiles.get(level).map(|tiles| tiles.as_slice())
    }

    pub(crate) fn level_tiles_mut(&mut self, level: usize) -> Option<&mut Vec<TileCode>> {
        self.tiles.get_mut(level)
    }

    /// Number of tiles on the current level holding `value`.
    pub fn count_value(&self, value: TileCode) -> usize {
        self.tiles[self.current_level].iter().filter(|&&code| code == value).count()
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(1, 24, 32, Vec2::splat(25.0))
    }
}
