use bevy::prelude::*;
use crate::game::tile_map::TileMap;


/// Inset applied to a box's corners before they are converted to tile
/// indices, so a box resting exactly on a tile edge does not register the
/// neighbouring tile.
pub const SIZE_TOLERANCE: Vec2 = Vec2::new(0.05, 0.05);

/// Outcome of a swept tile check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionResult {
    /// A sample corner fell outside the map. The caller should abort the move.
    Invalid,
    /// The swept band is free of solid tiles.
    Negative,
    /// A solid tile was hit and the end position was clamped against it.
    Positive,
}

/// Axis-aligned box swept against the solid tiles of a [`TileMap`].
///
/// This is a discrete scan over the rows (or columns) between the start and
/// end positions, not a continuous sweep. The row the box starts in is never
/// treated as a hit, so per-frame displacement must stay below one tile or
/// thin walls can be skipped.
///
/// # Example
///
/// ```rust
/// use bevy::math::Vec2;
/// use gdt_framework::game::tile_map::TileMap;
/// use gdt_framework::game::tile_collision::{CollisionResult, TileCollider};
///
/// let mut map = TileMap::new(1, 8, 8, Vec2::splat(10.0));
/// map.set(1, 2, 100, true); // floor tile under column 2
///
/// let collider = TileCollider::new(Vec2::splat(5.0));
/// let start = Vec2::new(25.0, 25.0);
/// let mut end = Vec2::new(25.0, 17.0);
///
/// assert_eq!(collider.check_vertical(&map, start, &mut end), CollisionResult::Positive);
/// assert_eq!(end.y, 25.0); // (1 + 1) * 10 + 5
/// ```
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct TileCollider {
    pub half_size: Vec2,
    pub tolerance: Vec2,
}

impl TileCollider {
    pub fn new(half_size: Vec2) -> Self {
        Self { half_size, tolerance: SIZE_TOLERANCE }
    }

    /// Tile (col, row) of each sample corner, or `None` if any is off-map.
    fn corner_tiles(map: &TileMap, corners: [Vec2; 4]) -> Option<[(i64, i64); 4]> {
        let mut out = [(0, 0); 4];
        for (slot, corner) in out.iter_mut().zip(corners) {
            let tile = map.tile_at_position(corner)?;
            *slot = (tile.x as i64, tile.y as i64);
        }
        Some(out)
    }

    #[inline]
    fn solid(map: &TileMap, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && map.is_solid_at(row as usize, col as usize, true)
    }

    /// Check the vertical component of a move from `start` to `end`.
    ///
    /// On [`CollisionResult::Positive`] only `end.y` is modified.
    pub fn check_vertical(&self, map: &TileMap, start: Vec2, end: &mut Vec2) -> CollisionResult {
        let half = self.half_size;
        let tol = self.tolerance;

        // Left/right sample corners: the leading edge at the start and the
        // trailing edge at the end, so the band covers the whole sweep.
        let corners = if end.y > start.y {
            [
                start - half + tol,
                Vec2::new(start.x + half.x - tol.x, start.y - half.y + tol.y),
                Vec2::new(end.x - half.x + tol.x, end.y + half.y - tol.y),
                *end + half - tol,
            ]
        } else {
            [
                Vec2::new(start.x - half.x + tol.x, start.y + half.y - tol.y),
                start + half - tol,
                *end - half + tol,
                Vec2::new(end.x + half.x - tol.x, end.y - half.y + tol.y),
            ]
        };

        let Some([(_, start_row), _, (end_left_col, end_row), (end_right_col, _)]) =
            Self::corner_tiles(map, corners)
        else {
            debug!("[COLLISION] Vertical sweep {:?} -> {:?} leaves the map", start, end);
            return CollisionResult::Invalid;
        };

        let tile_h = map.tile_size().y;
        let dy = end.y - start.y;

        if dy < 0.0 {
            for row in (end_row..=start_row).rev() {
                for col in end_left_col..=end_right_col {
                    if Self::solid(map, row, col) {
                        if row == start_row {
                            continue;
                        }
                        end.y = (row + 1) as f32 * tile_h + half.y;
                        return CollisionResult::Positive;
                    }
                }
            }
        } else if dy > 0.0 {
            for row in start_row..=end_row {
                for col in end_left_col..=end_right_col {
                    if Self::solid(map, row, col) {
                        if row == start_row {
                            continue;
                        }
                        end.y = (row - 1) as f32 * tile_h + half.y;
                        return CollisionResult::Positive;
                    }
                }
            }
        }

        CollisionResult::Negative
    }

    /// Check the horizontal component of a move from `start` to `end`.
    ///
    /// The rows scanned are those spanned by the box at its start position.
    /// On [`CollisionResult::Positive`] only `end.x` is modified.
    pub fn check_horizontal(&self, map: &TileMap, start: Vec2, end: &mut Vec2) -> CollisionResult {
        let half = self.half_size;
        let tol = self.tolerance;

        // Top/bottom sample corners, trailing edge at start, leading at end
        let corners = if end.x > start.x {
            [
                Vec2::new(start.x - half.x + tol.x, start.y + half.y - tol.y),
                start - half + tol,
                *end + half - tol,
                Vec2::new(end.x + half.x - tol.x, end.y - half.y + tol.y),
            ]
        } else {
            [
                start + half - tol,
                Vec2::new(start.x + half.x - tol.x, start.y - half.y + tol.y),
                Vec2::new(end.x - half.x + tol.x, end.y + half.y - tol.y),
                *end - half + tol,
            ]
        };

        let Some([(_, top_row), (start_col, bottom_row), _, (end_col, _)]) =
            Self::corner_tiles(map, corners)
        else {
            debug!("[COLLISION] Horizontal sweep {:?} -> {:?} leaves the map", start, end);
            return CollisionResult::Invalid;
        };

        let tile_w = map.tile_size().x;
        let dx = end.x - start.x;

        if dx < 0.0 {
            for col in (end_col..=start_col).rev() {
                for row in bottom_row..=top_row {
                    if Self::solid(map, row, col) {
                        if col == start_col {
                            continue;
                        }
                        end.x = (col + 1) as f32 * tile_w + half.x;
                        return CollisionResult::Positive;
                    }
                }
            }
        } else if dx > 0.0 {
            for col in start_col..=end_col {
                for row in bottom_row..=top_row {
                    if Self::solid(map, row, col) {
                        if col == start_col {
                            continue;
                        }
                        end.x = (col - 1) as f32 * tile_w + half.x;
                        return CollisionResult::Positive;
                    }
                }
            }
        }

        CollisionResult::Negative
    }
}

/// Keep a position half a tile inside the outer edges of the map.
///
/// At most one axis is corrected per call: x first, then y. Returns whether
/// the position was clamped so the caller can cancel outward velocity.
pub fn constrain_to_map(map: &TileMap, position: &mut Vec2) -> bool {
    let half_tile = map.tile_size() * 0.5;
    let extent = map.map_extent();

    if position.x <= half_tile.x {
        position.x = half_tile.x;
        return true;
    } else if position.x >= extent.x - half_tile.x {
        position.x = extent.x - half_tile.x;
        return true;
    }

    if position.y >= extent.y - half_tile.y {
        position.y = extent.y - half_tile.y;
        return true;
    } else if position.y <= half_tile.y {
        position.y = half_tile.y;
        return true;
    }

    false
}
