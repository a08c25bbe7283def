use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use super::{codes, TileCode, TileMap};

/// Scatter solid tiles over the empty cells of `level`.
///
/// Each empty tile becomes solid with probability `density`; marker tiles
/// and existing walls are left alone. The same seed always produces the
/// same layout. Returns the number of tiles placed.
pub fn scatter_solid_tiles(map: &mut TileMap, level: usize, seed: u64, density: f64) -> usize {
    let density = density.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(seed);
    let Some(tiles) = map.level_tiles_mut(level) else {
        warn!("[TILE_MAP] Cannot scatter obstacles on missing level {}", level);
        return 0;
    };

    let mut placed = 0;
    for tile in tiles.iter_mut() {
        // Roll for every tile so the layout only depends on the seed and size
        let roll = rng.random_bool(density);
        let code: TileCode = rng.random_range(codes::SOLID_MIN..codes::SOLID_MAX);
        if *tile == codes::EMPTY && roll {
            *tile = code;
            placed += 1;
        }
    }

    info!("[TILE_MAP] Scattered {} solid tiles on level {} (seed {}, density {:.2})",
        placed, level, seed, density);
    placed
}

/// Surround `level` with a one-tile solid border.
pub fn add_border(map: &mut TileMap, level: usize, code: TileCode) {
    let (rows, cols) = (map.rows(), map.cols());
    let Some(tiles) = map.level_tiles_mut(level) else {
        return;
    };
    for row in 0..rows {
        for col in 0..cols {
            if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                tiles[row * cols + col] = code;
            }
        }
    }
}
