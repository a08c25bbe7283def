use bevy::prelude::*;
use std::collections::BinaryHeap;
use crate::game::tile_map::{TileMap, TilePos};

mod astar;
pub mod heuristics;
pub mod types;

pub use heuristics::{euclidean, manhattan, Heuristic};
pub use types::{NodeState, PathNode, DIRECTIONS};

/// Grid A* pathfinder over a [`TileMap`].
///
/// Holds only scratch buffers between calls: the node table (one entry per
/// tile) and the open heap are reset at the start of every search, so no
/// result depends on a previous search.
///
/// # Example
///
/// ```rust
/// use bevy::math::Vec2;
/// use gdt_framework::game::tile_map::{TileMap, TilePos};
/// use gdt_framework::game::pathfinding::{Heuristic, PathFinder};
///
/// let map = TileMap::new(1, 10, 10, Vec2::ONE);
/// let mut finder = PathFinder::new(false);
///
/// let path = finder.find_path(&map, TilePos::new(0, 0), TilePos::new(5, 5), Heuristic::Manhattan, 1);
/// assert_eq!(path.len(), 10);
/// assert_eq!(path.last(), Some(&TilePos::new(5, 5)));
/// ```
///
/// # Performance
///
/// - **Search:** O(N log N) in the number of tiles expanded
/// - **Memory:** one [`PathNode`] per tile, allocated once and reused
#[derive(Resource, Debug, Default)]
pub struct PathFinder {
    diagonal: bool,
    pub(crate) nodes: Vec<PathNode>,
    pub(crate) open: BinaryHeap<types::OpenEntry>,
    pub(crate) next_seq: u64,
    pub(crate) cols: usize,
    pub(crate) last_expanded: usize,
}

impl PathFinder {
    pub fn new(diagonal: bool) -> Self {
        Self { diagonal, ..default() }
    }

    /// Toggle 8-directional movement.
    pub fn set_diagonal_movement(&mut self, enable: bool) {
        self.diagonal = enable;
    }

    pub fn diagonal_movement(&self) -> bool {
        self.diagonal
    }

    /// Nodes expanded by the most recent search.
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Convenience wrapper taking world positions.
    pub fn find_path_world(
        &mut self,
        map: &TileMap,
        start: Vec2,
        goal: Vec2,
        heuristic: Heuristic,
        weight: u32,
    ) -> Vec<TilePos> {
        match (map.tile_at_position(start), map.tile_at_position(goal)) {
            (Some(start), Some(goal)) => self.find_path(map, start, goal, heuristic, weight),
            _ => Vec::new(),
        }
    }
}
