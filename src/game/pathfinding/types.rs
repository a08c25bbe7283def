use std::cmp::Ordering;
use crate::game::tile_map::TilePos;

/// Neighbour offsets as (dx, dy). The first four are the cardinal moves;
/// diagonal search appends the last four. Order matters for tie-breaking.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0), (1, 0), (0, 1), (0, -1),
    (-1, -1), (1, 1), (-1, 1), (1, -1),
];

/// Search state of a grid node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Per-tile A* bookkeeping, reused across searches.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathNode {
    pub parent: TilePos,
    pub f: u32,
    pub g: u32,
    pub h: u32,
    pub state: NodeState,
}

/// Open-set entry. Ordered so that `BinaryHeap` pops the LOWEST `f` first,
/// and among equal `f` the entry pushed earliest (FIFO).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenEntry {
    pub f: u32,
    pub seq: u64,
    pub pos: TilePos,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
