use bevy::prelude::*;
use crate::game::tile_map::{TileMap, TilePos};
use crate::game::profiling::profile;
use super::heuristics::Heuristic;
use super::types::{NodeState, OpenEntry, PathNode, DIRECTIONS};
use super::PathFinder;

impl PathFinder {
    fn reset_scratch(&mut self, rows: usize, cols: usize) {
        self.nodes.clear();
        self.nodes.resize(rows * cols, PathNode::default());
        self.open.clear();
        self.next_seq = 0;
        self.cols = cols;
    }

    #[inline]
    fn idx(&self, pos: TilePos) -> usize {
        pos.y * self.cols + pos.x
    }

    fn push_open(&mut self, pos: TilePos, f: u32) {
        self.open.push(OpenEntry { f, seq: self.next_seq, pos });
        self.next_seq += 1;
    }

    /// A* search from `start` to `goal` over the current level of `map`.
    ///
    /// Positions are (column, row) with row 0 at the bottom of the level.
    /// The returned path excludes `start` and ends at `goal`. An empty path
    /// means one of: an endpoint is off the grid or solid, `start == goal`,
    /// or the goal cannot be reached.
    ///
    /// # Tie-breaking
    ///
    /// Among open nodes with equal `f`, the one pushed first is expanded
    /// first. Neighbours are pushed in [`DIRECTIONS`] order.
    #[profile(2)]
    pub fn find_path(
        &mut self,
        map: &TileMap,
        start: TilePos,
        goal: TilePos,
        heuristic: Heuristic,
        weight: u32,
    ) -> Vec<TilePos> {
        if !map.in_bounds(start.y, start.x) || !map.in_bounds(goal.y, goal.x) {
            debug!("[PATHFINDING] Endpoint outside grid: {:?} -> {:?}", start, goal);
            return Vec::new();
        }
        if map.is_solid_at(start.y, start.x, true) || map.is_solid_at(goal.y, goal.x, true) {
            debug!("[PATHFINDING] Blocked endpoint: {:?} -> {:?}", start, goal);
            return Vec::new();
        }

        let (rows, cols) = (map.rows(), map.cols());
        self.reset_scratch(rows, cols);

        let start_idx = self.idx(start);
        self.nodes[start_idx] = PathNode {
            parent: start,
            state: NodeState::Open,
            ..default()
        };
        self.push_open(start, 0);

        let num_directions = if self.diagonal { 8 } else { 4 };
        let mut found = false;
        let mut expanded = 0usize;

        while let Some(OpenEntry { pos: current, .. }) = self.open.pop() {
            if current == goal {
                found = true;
                break;
            }

            let current_idx = self.idx(current);
            // Superseded entry for a node that was already expanded
            if self.nodes[current_idx].state == NodeState::Closed {
                continue;
            }
            self.nodes[current_idx].state = NodeState::Closed;
            expanded += 1;

            let parent_g = self.nodes[current_idx].g;
            for &(dx, dy) in &DIRECTIONS[..num_directions] {
                let nx = current.x as i64 + dx as i64;
                let ny = current.y as i64 + dy as i64;
                if nx < 0 || ny < 0 || nx >= cols as i64 || ny >= rows as i64 {
                    continue;
                }
                let neighbor = TilePos::new(nx as usize, ny as usize);
                if map.is_solid_at(neighbor.y, neighbor.x, true) {
                    continue;
                }

                let neighbor_idx = self.idx(neighbor);
                let node = self.nodes[neighbor_idx];
                if node.state == NodeState::Closed {
                    continue;
                }

                let g = parent_g + 1;
                let h = heuristic.estimate(neighbor, goal, weight);
                let f = g.saturating_add(h);

                if node.state == NodeState::Unvisited || f < node.f {
                    self.nodes[neighbor_idx] = PathNode {
                        parent: current,
                        f,
                        g,
                        h,
                        state: NodeState::Open,
                    };
                    self.push_open(neighbor, f);
                }
            }
        }
        self.open.clear();
        self.last_expanded = expanded;

        if !found {
            debug!("[PATHFINDING] No path {:?} -> {:?} after {} expansions", start, goal, expanded);
            return Vec::new();
        }

        self.build_path(start, goal)
    }

    fn build_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        let mut path = Vec::new();
        let mut current = goal;
        loop {
            let parent = self.nodes[self.idx(current)].parent;
            if parent == current {
                break;
            }
            path.push(current);
            current = parent;
        }

        // A lone entry is only kept when start and goal are orthogonal
        // neighbours. This holds in diagonal mode too, so a single diagonal
        // step comes back empty.
        if path.len() == 1 {
            let distance = start.x.abs_diff(goal.x) + start.y.abs_diff(goal.y);
            if distance > 1 {
                path.clear();
            }
        } else {
            path.reverse();
        }

        path
    }
}
