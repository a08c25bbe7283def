use crate::game::tile_map::TilePos;

/// Path-cost estimate between two tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    #[default]
    Manhattan,
    Euclidean,
}

impl Heuristic {
    #[inline]
    pub fn estimate(self, from: TilePos, to: TilePos, weight: u32) -> u32 {
        match self {
            Heuristic::Manhattan => manhattan(from, to, weight),
            Heuristic::Euclidean => euclidean(from, to, weight),
        }
    }
}

#[inline]
fn deltas(from: TilePos, to: TilePos) -> (u32, u32) {
    (from.x.abs_diff(to.x) as u32, from.y.abs_diff(to.y) as u32)
}

/// `weight * (|dx| + |dy|)`
pub fn manhattan(from: TilePos, to: TilePos, weight: u32) -> u32 {
    let (dx, dy) = deltas(from, to);
    weight.saturating_mul(dx + dy)
}

/// `weight * sqrt(dx² + dy²)`, truncated.
pub fn euclidean(from: TilePos, to: TilePos, weight: u32) -> u32 {
    let (dx, dy) = deltas(from, to);
    let dist = ((dx as f64).powi(2) + (dy as f64).powi(2)).sqrt();
    (weight as f64 * dist) as u32
}
