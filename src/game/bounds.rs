use bevy::prelude::*;

/// World-space axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box at `position` with extents given as offsets from it.
    pub fn from_offsets(position: Vec3, box_min: Vec3, box_max: Vec3) -> Self {
        Self { min: position + box_min, max: position + box_max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Overlap on all three axes. Touching faces count as overlap.
    pub fn intersects(&self, other: &WorldBox) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x
            || self.max.y < other.min.y || self.min.y > other.max.y
            || self.max.z < other.min.z || self.min.z > other.max.z)
    }

    /// The 8 corners, min corner first.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Slab test. Returns the smallest non-negative ray parameter at which
    /// `origin + t * direction` is inside the box, so an origin inside the
    /// box hits at `t = 0`.
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Parallel to this slab: miss unless already between its planes
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }

    /// Whether the segment `start..=end` touches the box.
    pub fn segment_hit(&self, start: Vec3, end: Vec3) -> bool {
        self.ray_hit(start, end - start).is_some_and(|t| t <= 1.0)
    }
}
