use bevy::prelude::*;

/// Ground height lookup used to lift partition cells and snap objects.
pub trait HeightProvider {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Constant-height ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain(pub f32);

impl HeightProvider for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Regular grid of height samples spanning a world rectangle centred on the
/// origin in X/Z.
///
/// Samples are row-major with rows along Z. Queries outside the rectangle
/// are clamped to the nearest edge sample.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    size: Vec2,
    samples_x: usize,
    samples_z: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Returns `None` unless there are at least 2x2 samples and `heights`
    /// holds exactly `samples_x * samples_z` values.
    pub fn new(size: Vec2, samples_x: usize, samples_z: usize, heights: Vec<f32>) -> Option<Self> {
        if samples_x < 2 || samples_z < 2 || heights.len() != samples_x * samples_z {
            return None;
        }
        Some(Self { size, samples_x, samples_z, heights })
    }

    /// Build a field by sampling `f(x, z)` at every grid point.
    pub fn from_fn(size: Vec2, samples_x: usize, samples_z: usize, f: impl Fn(f32, f32) -> f32) -> Option<Self> {
        if samples_x < 2 || samples_z < 2 {
            return None;
        }
        let step = Vec2::new(size.x / (samples_x - 1) as f32, size.y / (samples_z - 1) as f32);
        let origin = -size * 0.5;
        let mut heights = Vec::with_capacity(samples_x * samples_z);
        for iz in 0..samples_z {
            for ix in 0..samples_x {
                heights.push(f(origin.x + ix as f32 * step.x, origin.y + iz as f32 * step.y));
            }
        }
        Self::new(size, samples_x, samples_z, heights)
    }

    pub fn size(&self) -> Vec2 { self.size }

    #[inline]
    fn sample(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * self.samples_x + ix]
    }
}

impl HeightProvider for HeightField {
    /// Bilinear interpolation between the four surrounding samples.
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let cells = Vec2::new((self.samples_x - 1) as f32, (self.samples_z - 1) as f32);
        let u = ((x / self.size.x + 0.5) * cells.x).clamp(0.0, cells.x);
        let v = ((z / self.size.y + 0.5) * cells.y).clamp(0.0, cells.y);

        let ix = (u.floor() as usize).min(self.samples_x - 2);
        let iz = (v.floor() as usize).min(self.samples_z - 2);
        let (fu, fv) = (u - ix as f32, v - iz as f32);

        let h00 = self.sample(ix, iz);
        let h10 = self.sample(ix + 1, iz);
        let h01 = self.sample(ix, iz + 1);
        let h11 = self.sample(ix + 1, iz + 1);

        let near = h00 + (h10 - h00) * fu;
        let far = h01 + (h11 - h01) * fu;
        near + (far - near) * fv
    }
}
