use bevy::prelude::*;
use crate::game::bounds::WorldBox;

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// View frustum rebuilt every frame from the camera matrices.
///
/// Planes are stored as `Vec4(normal, d)` with normals pointing inward, so
/// `plane.dot(p.extend(1.0)) >= 0` on the visible side.
///
/// # Example
///
/// ```rust
/// use bevy::math::{Mat4, Vec3};
/// use gdt_framework::game::frustum::Frustum;
///
/// let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
/// let projection = Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 100.0);
/// let frustum = Frustum::from_matrices(view, projection);
///
/// assert!(frustum.is_point_within(Vec3::ZERO));
/// assert!(!frustum.is_point_within(Vec3::new(0.0, 0.0, 10.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
    points: [Vec3; 8],
    view_projection: Mat4,
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_matrices(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl Frustum {
    pub fn from_matrices(view: Mat4, projection: Mat4) -> Self {
        let mut frustum = Self {
            planes: [Vec4::ZERO; 6],
            points: [Vec3::ZERO; 8],
            view_projection: Mat4::IDENTITY,
        };
        frustum.update(view, projection);
        frustum
    }

    /// Recompute planes and corner points in place.
    pub fn update(&mut self, view: Mat4, projection: Mat4) {
        let m = projection * view;
        self.view_projection = m;

        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        self.planes[LEFT] = r3 + r0;
        self.planes[RIGHT] = r3 - r0;
        self.planes[BOTTOM] = r3 + r1;
        self.planes[TOP] = r3 - r1;
        self.planes[NEAR] = r3 + r2;
        self.planes[FAR] = r3 - r2;

        let p = &self.planes;
        self.points = [
            intersection(p[LEFT], p[BOTTOM], p[NEAR]),
            intersection(p[LEFT], p[TOP], p[NEAR]),
            intersection(p[RIGHT], p[BOTTOM], p[NEAR]),
            intersection(p[RIGHT], p[TOP], p[NEAR]),
            intersection(p[LEFT], p[BOTTOM], p[FAR]),
            intersection(p[LEFT], p[TOP], p[FAR]),
            intersection(p[RIGHT], p[BOTTOM], p[FAR]),
            intersection(p[RIGHT], p[TOP], p[FAR]),
        ];
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Corners in the order LBN, LTN, RBN, RTN, LBF, LTF, RBF, RTF.
    pub fn points(&self) -> &[Vec3; 8] {
        &self.points
    }

    /// Conservative box test.
    ///
    /// Rejects boxes entirely behind one plane, then rejects boxes that the
    /// whole frustum lies outside of on one axis. The second pass catches
    /// large boxes near frustum corners that the plane pass lets through.
    pub fn is_box_visible(&self, bounds: &WorldBox) -> bool {
        let corners = bounds.corners();
        for plane in &self.planes {
            if corners.iter().all(|c| plane.dot(c.extend(1.0)) < 0.0) {
                return false;
            }
        }

        let (min, max) = (bounds.min, bounds.max);
        for axis in 0..3 {
            if self.points.iter().all(|p| p[axis] > max[axis]) {
                return false;
            }
            if self.points.iter().all(|p| p[axis] < min[axis]) {
                return false;
            }
        }

        true
    }

    /// Whether a point projects inside the screen rectangle.
    ///
    /// Only `w > 0` and normalized x/y are checked. Depth is not clipped,
    /// so points past the far plane still pass.
    pub fn is_point_within(&self, point: Vec3) -> bool {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.truncate() / clip.w;
        (-1.0..=1.0).contains(&ndc.x) && (-1.0..=1.0).contains(&ndc.y)
    }
}

/// Point shared by three planes.
fn intersection(a: Vec4, b: Vec4, c: Vec4) -> Vec3 {
    let (na, nb, nc) = (a.truncate(), b.truncate(), c.truncate());
    let bc = nb.cross(nc);
    let d = na.dot(bc);
    let cols = Mat3::from_cols(bc, -na.cross(nc), na.cross(nb));
    cols * Vec3::new(a.w, b.w, c.w) * (-1.0 / d)
}
