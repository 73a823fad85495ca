//! 2D geometry helpers for the editor
//!
//! Vectors come from macroquad's math module (glam). Everything here is plain
//! value math: boxes, segment distance/projection, grid and angle snapping.

pub use macroquad::math::Vec2;
use std::f32::consts::PI;

/// Rotation snapping step for entity rotation (22.5 degrees)
pub const ROTATION_SNAP: f32 = PI / 8.0;

/// Axis-aligned bounding box (min/max corners, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build a box from two arbitrary corners (drag start / drag end)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Check if a point is inside the box (edges included)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Oriented bounding box: center, full dimensions and rotation in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub dimensions: Vec2,
    pub rotation: f32,
}

impl Obb {
    pub fn new(center: Vec2, width: f32, height: f32, rotation: f32) -> Self {
        Self {
            center,
            dimensions: Vec2::new(width, height),
            rotation,
        }
    }

    /// Check if a world point lies inside the rotated box
    pub fn contains(&self, p: Vec2) -> bool {
        // Rotate the point into box-local space
        let local = rotate(p - self.center, -self.rotation);
        let half = self.dimensions * 0.5;
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Corners in counter-clockwise order, starting bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let h = self.dimensions * 0.5;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|c| self.center + rotate(c, self.rotation))
    }
}

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Clamped scalar projection of `p` onto segment a→b.
/// Returns the closest point on the segment.
pub fn project_onto_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len = ab.length();
    if len <= f32::EPSILON {
        return a;
    }
    let dir = ab / len;
    let t = (p - a).dot(dir).clamp(0.0, len);
    a + dir * t
}

/// Minimum distance from a point to segment a→b
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    p.distance(project_onto_segment(p, a, b))
}

/// Outward perpendicular of the directed edge v0→v1.
///
/// Unflipped edges use `(dy, -dx)`, flipped edges the opposite direction.
/// Zero-length edges yield a zero vector.
pub fn edge_normal(v0: Vec2, v1: Vec2, flipped: bool) -> Vec2 {
    let s = if flipped { -1.0 } else { 1.0 };
    Vec2::new(s * (v1.y - v0.y), -s * (v1.x - v0.x)).normalize_or_zero()
}

/// Signed angle from `from` to `to` in radians, in (-PI, PI]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    let a = from.normalize_or_zero();
    let b = to.normalize_or_zero();
    a.perp_dot(b).atan2(a.dot(b))
}

/// Snap a position to the grid. `grid_scale` is cells per world unit; each axis
/// rounds half away from zero.
pub fn snap_to_grid(p: Vec2, grid_scale: f32) -> Vec2 {
    if grid_scale <= 0.0 {
        return p;
    }
    Vec2::new(
        (p.x * grid_scale).round() / grid_scale,
        (p.y * grid_scale).round() / grid_scale,
    )
}

/// Snap an angle offset down to a multiple of `step` (toward negative infinity)
pub fn snap_angle(angle: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return angle;
    }
    (angle / step).floor() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_aabb_from_corners() {
        let b = Aabb::from_corners(Vec2::new(2.0, -1.0), Vec2::new(-1.0, 3.0));
        assert_eq!(b.min, Vec2::new(-1.0, -1.0));
        assert_eq!(b.max, Vec2::new(2.0, 3.0));
        assert!(b.contains(Vec2::new(2.0, 3.0)));
        assert!(!b.contains(Vec2::new(2.1, 0.0)));
    }

    #[test]
    fn test_obb_contains_rotated() {
        let b = Obb::new(Vec2::ZERO, 4.0, 0.5, PI / 2.0);
        // Rotated 90 degrees: long axis is now vertical
        assert!(b.contains(Vec2::new(0.0, 1.9)));
        assert!(!b.contains(Vec2::new(1.9, 0.0)));
    }

    #[test]
    fn test_segment_projection_clamps() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(2.0, 0.0);
        assert_eq!(project_onto_segment(Vec2::new(1.0, 5.0), a, b), Vec2::new(1.0, 0.0));
        assert_eq!(project_onto_segment(Vec2::new(-3.0, 1.0), a, b), a);
        assert_eq!(project_onto_segment(Vec2::new(9.0, 1.0), a, b), b);
        assert!(approx(point_segment_distance(Vec2::new(1.0, 0.5), a, b), 0.5));
    }

    #[test]
    fn test_edge_normal_flip() {
        let n = edge_normal(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), false);
        assert!(approx(n.x, 0.0) && approx(n.y, -1.0));
        let f = edge_normal(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), true);
        assert!(approx(f.y, 1.0));
        assert_eq!(edge_normal(Vec2::ONE, Vec2::ONE, false), Vec2::ZERO);
    }

    #[test]
    fn test_grid_snap_rounds_half_away_from_zero() {
        assert_eq!(snap_to_grid(Vec2::new(0.5, -0.5), 1.0), Vec2::new(1.0, -1.0));
        assert_eq!(snap_to_grid(Vec2::new(0.26, -0.74), 2.0), Vec2::new(0.5, -0.5));
    }

    #[test]
    fn test_grid_snap_idempotent() {
        for scale in [0.25, 1.0, 2.0, 8.0] {
            let once = snap_to_grid(Vec2::new(3.37, -7.81), scale);
            assert_eq!(snap_to_grid(once, scale), once);
        }
    }

    #[test]
    fn test_angle_snap() {
        let snap = |deg: f32| snap_angle(deg.to_radians(), ROTATION_SNAP).to_degrees();
        assert!(approx(snap(10.0), 0.0));
        assert!(approx(snap(30.0), 22.5));
        assert!(approx(snap(-100.0), -112.5));
    }

    #[test]
    fn test_signed_angle() {
        let a = signed_angle(Vec2::new(1.0, 0.0), Vec2::new(0.0, 2.0));
        assert!(approx(a, PI / 2.0));
        let b = signed_angle(Vec2::new(1.0, 0.0), Vec2::new(0.0, -1.0));
        assert!(approx(b, -PI / 2.0));
    }
}
