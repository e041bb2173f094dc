//! Ray/plane intersection against the shared ground plane.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::error::CompositorError;

/// Threshold for parallel plane/ray detection.
const PLANE_EPSILON: f32 = 1e-5;

/// The plane every sprite is dragged along.
///
/// Defaults to the plane through the world origin whose normal is the viewing
/// depth axis (`+Z`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    /// Any point on the plane.
    pub origin: Vec3,
    /// Plane normal.
    pub normal: Dir3,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Dir3::Z,
        }
    }
}

impl GroundPlane {
    /// Creates a plane through `origin` with the given normal.
    pub fn new(origin: Vec3, normal: Dir3) -> Self {
        Self { origin, normal }
    }

    /// Intersect `ray` with this plane.
    pub fn intersect(&self, ray: &Ray3d) -> Result<Vec3, CompositorError> {
        ray_plane_intersection(ray, self.origin, *self.normal)
            .ok_or(CompositorError::NoIntersection)
    }

    /// Signed distance from `point` to the plane.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(*self.normal)
    }
}

/// Intersect a ray with a plane. Returns the intersection point, if any.
///
/// Rays parallel to the plane and intersections behind the ray origin yield
/// `None`.
pub fn ray_plane_intersection(ray: &Ray3d, plane_origin: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denom = plane_normal.dot(*ray.direction);
    if denom.abs() < PLANE_EPSILON {
        return None;
    }
    let t = (plane_origin - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        None
    } else {
        Some(ray.origin + *ray.direction * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, direction: Vec3) -> Ray3d {
        Ray3d {
            origin,
            direction: Dir3::new(direction).unwrap(),
        }
    }

    #[test]
    fn straight_down_hits_under_origin() {
        let plane = GroundPlane::default();
        let hit = plane
            .intersect(&ray(Vec3::new(0.3, -0.7, 1.0), Vec3::NEG_Z))
            .unwrap();
        assert!((hit - Vec3::new(0.3, -0.7, 0.0)).length() < 1e-6);
    }

    #[test]
    fn oblique_hit_lies_on_plane() {
        let plane = GroundPlane::new(Vec3::new(0.0, 0.0, 2.0), Dir3::Z);
        let hit = plane
            .intersect(&ray(Vec3::new(1.0, 2.0, 10.0), Vec3::new(0.3, -0.2, -1.0)))
            .unwrap();
        assert!(plane.signed_distance(hit).abs() < 1e-5);
    }

    #[test]
    fn parallel_ray_has_no_intersection() {
        let plane = GroundPlane::default();
        let result = plane.intersect(&ray(Vec3::new(0.0, 0.0, 1.0), Vec3::X));
        assert_eq!(result, Err(CompositorError::NoIntersection));
    }

    #[test]
    fn plane_behind_ray_has_no_intersection() {
        let plane = GroundPlane::default();
        let result = plane.intersect(&ray(Vec3::new(0.0, 0.0, 1.0), Vec3::Z));
        assert_eq!(result, Err(CompositorError::NoIntersection));
    }
}
