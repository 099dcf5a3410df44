//! Infinite planes in Hessian normal form

use crate::foundation::math::Vec3;
use super::Ray;

/// Below this `|n·d|` a ray is treated as parallel to the plane
const PARALLEL_EPSILON: f64 = 1e-12;

/// Plane defined by a normal and an offset
///
/// Points `p` on the plane satisfy `normal·p + offset = 0`. The signed
/// distance is positive on the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (unit length when built through [`Plane::new`])
    pub normal: Vec3,
    /// Offset along the normal
    pub offset: f64,
}

impl Plane {
    /// Create a plane from a normal and offset
    ///
    /// The normal is normalized and the offset scaled to match, so signed
    /// distances are Euclidean.
    pub fn new(normal: Vec3, offset: f64) -> Self {
        let length = normal.magnitude();
        if length > 0.0 {
            Self { normal: normal / length, offset: offset / length }
        } else {
            Self { normal, offset }
        }
    }

    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self { normal, offset: -normal.dot(&point) }
    }

    /// Plane from the `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::new(Vec3::new(a, b, c), d)
    }

    /// Signed distance from the plane to a point
    pub fn signed_distance(&self, point: &Vec3) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Plane with the normal flipped; inside and outside swap
    pub fn flipped(&self) -> Self {
        Self { normal: -self.normal, offset: -self.offset }
    }

    /// Point where the ray crosses the plane
    ///
    /// Returns `None` when the ray is parallel to the plane or the crossing
    /// lies behind the ray origin.
    pub fn intersection_with_ray(&self, ray: &Ray) -> Option<Vec3> {
        let direction_dot_normal = self.normal.dot(&ray.direction);
        if direction_dot_normal.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -self.signed_distance(&ray.origin) / direction_dot_normal;
        if t < 0.0 {
            return None;
        }

        Some(ray.point_at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signed_distance() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), -4.0);
        assert_relative_eq!(plane.signed_distance(&Vec3::new(0.0, 5.0, 0.0)), 3.0);
        assert_relative_eq!(plane.signed_distance(&Vec3::new(7.0, 0.0, 1.0)), -2.0);
    }

    #[test]
    fn test_from_point_normal() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(plane.signed_distance(&Vec3::new(1.0, 1.0, 3.0)), 0.0);
        assert_relative_eq!(plane.flipped().signed_distance(&Vec3::new(0.0, 0.0, 5.0)), -2.0);
    }

    #[test]
    fn test_ray_hit() {
        let plane = Plane::new(Vec3::new(1.0, 0.0, 0.0), -2.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let hit = plane.intersection_with_ray(&ray).unwrap();
        assert_relative_eq!(hit, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_ray_parallel_or_behind() {
        let plane = Plane::new(Vec3::new(1.0, 0.0, 0.0), -2.0);
        let parallel = Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let away = Ray::new(Vec3::zeros(), Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!(plane.intersection_with_ray(&parallel).is_none());
        assert!(plane.intersection_with_ray(&away).is_none());
    }
}
