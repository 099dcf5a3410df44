//! Rays and the closed-form ray/sphere solver

use crate::foundation::math::Vec3;
use super::GeometryError;

/// A ray for picking and intersection queries
///
/// The direction is kept exactly as given (not normalized), so the `t`
/// parameters returned by the solvers are in units of `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, rejecting zero-length or non-finite directions
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Self, GeometryError> {
        validate_direction(&direction)?;
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::InvalidArgument(format!(
                "ray origin must be finite, got {:?}",
                origin
            )));
        }
        Ok(Self { origin, direction })
    }

    /// Get the point along the ray at parameter t
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

fn validate_direction(direction: &Vec3) -> Result<(), GeometryError> {
    let a = direction.magnitude_squared();
    if a == 0.0 || !a.is_finite() {
        return Err(GeometryError::DegenerateRay);
    }
    Ok(())
}

/// Parameters where a ray crosses a sphere surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayRoots {
    /// The ray misses the sphere
    None,
    /// The ray grazes the sphere at one point
    Tangent(f64),
    /// The ray enters and leaves the sphere; ascending order
    Secant(f64, f64),
}

impl RayRoots {
    /// Roots as an ascending vector
    pub fn to_vec(self) -> Vec<f64> {
        match self {
            Self::None => Vec::new(),
            Self::Tangent(t) => vec![t],
            Self::Secant(t0, t1) => vec![t0, t1],
        }
    }

    /// Number of roots
    pub fn len(self) -> usize {
        match self {
            Self::None => 0,
            Self::Tangent(_) => 1,
            Self::Secant(..) => 2,
        }
    }

    /// True when the ray misses
    pub fn is_empty(self) -> bool {
        matches!(self, Self::None)
    }

    /// Smallest root, even when it lies behind the origin
    pub fn first(self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Tangent(t) | Self::Secant(t, _) => Some(t),
        }
    }

    /// Smallest root with `t >= 0`, i.e. the first crossing in front of the origin
    pub fn nearest_forward(self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Tangent(t) => (t >= 0.0).then_some(t),
            Self::Secant(t0, t1) => {
                if t0 >= 0.0 {
                    Some(t0)
                } else if t1 >= 0.0 {
                    Some(t1)
                } else {
                    None
                }
            }
        }
    }
}

/// Solve the ray/sphere quadratic for a sphere centered at the origin
///
/// `origin` and `direction` must already be in sphere-local space. With
/// `a = |d|²`, `b = 2(o·d)`, `c = |o|² - r²` the discriminant `b² - 4ac`
/// selects zero, one (tangent) or two roots.
pub fn ray_sphere_roots(origin: &Vec3, direction: &Vec3, radius: f64) -> Result<RayRoots, GeometryError> {
    validate_direction(direction)?;
    if !(radius >= 0.0) {
        return Err(GeometryError::InvalidArgument(format!(
            "sphere radius must be non-negative, got {}",
            radius
        )));
    }

    let a = direction.magnitude_squared();
    let b = 2.0 * origin.dot(direction);
    let c = origin.magnitude_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Ok(RayRoots::None);
    }
    if discriminant == 0.0 {
        return Ok(RayRoots::Tangent(-b / (2.0 * a)));
    }

    let root_discriminant = discriminant.sqrt();
    let root1 = (-b + root_discriminant) / (2.0 * a);
    let root2 = (-b - root_discriminant) / (2.0 * a);

    if root1 < root2 {
        Ok(RayRoots::Secant(root1, root2))
    } else {
        Ok(RayRoots::Secant(root2, root1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_roots_ascending() {
        let origin = Vec3::new(-3.0, 0.0, 0.0);
        let direction = Vec3::new(1.0, 0.0, 0.0);
        let roots = ray_sphere_roots(&origin, &direction, 1.0).unwrap();

        let values = roots.to_vec();
        assert_eq!(values.len(), 2);
        assert_relative_eq!(values[0], 2.0);
        assert_relative_eq!(values[1], 4.0);

        for t in values {
            let hit = origin + direction * t;
            assert_relative_eq!(hit.magnitude(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_miss() {
        let roots = ray_sphere_roots(&Vec3::new(-3.0, 5.0, 0.0), &Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        assert!(roots.is_empty());
        assert_eq!(roots.len(), 0);
        assert!(roots.nearest_forward().is_none());
    }

    #[test]
    fn test_tangent() {
        let roots = ray_sphere_roots(&Vec3::new(-3.0, 1.0, 0.0), &Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(roots, RayRoots::Tangent(3.0));
    }

    #[test]
    fn test_unnormalized_direction_scales_roots() {
        let roots = ray_sphere_roots(&Vec3::new(-3.0, 0.0, 0.0), &Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots.first().unwrap(), 1.0);
    }

    #[test]
    fn test_origin_inside_picks_forward_root() {
        let roots = ray_sphere_roots(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 1.0), 2.0).unwrap();
        assert_relative_eq!(roots.first().unwrap(), -2.0);
        assert_relative_eq!(roots.nearest_forward().unwrap(), 2.0);
    }

    #[test]
    fn test_zero_direction_is_degenerate() {
        let result = ray_sphere_roots(&Vec3::zeros(), &Vec3::zeros(), 1.0);
        assert_eq!(result, Err(GeometryError::DegenerateRay));
        assert_eq!(Ray::new(Vec3::zeros(), Vec3::zeros()), Err(GeometryError::DegenerateRay));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let result = ray_sphere_roots(&Vec3::zeros(), &Vec3::new(1.0, 0.0, 0.0), -1.0);
        assert!(matches!(result, Err(GeometryError::InvalidArgument(_))));
    }
}
