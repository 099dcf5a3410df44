//! View frustum for visibility culling

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec3};
use super::Plane;

bitflags! {
    /// Set of named frustum planes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrustumPlanes: u8 {
        /// Left clipping plane
        const LEFT = 1 << 0;
        /// Right clipping plane
        const RIGHT = 1 << 1;
        /// Top clipping plane
        const TOP = 1 << 2;
        /// Bottom clipping plane
        const BOTTOM = 1 << 3;
        /// Near clipping plane
        const NEAR = 1 << 4;
        /// Far clipping plane
        const FAR = 1 << 5;
    }
}

/// Frustum bounded by six named planes
///
/// Every normal points OUT of the frustum: a positive signed distance means
/// the point lies outside that plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Left plane
    pub left: Plane,
    /// Right plane
    pub right: Plane,
    /// Top plane
    pub top: Plane,
    /// Bottom plane
    pub bottom: Plane,
    /// Near plane
    pub near: Plane,
    /// Far plane
    pub far: Plane,
}

impl Frustum {
    /// Create a frustum from six outward-facing planes
    pub fn new(left: Plane, right: Plane, top: Plane, bottom: Plane, near: Plane, far: Plane) -> Self {
        Self { left, right, top, bottom, near, far }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for OpenGL clip space (`-w <= x, y, z <= w`).
    /// The extracted planes face inward and are flipped to face outward.
    pub fn from_view_projection(matrix: &Mat4) -> Self {
        let row = |i: usize| matrix.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let outward = |v: nalgebra::Vector4<f64>| {
            Plane::from_coefficients(v.x, v.y, v.z, v.w).flipped()
        };

        Self {
            left: outward(r3 + r0),
            right: outward(r3 - r0),
            bottom: outward(r3 + r1),
            top: outward(r3 - r1),
            near: outward(r3 + r2),
            far: outward(r3 - r2),
        }
    }

    /// Planes in culling order: near, far, left, right, top, bottom
    pub fn planes(&self) -> [(FrustumPlanes, &Plane); 6] {
        [
            (FrustumPlanes::NEAR, &self.near),
            (FrustumPlanes::FAR, &self.far),
            (FrustumPlanes::LEFT, &self.left),
            (FrustumPlanes::RIGHT, &self.right),
            (FrustumPlanes::TOP, &self.top),
            (FrustumPlanes::BOTTOM, &self.bottom),
        ]
    }

    /// Approximate sphere test
    ///
    /// Culls only when the sphere lies farther than `radius` outside a
    /// single plane. Spheres near frustum corners can pass while outside.
    pub fn touches_sphere(&self, center: &Vec3, radius: f64) -> bool {
        for (_, plane) in self.planes() {
            if plane.signed_distance(center) > radius {
                return false;
            }
        }
        true
    }

    /// Every plane that culls the sphere, for debug overlays
    pub fn rejecting_planes(&self, center: &Vec3, radius: f64) -> FrustumPlanes {
        self.planes()
            .into_iter()
            .filter(|(_, plane)| plane.signed_distance(center) > radius)
            .fold(FrustumPlanes::empty(), |acc, (flag, _)| acc | flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Axis-aligned box frustum `[-1, 1]^3`, normals facing out
    fn unit_cube_frustum() -> Frustum {
        Frustum::new(
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), -1.0),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), -1.0),
            Plane::new(Vec3::new(0.0, 1.0, 0.0), -1.0),
            Plane::new(Vec3::new(0.0, -1.0, 0.0), -1.0),
            Plane::new(Vec3::new(0.0, 0.0, -1.0), -1.0),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), -1.0),
        )
    }

    #[test]
    fn test_sphere_inside_all_planes_visible() {
        let frustum = unit_cube_frustum();
        assert!(frustum.touches_sphere(&Vec3::zeros(), 0.5));
        assert!(frustum.rejecting_planes(&Vec3::zeros(), 0.5).is_empty());
    }

    #[test]
    fn test_sphere_outside_one_plane_culled() {
        let frustum = unit_cube_frustum();
        let center = Vec3::new(3.0, 0.0, 0.0);
        assert!(!frustum.touches_sphere(&center, 1.5));
        assert_eq!(frustum.rejecting_planes(&center, 1.5), FrustumPlanes::RIGHT);
    }

    #[test]
    fn test_sphere_straddling_plane_visible() {
        let frustum = unit_cube_frustum();
        // distance to the right plane is exactly the radius
        assert!(frustum.touches_sphere(&Vec3::new(3.0, 0.0, 0.0), 2.0));
    }

    #[test]
    fn test_from_identity_matrix_is_clip_cube() {
        let frustum = Frustum::from_view_projection(&Mat4::identity());
        assert_eq!(frustum, unit_cube_frustum());
        assert_relative_eq!(frustum.far.signed_distance(&Vec3::new(0.0, 0.0, 3.0)), 2.0);
    }
}
