//! Oriented bounding box
//!
//! A local-space box carried into the world by an invertible transform.
//! The inverse is computed once whenever the transform changes, so point
//! and ray queries only pay for a matrix-vector product.

use crate::foundation::math::{transform_point, transform_vector, Mat4, Vec2, Vec3, Vec3Ext};
use crate::geometry::{GeometryError, Ray};
use crate::render::ScreenProjection;

use super::aabb::{contains_with_margin, first_face_hit, projected_rectangle, validate_bounds, AxisAlignedBox};
use super::sphere::Sphere;
use super::wireframe::{box_corners, box_wireframe, WireframeCache, WireframeSink, WireframeStyle};

/// Box `[local_lower, local_upper]` placed by `world_transform`
#[derive(Debug, Clone)]
pub struct OrientedBox {
    local_lower: Vec3,
    local_upper: Vec3,
    world_transform: Mat4,
    inverse_transform: Mat4,
    mesh: WireframeCache,
}

impl OrientedBox {
    /// Create an oriented box
    ///
    /// Fails with [`GeometryError::NonInvertibleTransform`] when the
    /// transform has no inverse.
    pub fn new(local_lower: Vec3, local_upper: Vec3, world_transform: Mat4) -> Result<Self, GeometryError> {
        validate_bounds(&local_lower, &local_upper)?;
        let inverse_transform = invert(&world_transform)?;

        Ok(Self {
            local_lower,
            local_upper,
            world_transform,
            inverse_transform,
            mesh: WireframeCache::default(),
        })
    }

    /// Place an axis-aligned box with a transform
    pub fn from_box(local: &AxisAlignedBox, world_transform: Mat4) -> Result<Self, GeometryError> {
        Self::new(*local.lower(), *local.upper(), world_transform)
    }

    /// Lower corner in local space
    pub fn local_lower(&self) -> &Vec3 {
        &self.local_lower
    }

    /// Upper corner in local space
    pub fn local_upper(&self) -> &Vec3 {
        &self.local_upper
    }

    /// Local-to-world transform
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// World-to-local transform
    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse_transform
    }

    /// Replace the transform; drops the cached wireframe
    ///
    /// On failure the box keeps its previous transform.
    pub fn set_transform(&mut self, world_transform: Mat4) -> Result<(), GeometryError> {
        self.inverse_transform = invert(&world_transform)?;
        self.world_transform = world_transform;
        self.mesh.invalidate();
        Ok(())
    }

    /// Replace the local bounds; drops the cached wireframe
    pub fn set_local_bounds(&mut self, lower: Vec3, upper: Vec3) -> Result<(), GeometryError> {
        validate_bounds(&lower, &upper)?;
        self.local_lower = lower;
        self.local_upper = upper;
        self.mesh.invalidate();
        Ok(())
    }

    /// Map a world point into local space
    pub fn to_local(&self, point: &Vec3) -> Vec3 {
        transform_point(&self.inverse_transform, point)
    }

    /// Map a local point into world space
    pub fn to_world(&self, point: &Vec3) -> Vec3 {
        transform_point(&self.world_transform, point)
    }

    /// World-space center
    pub fn center(&self) -> Vec3 {
        self.to_world(&((self.local_lower + self.local_upper) * 0.5))
    }

    /// The 8 corners in world space
    pub fn world_corners(&self) -> [Vec3; 8] {
        box_corners(&self.local_lower, &self.local_upper).map(|corner| self.to_world(&corner))
    }

    /// Axis-aligned box enclosing the world corners
    pub fn world_bounds(&self) -> AxisAlignedBox {
        let corners = self.world_corners();
        let (lower, upper) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(lower, upper), corner| {
                (lower.component_min(corner), upper.component_max(corner))
            });
        AxisAlignedBox::from_ordered(lower, upper)
    }

    /// Point containment in local space, with the box tolerance
    pub fn contains(&self, point: &Vec3) -> bool {
        contains_with_margin(&self.local_lower, &self.local_upper, &self.to_local(point))
    }

    /// True when all 8 box corners lie inside this oriented box
    pub fn encloses_box(&self, aabb: &AxisAlignedBox) -> bool {
        aabb.corners().iter().all(|corner| self.contains(corner))
    }

    /// Ray hit computed in local space and mapped back to world space
    pub fn intersection_with_ray(&self, ray: &Ray) -> Option<Vec3> {
        let origin = self.to_local(&ray.origin);
        let direction = transform_vector(&self.inverse_transform, &ray.direction);
        // an invertible map keeps the direction non-zero unless it underflows
        let local_ray = Ray::new(origin, direction).ok()?;

        first_face_hit(&self.local_lower, &self.local_upper, &local_ray)
            .map(|hit| self.to_world(&hit))
    }

    /// Sphere around the world center reaching the farthest corner
    pub fn create_sphere(&self) -> Sphere {
        let center = self.center();
        let radius = self
            .world_corners()
            .iter()
            .map(|corner| corner.distance_to(&center))
            .fold(0.0, f64::max);
        Sphere::from_valid(center, radius)
    }

    /// Exact overlap test against an axis-aligned box
    pub fn touches_box(&self, aabb: &AxisAlignedBox) -> bool {
        parallelepipeds_overlap(
            &self.world_corners(),
            &self.world_axes(),
            &aabb.corners(),
            &[Vec3::x(), Vec3::y(), Vec3::z()],
        )
    }

    /// Exact overlap test against another oriented box
    pub fn touches_oriented_box(&self, other: &Self) -> bool {
        parallelepipeds_overlap(
            &self.world_corners(),
            &self.world_axes(),
            &other.world_corners(),
            &other.world_axes(),
        )
    }

    /// True when every world corner lies inside the box
    pub fn fully_contained_in_box(&self, aabb: &AxisAlignedBox) -> bool {
        self.world_corners().iter().all(|corner| aabb.contains(corner))
    }

    /// True when every world corner lies inside the sphere
    pub fn fully_contained_in_sphere(&self, sphere: &Sphere) -> bool {
        self.world_corners().iter().all(|corner| sphere.contains(corner))
    }

    /// True when every world corner lies inside `other`'s local bounds
    pub fn fully_contained_in_oriented_box(&self, other: &Self) -> bool {
        self.world_corners().iter().all(|corner| other.contains(corner))
    }

    /// Union of local bounds, defined only for identical transforms
    pub fn merged_local(&self, other: &Self) -> Option<Self> {
        if self.world_transform != other.world_transform {
            return None;
        }

        Some(Self {
            local_lower: self.local_lower.component_min(&other.local_lower),
            local_upper: self.local_upper.component_max(&other.local_upper),
            world_transform: self.world_transform,
            inverse_transform: self.inverse_transform,
            mesh: WireframeCache::default(),
        })
    }

    /// Screen-space rectangle covering the projected world corners
    pub fn projected_extent<P: ScreenProjection + ?Sized>(&self, camera: &P) -> Vec2 {
        projected_rectangle(&self.world_corners(), camera)
    }

    /// Area of [`Self::projected_extent`]
    pub fn projected_area<P: ScreenProjection + ?Sized>(&self, camera: &P) -> f64 {
        let extent = self.projected_extent(camera);
        extent.x * extent.y
    }

    /// Draw the world-space wireframe, building it on first use
    pub fn render(&self, sink: &mut dyn WireframeSink, style: &WireframeStyle) {
        self.mesh.render(sink, style, |style| box_wireframe(&self.world_corners(), style));
    }

    /// Drop the cached wireframe
    pub fn invalidate_mesh(&mut self) {
        self.mesh.invalidate();
    }

    /// True if a wireframe is cached
    pub fn has_cached_mesh(&self) -> bool {
        self.mesh.is_built()
    }

    /// Local X, Y and Z axes carried into world space
    fn world_axes(&self) -> [Vec3; 3] {
        [Vec3::x(), Vec3::y(), Vec3::z()].map(|axis| transform_vector(&self.world_transform, &axis))
    }
}

impl PartialEq for OrientedBox {
    fn eq(&self, other: &Self) -> bool {
        self.local_lower == other.local_lower
            && self.local_upper == other.local_upper
            && self.world_transform == other.world_transform
    }
}

fn invert(transform: &Mat4) -> Result<Mat4, GeometryError> {
    if !transform.iter().all(|c| c.is_finite()) {
        return Err(GeometryError::NonInvertibleTransform);
    }
    transform.try_inverse().ok_or(GeometryError::NonInvertibleTransform)
}

/// Separating axis test between two parallelepipeds
///
/// Tests 15 potential separating axes:
/// - 3 face normals per solid
/// - 9 edge-edge cross products
///
/// Solids whose faces merely touch overlap.
fn parallelepipeds_overlap(
    corners_a: &[Vec3; 8],
    edges_a: &[Vec3; 3],
    corners_b: &[Vec3; 8],
    edges_b: &[Vec3; 3],
) -> bool {
    const EPSILON: f64 = 1e-12;

    fn project(corners: &[Vec3; 8], axis: &Vec3) -> (f64, f64) {
        corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), corner| {
            let p = axis.dot(corner);
            (min.min(p), max.max(p))
        })
    }

    // false if `axis = u × v` separates the solids; near-parallel
    // operands give no axis, judged relative to their own lengths
    let test_axis = |u: &Vec3, v: &Vec3| {
        let axis = u.cross(v);
        let axis_len_sq = axis.magnitude_squared();
        if axis_len_sq <= EPSILON * u.magnitude_squared() * v.magnitude_squared() {
            return true;
        }

        let axis = axis / axis_len_sq.sqrt();
        let (min_a, max_a) = project(corners_a, &axis);
        let (min_b, max_b) = project(corners_b, &axis);
        max_a >= min_b && max_b >= min_a
    };

    let faces_pass = |edges: &[Vec3; 3]| (0..3).all(|i| test_axis(&edges[i], &edges[(i + 1) % 3]));
    if !faces_pass(edges_a) || !faces_pass(edges_b) {
        return false;
    }

    edges_a
        .iter()
        .all(|edge_a| edges_b.iter().all(|edge_b| test_axis(edge_a, edge_b)))
}
