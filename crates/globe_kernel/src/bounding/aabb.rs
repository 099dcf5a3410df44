//! Axis-aligned bounding box

use crate::foundation::math::{Vec2, Vec3, Vec3Ext};
use crate::geometry::{GeometryError, Plane, Ray};
use crate::render::ScreenProjection;

use super::sphere::Sphere;
use super::wireframe::{box_corners, box_wireframe, WireframeCache, WireframeSink, WireframeStyle};

/// Per-axis tolerance for box point containment
pub const BOX_CONTAINS_MARGIN: f64 = 1e-3;

/// Axis-aligned box `[lower, upper]`
///
/// Invariant: `lower <= upper` on every axis.
#[derive(Debug, Clone)]
pub struct AxisAlignedBox {
    lower: Vec3,
    upper: Vec3,
    mesh: WireframeCache,
}

impl AxisAlignedBox {
    /// Create a box, rejecting non-finite or inverted bounds
    pub fn new(lower: Vec3, upper: Vec3) -> Result<Self, GeometryError> {
        validate_bounds(&lower, &upper)?;
        Ok(Self::from_ordered(lower, upper))
    }

    /// Smallest box enclosing all points
    pub fn enclosing(points: &[Vec3]) -> Result<Self, GeometryError> {
        let (first, rest) = points.split_first().ok_or_else(|| {
            GeometryError::InvalidArgument("cannot enclose an empty point set".to_string())
        })?;

        let (lower, upper) = rest.iter().fold((*first, *first), |(lower, upper), p| {
            (lower.component_min(p), upper.component_max(p))
        });
        Self::new(lower, upper)
    }

    /// Build from bounds already known to be ordered
    pub(crate) fn from_ordered(lower: Vec3, upper: Vec3) -> Self {
        debug_assert!(lower.x <= upper.x && lower.y <= upper.y && lower.z <= upper.z);
        Self { lower, upper, mesh: WireframeCache::default() }
    }

    /// Lower corner
    pub fn lower(&self) -> &Vec3 {
        &self.lower
    }

    /// Upper corner
    pub fn upper(&self) -> &Vec3 {
        &self.upper
    }

    /// Replace both bounds; drops the cached wireframe
    pub fn set_bounds(&mut self, lower: Vec3, upper: Vec3) -> Result<(), GeometryError> {
        validate_bounds(&lower, &upper)?;
        self.lower = lower;
        self.upper = upper;
        self.mesh.invalidate();
        Ok(())
    }

    /// Midpoint of the bounds
    pub fn center(&self) -> Vec3 {
        (self.lower + self.upper) * 0.5
    }

    /// Size along each axis
    pub fn extent(&self) -> Vec3 {
        self.upper - self.lower
    }

    /// The 8 corners
    pub fn corners(&self) -> [Vec3; 8] {
        box_corners(&self.lower, &self.upper)
    }

    /// Closest point of the box to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point.clamp_to(&self.lower, &self.upper)
    }

    /// Point containment, inclusive within [`BOX_CONTAINS_MARGIN`] per axis
    pub fn contains(&self, point: &Vec3) -> bool {
        contains_with_margin(&self.lower, &self.upper, point)
    }

    /// Overlap test against another box
    pub fn touches_box(&self, other: &Self) -> bool {
        // early exit on the first separating axis
        !(other.upper.x < self.lower.x
            || other.lower.x > self.upper.x
            || other.upper.y < self.lower.y
            || other.lower.y > self.upper.y
            || other.upper.z < self.lower.z
            || other.lower.z > self.upper.z)
    }

    /// Overlap test against a sphere through the closest point
    pub fn touches_sphere(&self, sphere: &Sphere) -> bool {
        let closest = self.closest_point(sphere.center());
        closest.squared_distance_to(sphere.center()) <= sphere.radius_squared()
    }

    /// Union of two boxes
    pub fn merged_with_box(&self, other: &Self) -> Self {
        Self::from_ordered(
            self.lower.component_min(&other.lower),
            self.upper.component_max(&other.upper),
        )
    }

    /// True when both extreme corners lie inside `other`
    pub fn fully_contained_in_box(&self, other: &Self) -> bool {
        other.contains(&self.lower) && other.contains(&self.upper)
    }

    /// True when every corner lies inside the sphere
    pub fn fully_contained_in_sphere(&self, sphere: &Sphere) -> bool {
        self.corners().iter().all(|corner| sphere.contains(corner))
    }

    /// First face hit, testing faces −X, +X, −Y, +Y, −Z, +Z in order
    pub fn intersection_with_ray(&self, ray: &Ray) -> Option<Vec3> {
        first_face_hit(&self.lower, &self.upper, ray)
    }

    /// Sphere through the upper corner, centered on the box
    pub fn create_sphere(&self) -> Sphere {
        let center = self.center();
        Sphere::from_valid(center, center.distance_to(&self.upper))
    }

    /// Screen-space rectangle covering the projected corners
    pub fn projected_extent<P: ScreenProjection + ?Sized>(&self, camera: &P) -> Vec2 {
        projected_rectangle(&self.corners(), camera)
    }

    /// Area of [`Self::projected_extent`]
    pub fn projected_area<P: ScreenProjection + ?Sized>(&self, camera: &P) -> f64 {
        let extent = self.projected_extent(camera);
        extent.x * extent.y
    }

    /// Draw the wireframe, building it on first use
    pub fn render(&self, sink: &mut dyn WireframeSink, style: &WireframeStyle) {
        self.mesh.render(sink, style, |style| box_wireframe(&self.corners(), style));
    }

    /// Drop the cached wireframe
    pub fn invalidate_mesh(&mut self) {
        self.mesh.invalidate();
    }

    /// True if a wireframe is cached
    pub fn has_cached_mesh(&self) -> bool {
        self.mesh.is_built()
    }
}

impl PartialEq for AxisAlignedBox {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

pub(crate) fn validate_bounds(lower: &Vec3, upper: &Vec3) -> Result<(), GeometryError> {
    let finite = lower.iter().chain(upper.iter()).all(|c| c.is_finite());
    if !finite {
        return Err(GeometryError::InvalidArgument(format!(
            "box bounds must be finite, got {:?} .. {:?}",
            lower, upper
        )));
    }
    if lower.x > upper.x || lower.y > upper.y || lower.z > upper.z {
        return Err(GeometryError::InvalidArgument(format!(
            "box lower bound {:?} exceeds upper bound {:?}",
            lower, upper
        )));
    }
    Ok(())
}

pub(crate) fn contains_with_margin(lower: &Vec3, upper: &Vec3, point: &Vec3) -> bool {
    point.x >= lower.x - BOX_CONTAINS_MARGIN
        && point.x <= upper.x + BOX_CONTAINS_MARGIN
        && point.y >= lower.y - BOX_CONTAINS_MARGIN
        && point.y <= upper.y + BOX_CONTAINS_MARGIN
        && point.z >= lower.z - BOX_CONTAINS_MARGIN
        && point.z <= upper.z + BOX_CONTAINS_MARGIN
}

/// Ray test against the six face planes of `[lower, upper]`
///
/// Not the nearest hit: the first face in −X, +X, −Y, +Y, −Z, +Z order whose
/// crossing lies on the box wins.
pub(crate) fn first_face_hit(lower: &Vec3, upper: &Vec3, ray: &Ray) -> Option<Vec3> {
    let faces = [
        Plane::new(Vec3::x(), -lower.x),
        Plane::new(Vec3::x(), -upper.x),
        Plane::new(Vec3::y(), -lower.y),
        Plane::new(Vec3::y(), -upper.y),
        Plane::new(Vec3::z(), -lower.z),
        Plane::new(Vec3::z(), -upper.z),
    ];

    faces
        .iter()
        .filter_map(|face| face.intersection_with_ray(ray))
        .find(|hit| contains_with_margin(lower, upper, hit))
}

/// Width and height of the pixel rectangle covering `points`
pub(crate) fn projected_rectangle<P: ScreenProjection + ?Sized>(points: &[Vec3], camera: &P) -> Vec2 {
    let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

    for point in points {
        let pixel = camera.point_to_pixel(point);
        min = min.inf(&pixel);
        max = max.sup(&pixel);
    }

    if points.is_empty() {
        return Vec2::zeros();
    }
    max - min
}
