//! Bounding sphere

use crate::foundation::math::{Vec2, Vec3, Vec3Ext};
use crate::geometry::{ray_sphere_roots, GeometryError, Ray};
use crate::render::ScreenProjection;

use super::aabb::AxisAlignedBox;
use super::wireframe::{sphere_wireframe, WireframeCache, WireframeSink, WireframeStyle};

/// Sphere with a cached squared radius
///
/// Invariant: `radius >= 0` and `radius_squared == radius * radius`.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    radius_squared: f64,
    mesh: WireframeCache,
}

impl Sphere {
    /// Create a sphere, rejecting a negative or non-finite radius
    pub fn new(center: Vec3, radius: f64) -> Result<Self, GeometryError> {
        validate_center(&center)?;
        validate_radius(radius)?;
        Ok(Self::from_valid(center, radius))
    }

    pub(crate) fn from_valid(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            radius_squared: radius * radius,
            mesh: WireframeCache::default(),
        }
    }

    /// Center point
    pub fn center(&self) -> &Vec3 {
        &self.center
    }

    /// Radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Squared radius
    pub fn radius_squared(&self) -> f64 {
        self.radius_squared
    }

    /// Move the sphere; drops the cached wireframe
    pub fn set_center(&mut self, center: Vec3) -> Result<(), GeometryError> {
        validate_center(&center)?;
        self.center = center;
        self.mesh.invalidate();
        Ok(())
    }

    /// Resize the sphere; drops the cached wireframe
    pub fn set_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        validate_radius(radius)?;
        self.radius = radius;
        self.radius_squared = radius * radius;
        self.mesh.invalidate();
        Ok(())
    }

    /// Exact, inclusive point containment
    pub fn contains(&self, point: &Vec3) -> bool {
        self.center.squared_distance_to(point) <= self.radius_squared
    }

    /// Overlap test against another sphere
    pub fn touches_sphere(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.center.squared_distance_to(&other.center) <= reach * reach
    }

    /// Overlap test against a box
    pub fn touches_box(&self, aabb: &AxisAlignedBox) -> bool {
        aabb.touches_sphere(self)
    }

    /// Smallest sphere enclosing both
    ///
    /// A sphere already containing the other is returned unchanged.
    pub fn merged_with_sphere(&self, other: &Self) -> Self {
        let d = self.center.distance_to(&other.center);

        if d + other.radius <= self.radius {
            return self.clone();
        }
        if d + self.radius <= other.radius {
            return other.clone();
        }

        // d > |r1 - r2| >= 0 here, so the direction is well defined
        let radius = (d + self.radius + other.radius) * 0.5;
        let direction = (other.center - self.center) / d;
        let center = self.center + direction * (radius - self.radius);

        Self::from_valid(center, radius)
    }

    /// Sphere inside sphere: `d + r <= R`
    pub fn fully_contained_in_sphere(&self, other: &Self) -> bool {
        self.center.distance_to(&other.center) + self.radius <= other.radius
    }

    /// Sphere inside box: `center ± radius` within the bounds on every axis
    pub fn fully_contained_in_box(&self, aabb: &AxisAlignedBox) -> bool {
        let (lower, upper) = (aabb.lower(), aabb.upper());
        let c = &self.center;
        let r = self.radius;

        c.x - r >= lower.x
            && c.x + r <= upper.x
            && c.y - r >= lower.y
            && c.y + r <= upper.y
            && c.z - r >= lower.z
            && c.z + r <= upper.z
    }

    /// Box spanned by the six axis extremes
    pub fn bounding_box(&self) -> AxisAlignedBox {
        let reach = Vec3::repeat(self.radius);
        AxisAlignedBox::from_ordered(self.center - reach, self.center + reach)
    }

    /// Surface point of the nearest crossing in front of the ray origin
    ///
    /// Roots behind the origin (`t < 0`) are never returned, even when they
    /// are the smallest: from inside the sphere the hit is the exit point,
    /// and a sphere wholly behind the origin is a miss.
    pub fn intersection_with_ray(&self, ray: &Ray) -> Option<Vec3> {
        let local_origin = ray.origin - self.center;
        // ray direction and radius are validated on construction
        let roots = ray_sphere_roots(&local_origin, &ray.direction, self.radius).ok()?;
        let t = roots.nearest_forward()?;

        log::trace!("Ray hit sphere at t = {}", t);
        Some(ray.point_at(t))
    }

    /// Screen area from the camera's sphere approximation
    pub fn projected_area<P: ScreenProjection + ?Sized>(&self, camera: &P) -> f64 {
        camera.projected_sphere_area(&self.center, self.radius)
    }

    /// Square whose side is the diameter of the projected disc
    pub fn projected_extent<P: ScreenProjection + ?Sized>(&self, camera: &P) -> Vec2 {
        let area = self.projected_area(camera);
        let side = 2.0 * (area / std::f64::consts::PI).sqrt();
        Vec2::new(side, side)
    }

    /// Draw the wireframe, building it on first use
    pub fn render(&self, sink: &mut dyn WireframeSink, style: &WireframeStyle) {
        self.mesh.render(sink, style, |style| sphere_wireframe(&self.center, self.radius, style));
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

impl PartialEq for Sphere {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.radius == other.radius
    }
}

fn validate_center(center: &Vec3) -> Result<(), GeometryError> {
    if center.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::InvalidArgument(format!(
            "sphere center must be finite, got {:?}",
            center
        )))
    }
}

fn validate_radius(radius: f64) -> Result<(), GeometryError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidArgument(format!(
            "sphere radius must be finite and non-negative, got {}",
            radius
        )))
    }
}
