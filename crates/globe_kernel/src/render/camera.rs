//! # Camera and screen projection
//!
//! The bounding volumes only need a narrow view of the camera: where a
//! world point lands on screen, and how large a sphere appears. That view is
//! the [`ScreenProjection`] trait; [`Camera`] is the stock perspective
//! implementation.
//!
//! ## Conventions
//! - Right-handed world and view space, the camera looks down view-space −Z
//! - OpenGL clip space (`-w <= z <= w`), matching [`Frustum::from_view_projection`]
//! - Pixel origin in the top-left corner, +Y down

use crate::foundation::math::{Mat4, Point3, Vec2, Vec3, Vec3Ext, Vec4, utils};
use crate::geometry::{Frustum, GeometryError, Ray};

/// Screen-space queries the bounding volumes rely on
pub trait ScreenProjection {
    /// Viewport width in pixels
    fn viewport_width(&self) -> u32;

    /// Viewport height in pixels
    fn viewport_height(&self) -> u32;

    /// Project a world point to pixel coordinates
    ///
    /// Points behind the eye produce mirrored coordinates; callers that
    /// need exactness must cull first.
    fn point_to_pixel(&self, point: &Vec3) -> Vec2;

    /// Approximate on-screen area of a sphere, in square pixels
    fn projected_sphere_area(&self, center: &Vec3, radius: f64) -> f64;
}

/// Perspective look-at camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Vec3,

    /// Point the camera is looking at
    pub target: Vec3,

    /// Up vector for orientation
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f64,

    /// Distance to the near clipping plane
    pub near: f64,

    /// Distance to the far clipping plane
    pub far: f64,

    viewport_width: u32,
    viewport_height: u32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `viewport` - Viewport size in pixels `(width, height)`
    /// * `near` - Near plane distance (must be > 0)
    /// * `far` - Far plane distance (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f64, viewport: (u32, u32), near: f64, far: f64) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            near,
            far,
            viewport_width: viewport.0.max(1),
            viewport_height: viewport.1.max(1),
        }
    }

    /// Move the eye
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Point the camera at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Resize the viewport
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) != (self.viewport_width, self.viewport_height) {
            log::debug!(
                "Camera viewport changed: {}x{} -> {}x{}",
                self.viewport_width, self.viewport_height, width, height
            );
        }
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Width over height
    pub fn aspect(&self) -> f64 {
        f64::from(self.viewport_width) / f64::from(self.viewport_height)
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect(), self.fov, self.near, self.far)
    }

    /// Combined world-to-clip matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Culling frustum for the current view
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    /// Picking ray through a pixel
    ///
    /// Unprojects the pixel at the near and far planes; the ray starts at
    /// the eye and points through the pixel into the scene.
    pub fn pixel_to_ray(&self, pixel: &Vec2) -> Result<Ray, GeometryError> {
        let inverse = self
            .view_projection_matrix()
            .try_inverse()
            .ok_or(GeometryError::NonInvertibleTransform)?;

        let ndc_x = pixel.x / f64::from(self.viewport_width) * 2.0 - 1.0;
        let ndc_y = 1.0 - pixel.y / f64::from(self.viewport_height) * 2.0;

        let unproject = |z: f64| {
            let h = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        };

        let direction = unproject(1.0) - unproject(-1.0);
        Ray::new(self.position, direction)
    }
}

impl ScreenProjection for Camera {
    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn point_to_pixel(&self, point: &Vec3) -> Vec2 {
        let clip = self.view_projection_matrix() * point.push(1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;

        Vec2::new(
            (ndc_x + 1.0) * 0.5 * f64::from(self.viewport_width),
            (1.0 - ndc_y) * 0.5 * f64::from(self.viewport_height),
        )
    }

    fn projected_sphere_area(&self, center: &Vec3, radius: f64) -> f64 {
        // eye distance, not view depth; clamped so a sphere at the eye stays finite
        let z = center.distance_to(&self.position).max(self.near);
        let screen_radius =
            radius * f64::from(self.viewport_height) / (2.0 * z * (self.fov * 0.5).tan());
        std::f64::consts::PI * screen_radius * screen_radius
    }
}

impl Default for Camera {
    /// 60° camera ten units up +Z looking at the origin, 1280x720
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, (1280, 720), 0.1, 1000.0)
    }
}
