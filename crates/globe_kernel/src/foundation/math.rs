//! Math utilities and types
//!
//! Globe-scale geometry needs double precision, so every kernel type is
//! built on `f64`. GPU-facing data is narrowed to `f32` only when a mesh is
//! handed to the renderer.

pub use nalgebra::{Vector2, Vector3, Vector4, Matrix4};

/// 2D vector type (screen space, pixels)
pub type Vec2 = Vector2<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 4D vector type
pub type Vec4 = Vector4<f64>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f64>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f64>;

/// RGBA color used by debug drawing
pub type Color = Vector4<f32>;

/// Extension trait for `Vec3` with the operations the kernel relies on
/// beyond what nalgebra provides directly.
pub trait Vec3Ext {
    /// Vector with every component set to NaN
    fn nan() -> Self;

    /// True if any component is NaN
    fn has_nan(&self) -> bool;

    /// Distance between two points
    fn distance_to(&self, other: &Self) -> f64;

    /// Squared distance between two points
    fn squared_distance_to(&self, other: &Self) -> f64;

    /// Componentwise clamp into `[lower, upper]`
    fn clamp_to(&self, lower: &Self, upper: &Self) -> Self;

    /// Componentwise minimum
    fn component_min(&self, other: &Self) -> Self;

    /// Componentwise maximum
    fn component_max(&self, other: &Self) -> Self;
}

impl Vec3Ext for Vec3 {
    fn nan() -> Self {
        Vec3::new(f64::NAN, f64::NAN, f64::NAN)
    }

    fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    fn distance_to(&self, other: &Self) -> f64 {
        (self - other).magnitude()
    }

    fn squared_distance_to(&self, other: &Self) -> f64 {
        (self - other).magnitude_squared()
    }

    fn clamp_to(&self, lower: &Self, upper: &Self) -> Self {
        Vec3::new(
            self.x.max(lower.x).min(upper.x),
            self.y.max(lower.y).min(upper.y),
            self.z.max(lower.z).min(upper.z),
        )
    }

    fn component_min(&self, other: &Self) -> Self {
        self.zip_map(other, f64::min)
    }

    fn component_max(&self, other: &Self) -> Self {
        self.zip_map(other, f64::max)
    }
}

/// Apply an affine 4x4 transform to a point (w = 1)
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Apply the linear part of a 4x4 transform to a direction (w = 0)
pub fn transform_vector(matrix: &Mat4, vector: &Vec3) -> Vec3 {
    matrix.transform_vector(vector)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f64 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * constants::DEG_TO_RAD
    }
}
