//! Geometric primitives shared by the bounding volumes
//!
//! - [`Plane`] - normal + offset, signed distance and ray hits
//! - [`Ray`] - validated origin/direction pair
//! - [`Frustum`] - six named culling planes
//! - [`ray_sphere_roots`] - closed-form ray/sphere quadratic solver

mod plane;
mod ray;
mod frustum;

pub use plane::Plane;
pub use ray::{Ray, RayRoots, ray_sphere_roots};
pub use frustum::{Frustum, FrustumPlanes};

use crate::bounding::VolumeKind;
use thiserror::Error;

/// Errors raised by geometric queries on invalid input
///
/// "No geometric result" (a ray that misses, an empty intersection) is never
/// an error; it is reported as `None` by the query itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Ray direction has zero length or non-finite components
    #[error("Degenerate ray: direction must be finite and non-zero")]
    DegenerateRay,

    /// Oriented box transform has no inverse
    #[error("Oriented box transform is not invertible")]
    NonInvertibleTransform,

    /// A constructor or solver argument violates its invariant
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The pairwise operation is not defined for these volume kinds
    #[error("Unsupported combination: {operation} between {left:?} and {right:?}")]
    UnsupportedCombination {
        /// Operation name
        operation: &'static str,
        /// Kind of the receiver
        left: VolumeKind,
        /// Kind of the argument
        right: VolumeKind,
    },
}
