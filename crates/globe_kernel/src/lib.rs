//! # Globe Kernel
//!
//! Bounding-volume geometry for a 3D globe/terrain renderer.
//!
//! ## Features
//!
//! - **Bounding volumes**: axis-aligned boxes, spheres and oriented boxes
//!   behind one closed [`BoundingVolume`](bounding::BoundingVolume) enum
//! - **Pairwise queries**: touch, merge and containment for every kind pair
//! - **Picking**: ray intersection, including the closed-form ray/sphere solver
//! - **Culling**: frustum visibility from a view-projection matrix
//! - **Screen coverage**: projected area and extent through a camera
//! - **Transparency**: per-frame back-to-front ordering of draw items
//! - **Debug drawing**: cached wireframes handed to a line sink
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use globe_kernel::prelude::*;
//!
//! fn main() -> Result<(), GeometryError> {
//!     let camera = Camera::default();
//!     let frustum = camera.frustum();
//!
//!     let tile: BoundingVolume = AxisAlignedBox::new(
//!         Vec3::new(-1.0, -1.0, -1.0),
//!         Vec3::new(1.0, 1.0, 1.0),
//!     )?
//!     .into();
//!
//!     if tile.touches_frustum(&frustum) {
//!         println!("tile covers {:.0} px", tile.projected_area(&camera));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod geometry;
pub mod bounding;
pub mod render;

/// Common imports for kernel users
pub mod prelude {
    pub use crate::{
        bounding::{
            AxisAlignedBox, BoundingVolume, CrossKindPolicy, OrientedBox, Sphere, VolumeKind,
            WireframeMesh, WireframeSink, WireframeStyle,
        },
        config::{Config, ConfigError, KernelConfig},
        foundation::math::{Mat4, Vec2, Vec3, Vec3Ext},
        geometry::{Frustum, FrustumPlanes, GeometryError, Plane, Ray, RayRoots},
        render::{Camera, FrameContext, FrameError, MeshKey, OrderedRenderable, ScreenProjection},
    };
}
