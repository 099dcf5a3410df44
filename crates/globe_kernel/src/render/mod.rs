//! Rendering collaborators of the kernel
//!
//! - [`ScreenProjection`] / [`Camera`] - world-to-pixel queries for
//!   projected area and extent
//! - [`FrameContext`] - per-frame depth ordering of transparent items

mod camera;
mod ordered;

pub use camera::{Camera, ScreenProjection};
pub use ordered::{FrameContext, FrameError, FramePhase, MeshKey, OrderedRenderable};
