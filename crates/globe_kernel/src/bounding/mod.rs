//! # Bounding volumes
//!
//! Three volume kinds behind one closed enum:
//!
//! - [`AxisAlignedBox`] - `[lower, upper]` with a containment tolerance
//! - [`Sphere`] - exact center/radius tests
//! - [`OrientedBox`] - a local box placed by an invertible transform
//!
//! Kinds are ordered `Box < Sphere < OrientedBox`. Symmetric pairwise
//! operations (`touches`, `merged_with`) handle each unordered pair once and
//! route the reversed call by swapping arguments; `fully_contained_in` is
//! directional and handles all nine ordered pairs.
//!
//! A few pairs have no exact answer in this kernel. How they are answered is
//! chosen by [`CrossKindPolicy`].

mod aabb;
mod sphere;
mod oriented_box;
pub mod wireframe;

#[cfg(test)]
mod tests;

pub use aabb::{AxisAlignedBox, BOX_CONTAINS_MARGIN};
pub use sphere::Sphere;
pub use oriented_box::OrientedBox;
pub use wireframe::{WireframeMesh, WireframeSink, WireframeStyle};

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Vec2, Vec3};
use crate::geometry::{Frustum, GeometryError, Ray};
use crate::render::ScreenProjection;

/// Volume kind, in canonical dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VolumeKind {
    /// Axis-aligned box
    Box,
    /// Sphere
    Sphere,
    /// Oriented box
    OrientedBox,
}

/// How pairs without an exact answer are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CrossKindPolicy {
    /// Answer with a covering approximation
    ///
    /// Touch tests may report a touch that is not there but never miss one;
    /// merges return a volume covering both inputs; containment answers
    /// `true` only when it certainly holds.
    #[default]
    Conservative,
    /// Fail with [`GeometryError::UnsupportedCombination`]
    Strict,
}

impl CrossKindPolicy {
    fn permit(self, operation: &'static str, left: VolumeKind, right: VolumeKind) -> Result<(), GeometryError> {
        match self {
            Self::Conservative => {
                log::trace!("Approximating {} between {:?} and {:?}", operation, left, right);
                Ok(())
            }
            Self::Strict => Err(GeometryError::UnsupportedCombination { operation, left, right }),
        }
    }
}

/// A bounding volume of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    /// Axis-aligned box
    Box(AxisAlignedBox),
    /// Sphere
    Sphere(Sphere),
    /// Oriented box
    OrientedBox(OrientedBox),
}

impl BoundingVolume {
    /// Kind of this volume
    pub fn kind(&self) -> VolumeKind {
        match self {
            Self::Box(_) => VolumeKind::Box,
            Self::Sphere(_) => VolumeKind::Sphere,
            Self::OrientedBox(_) => VolumeKind::OrientedBox,
        }
    }

    /// World-space center
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Box(aabb) => aabb.center(),
            Self::Sphere(sphere) => *sphere.center(),
            Self::OrientedBox(obb) => obb.center(),
        }
    }

    /// Point containment
    ///
    /// Boxes allow [`BOX_CONTAINS_MARGIN`] per axis; spheres are exact.
    pub fn contains(&self, point: &Vec3) -> bool {
        match self {
            Self::Box(aabb) => aabb.contains(point),
            Self::Sphere(sphere) => sphere.contains(point),
            Self::OrientedBox(obb) => obb.contains(point),
        }
    }

    /// Enclosing sphere
    pub fn create_sphere(&self) -> Sphere {
        match self {
            Self::Box(aabb) => aabb.create_sphere(),
            Self::Sphere(sphere) => Sphere::from_valid(*sphere.center(), sphere.radius()),
            Self::OrientedBox(obb) => obb.create_sphere(),
        }
    }

    /// Surface point hit by the ray, if any
    pub fn intersection_with_ray(&self, ray: &Ray) -> Option<Vec3> {
        match self {
            Self::Box(aabb) => aabb.intersection_with_ray(ray),
            Self::Sphere(sphere) => sphere.intersection_with_ray(ray),
            Self::OrientedBox(obb) => obb.intersection_with_ray(ray),
        }
    }

    /// Approximate visibility against a view frustum
    ///
    /// Tests the volume's enclosing sphere, so a volume near a frustum edge
    /// may pass while actually outside.
    pub fn touches_frustum(&self, frustum: &Frustum) -> bool {
        match self {
            Self::Sphere(sphere) => frustum.touches_sphere(sphere.center(), sphere.radius()),
            _ => {
                let sphere = self.create_sphere();
                frustum.touches_sphere(sphere.center(), sphere.radius())
            }
        }
    }

    /// Approximate on-screen area in square pixels
    pub fn projected_area<P: ScreenProjection + ?Sized>(&self, camera: &P) -> f64 {
        match self {
            Self::Box(aabb) => aabb.projected_area(camera),
            Self::Sphere(sphere) => sphere.projected_area(camera),
            Self::OrientedBox(obb) => obb.projected_area(camera),
        }
    }

    /// Approximate on-screen width and height in pixels
    pub fn projected_extent<P: ScreenProjection + ?Sized>(&self, camera: &P) -> Vec2 {
        match self {
            Self::Box(aabb) => aabb.projected_extent(camera),
            Self::Sphere(sphere) => sphere.projected_extent(camera),
            Self::OrientedBox(obb) => obb.projected_extent(camera),
        }
    }

    /// Draw the debug wireframe, building it on first use
    pub fn render(&self, sink: &mut dyn WireframeSink, style: &WireframeStyle) {
        match self {
            Self::Box(aabb) => aabb.render(sink, style),
            Self::Sphere(sphere) => sphere.render(sink, style),
            Self::OrientedBox(obb) => obb.render(sink, style),
        }
    }

    /// Drop the cached wireframe so the next `render` rebuilds it
    pub fn invalidate_mesh(&mut self) {
        match self {
            Self::Box(aabb) => aabb.invalidate_mesh(),
            Self::Sphere(sphere) => sphere.invalidate_mesh(),
            Self::OrientedBox(obb) => obb.invalidate_mesh(),
        }
    }

    /// True if a wireframe is cached
    pub fn has_cached_mesh(&self) -> bool {
        match self {
            Self::Box(aabb) => aabb.has_cached_mesh(),
            Self::Sphere(sphere) => sphere.has_cached_mesh(),
            Self::OrientedBox(obb) => obb.has_cached_mesh(),
        }
    }

    /// Overlap test under the default [`CrossKindPolicy`]
    pub fn touches(&self, other: &Self) -> Result<bool, GeometryError> {
        self.touches_with_policy(other, CrossKindPolicy::default())
    }

    /// Overlap test
    ///
    /// Exact for every pair except sphere/oriented box, which is tested
    /// against the oriented box's world bounds.
    pub fn touches_with_policy(&self, other: &Self, policy: CrossKindPolicy) -> Result<bool, GeometryError> {
        use BoundingVolume::{Box, OrientedBox, Sphere};

        match (self, other) {
            (Box(a), Box(b)) => Ok(a.touches_box(b)),
            (Box(aabb), Sphere(sphere)) | (Sphere(sphere), Box(aabb)) => Ok(aabb.touches_sphere(sphere)),
            (Box(aabb), OrientedBox(obb)) | (OrientedBox(obb), Box(aabb)) => Ok(obb.touches_box(aabb)),
            (Sphere(a), Sphere(b)) => Ok(a.touches_sphere(b)),
            (Sphere(sphere), OrientedBox(obb)) | (OrientedBox(obb), Sphere(sphere)) => {
                policy.permit("touches", self.kind(), other.kind())?;
                Ok(sphere.touches_box(&obb.world_bounds()))
            }
            (OrientedBox(a), OrientedBox(b)) => Ok(a.touches_oriented_box(b)),
        }
    }

    /// Merge under the default [`CrossKindPolicy`]
    pub fn merged_with(&self, other: &Self) -> Result<Self, GeometryError> {
        self.merged_with_policy(other, CrossKindPolicy::default())
    }

    /// Volume covering both inputs
    ///
    /// - box + box: componentwise union
    /// - sphere + sphere: the container if one holds the other, otherwise
    ///   the smallest enclosing sphere
    /// - sphere + box: the sphere if it holds the box, otherwise the box
    ///   covering both
    /// - oriented box + oriented box with identical transforms: union of
    ///   local bounds
    /// - any other pair with an oriented box: approximated (see
    ///   [`CrossKindPolicy`])
    pub fn merged_with_policy(&self, other: &Self, policy: CrossKindPolicy) -> Result<Self, GeometryError> {
        use BoundingVolume::{Box, OrientedBox, Sphere};

        let merged = match (self, other) {
            (Box(a), Box(b)) => Box(a.merged_with_box(b)),
            (Box(aabb), Sphere(sphere)) | (Sphere(sphere), Box(aabb)) => {
                if aabb.fully_contained_in_sphere(sphere) {
                    Sphere(sphere.clone())
                } else {
                    Box(sphere.bounding_box().merged_with_box(aabb))
                }
            }
            (Box(aabb), OrientedBox(obb)) | (OrientedBox(obb), Box(aabb)) => {
                policy.permit("merged_with", self.kind(), other.kind())?;
                if obb.fully_contained_in_box(aabb) {
                    Box(aabb.clone())
                } else if obb.encloses_box(aabb) {
                    OrientedBox(obb.clone())
                } else {
                    Box(aabb.merged_with_box(&obb.world_bounds()))
                }
            }
            (Sphere(a), Sphere(b)) => Sphere(a.merged_with_sphere(b)),
            (Sphere(sphere), OrientedBox(obb)) | (OrientedBox(obb), Sphere(sphere)) => {
                policy.permit("merged_with", self.kind(), other.kind())?;
                if obb.fully_contained_in_sphere(sphere) {
                    Sphere(sphere.clone())
                } else {
                    Box(sphere.bounding_box().merged_with_box(&obb.world_bounds()))
                }
            }
            (OrientedBox(a), OrientedBox(b)) => match a.merged_local(b) {
                Some(merged) => OrientedBox(merged),
                None => {
                    policy.permit("merged_with", self.kind(), other.kind())?;
                    Box(a.world_bounds().merged_with_box(&b.world_bounds()))
                }
            },
        };

        log::trace!("Merged {:?} with {:?} into {:?}", self.kind(), other.kind(), merged.kind());
        Ok(merged)
    }

    /// Containment under the default [`CrossKindPolicy`]
    pub fn fully_contained_in(&self, other: &Self) -> Result<bool, GeometryError> {
        self.fully_contained_in_with_policy(other, CrossKindPolicy::default())
    }

    /// True when `self` lies entirely inside `other`
    ///
    /// Tested in `other`'s frame. A sphere inside an oriented box is
    /// approximated by the corners of the sphere's bounding box, which is
    /// sufficient but not necessary.
    pub fn fully_contained_in_with_policy(&self, other: &Self, policy: CrossKindPolicy) -> Result<bool, GeometryError> {
        use BoundingVolume::{Box, OrientedBox, Sphere};

        let contained = match (self, other) {
            (Box(inner), Box(outer)) => inner.fully_contained_in_box(outer),
            (Box(inner), Sphere(outer)) => inner.fully_contained_in_sphere(outer),
            (Box(inner), OrientedBox(outer)) => outer.encloses_box(inner),
            (Sphere(inner), Box(outer)) => inner.fully_contained_in_box(outer),
            (Sphere(inner), Sphere(outer)) => inner.fully_contained_in_sphere(outer),
            (Sphere(inner), OrientedBox(outer)) => {
                policy.permit("fully_contained_in", self.kind(), other.kind())?;
                outer.encloses_box(&inner.bounding_box())
            }
            (OrientedBox(inner), Box(outer)) => inner.fully_contained_in_box(outer),
            (OrientedBox(inner), Sphere(outer)) => inner.fully_contained_in_sphere(outer),
            (OrientedBox(inner), OrientedBox(outer)) => inner.fully_contained_in_oriented_box(outer),
        };

        Ok(contained)
    }
}

impl From<AxisAlignedBox> for BoundingVolume {
    fn from(aabb: AxisAlignedBox) -> Self {
        Self::Box(aabb)
    }
}

impl From<Sphere> for BoundingVolume {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<OrientedBox> for BoundingVolume {
    fn from(obb: OrientedBox) -> Self {
        Self::OrientedBox(obb)
    }
}
