//! Debug wireframe meshes for bounding volumes
//!
//! Volumes build their wireframe lazily on the first `render` call and keep
//! it until one of their defining fields changes, the style changes, or the
//! owner calls `invalidate_mesh`. Drawing is delegated to a
//! [`WireframeSink`], the renderer's line-drawing collaborator.

use std::cell::RefCell;

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Color, Vec3};

/// Largest sphere resolution whose vertex count still fits `u16` indices
pub const MAX_SPHERE_RESOLUTION: u16 = 128;

/// Smallest sphere resolution that still produces a closed grid
pub const MIN_SPHERE_RESOLUTION: u16 = 3;

/// Appearance of debug wireframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireframeStyle {
    /// Line color (RGBA)
    pub color: Color,
    /// Line width in pixels
    pub line_width: f32,
    /// Vertices per meridian for sphere wireframes
    pub sphere_resolution: u16,
}

impl WireframeStyle {
    /// Style with the given color and default width/resolution
    pub fn with_color(color: Color) -> Self {
        Self { color, ..Self::default() }
    }
}

impl Default for WireframeStyle {
    fn default() -> Self {
        Self {
            color: Color::new(1.0, 1.0, 0.0, 1.0),
            line_width: 1.0,
            sphere_resolution: 16,
        }
    }
}

/// Line-list mesh ready for upload
///
/// Vertices are stored as `f32` offsets from `center` so that globe-scale
/// coordinates keep their precision on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeMesh {
    center: Vec3,
    vertices: Vec<[f32; 3]>,
    indices: Vec<u16>,
    style: WireframeStyle,
}

impl WireframeMesh {
    /// Build a mesh from world-space vertices; the first vertex becomes the center
    pub fn from_world_vertices(world: &[Vec3], indices: Vec<u16>, style: WireframeStyle) -> Self {
        let center = world.first().copied().unwrap_or_else(Vec3::zeros);
        let vertices = world
            .iter()
            .map(|v| {
                let local = v - center;
                [local.x as f32, local.y as f32, local.z as f32]
            })
            .collect();

        Self { center, vertices, indices, style }
    }

    /// World-space origin the vertices are relative to
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Center-relative vertex positions
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Line-list indices (two per segment)
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Style the mesh was built with
    pub fn style(&self) -> &WireframeStyle {
        &self.style
    }

    /// Number of line segments
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Vertex data as raw bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Renderer-side collaborator that draws line meshes
pub trait WireframeSink {
    /// Draw a line-list mesh
    fn draw_lines(&mut self, mesh: &WireframeMesh);
}

/// Lazily built mesh owned by a single volume
///
/// Uses `RefCell`, so the owning volume is `!Sync`: the cache is only ever
/// touched from the render thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct WireframeCache {
    mesh: RefCell<Option<WireframeMesh>>,
}

impl WireframeCache {
    /// Draw the cached mesh, building it first if missing or stale
    pub(crate) fn render(
        &self,
        sink: &mut dyn WireframeSink,
        style: &WireframeStyle,
        build: impl FnOnce(&WireframeStyle) -> WireframeMesh,
    ) {
        {
            let mut slot = self.mesh.borrow_mut();
            let stale = slot.as_ref().map_or(true, |mesh| mesh.style != *style);
            if stale {
                let mesh = build(style);
                log::trace!(
                    "Built wireframe mesh: {} vertices, {} lines",
                    mesh.vertices.len(),
                    mesh.line_count()
                );
                *slot = Some(mesh);
            }
        }

        if let Some(mesh) = self.mesh.borrow().as_ref() {
            sink.draw_lines(mesh);
        }
    }

    /// Drop the cached mesh
    pub(crate) fn invalidate(&mut self) {
        *self.mesh.get_mut() = None;
    }

    /// True if a mesh is cached
    pub(crate) fn is_built(&self) -> bool {
        self.mesh.borrow().is_some()
    }
}

/// Line indices for the 12 edges of a box whose corners follow
/// [`box_corners`] ordering
const BOX_EDGES: [u16; 24] = [
    0, 1, 1, 3, 3, 2, 2, 0, // x = lower
    4, 5, 5, 7, 7, 6, 6, 4, // x = upper
    0, 4, 1, 5, 2, 6, 3, 7, // edges along x
];

/// The 8 corners of `[lower, upper]`
///
/// Bit 0 of the index selects upper z, bit 1 upper y, bit 2 upper x.
pub fn box_corners(lower: &Vec3, upper: &Vec3) -> [Vec3; 8] {
    [
        *lower,
        Vec3::new(lower.x, lower.y, upper.z),
        Vec3::new(lower.x, upper.y, lower.z),
        Vec3::new(lower.x, upper.y, upper.z),
        Vec3::new(upper.x, lower.y, lower.z),
        Vec3::new(upper.x, lower.y, upper.z),
        Vec3::new(upper.x, upper.y, lower.z),
        *upper,
    ]
}

/// Wireframe for a box given its 8 (possibly transformed) corners
pub(crate) fn box_wireframe(corners: &[Vec3; 8], style: &WireframeStyle) -> WireframeMesh {
    WireframeMesh::from_world_vertices(corners, BOX_EDGES.to_vec(), style.clone())
}

/// Latitude/longitude wireframe for a sphere
///
/// `2·res − 2` meridians, each with `res` vertices from pole to pole;
/// parallels connect the interior rows and wrap around.
pub(crate) fn sphere_wireframe(center: &Vec3, radius: f64, style: &WireframeStyle) -> WireframeMesh {
    use crate::foundation::math::constants::PI;

    let resolution = style
        .sphere_resolution
        .clamp(MIN_SPHERE_RESOLUTION, MAX_SPHERE_RESOLUTION);
    let res = usize::from(resolution);
    let meridians = 2 * res - 2;
    let delta = PI / f64::from(resolution - 1);

    let mut vertices = Vec::with_capacity(meridians * res);
    for i in 0..meridians {
        let longitude = -PI + i as f64 * delta;
        for j in 0..res {
            let latitude = -PI / 2.0 + j as f64 * delta;
            let h = latitude.cos();
            let unit = Vec3::new(h * longitude.cos(), h * longitude.sin(), latitude.sin());
            vertices.push(unit * radius + center);
        }
    }

    // indices fit u16 because res <= MAX_SPHERE_RESOLUTION
    let index = |i: usize, j: usize| (j + i * res) as u16;
    let mut indices = Vec::new();

    for i in 0..meridians {
        for j in 0..res - 1 {
            indices.push(index(i, j));
            indices.push(index(i, j + 1));
        }
    }

    for j in 1..res - 1 {
        for i in 0..meridians - 1 {
            indices.push(index(i, j));
            indices.push(index(i + 1, j));
        }
        indices.push(index(meridians - 1, j));
        indices.push(index(0, j));
    }

    WireframeMesh::from_world_vertices(&vertices, indices, style.clone())
}
