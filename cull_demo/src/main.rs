//! Culling demo
//!
//! Scatters tile volumes over a globe, orbits a camera around it and runs
//! the per-frame kernel pipeline: frustum culling, screen coverage,
//! back-to-front ordering, wireframe drawing and a picking ray.
//!
//! Usage: `cull_demo [config.toml|config.ron]`

use globe_kernel::foundation::logging;
use globe_kernel::foundation::math::constants::PI;
use globe_kernel::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;

const GLOBE_RADIUS: f64 = 100.0;
const TILE_COUNT: usize = 400;
const FRAME_COUNT: usize = 4;
// close enough that the globe overflows the view
const CAMERA_DISTANCE: f64 = 1.5 * GLOBE_RADIUS;

/// A tile: its bounds plus the renderer mesh it stands for
struct Tile {
    mesh: MeshKey,
    bounds: BoundingVolume,
}

/// Sink that only counts what it is asked to draw
#[derive(Default)]
struct LineCounter {
    meshes: usize,
    lines: usize,
    bytes: usize,
}

impl WireframeSink for LineCounter {
    fn draw_lines(&mut self, mesh: &WireframeMesh) {
        self.meshes += 1;
        self.lines += mesh.line_count();
        self.bytes += mesh.vertex_bytes().len() + mesh.index_bytes().len();
    }
}

fn load_config() -> Result<KernelConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => KernelConfig::load_validated(&path),
        None => Ok(KernelConfig::default()),
    }
}

/// Point on the globe surface at the given latitude/longitude (radians)
fn surface_point(latitude: f64, longitude: f64) -> Vec3 {
    Vec3::new(
        latitude.cos() * longitude.cos(),
        latitude.sin(),
        latitude.cos() * longitude.sin(),
    ) * GLOBE_RADIUS
}

fn scatter_tiles(meshes: &mut SlotMap<MeshKey, String>, rng: &mut StdRng) -> Result<Vec<Tile>, GeometryError> {
    let mut tiles = Vec::with_capacity(TILE_COUNT);

    for i in 0..TILE_COUNT {
        let latitude = rng.gen_range(-PI / 2.0..PI / 2.0);
        let longitude = rng.gen_range(-PI..PI);
        let center = surface_point(latitude, longitude);
        let size = rng.gen_range(1.0..6.0);

        let bounds: BoundingVolume = match i % 3 {
            0 => AxisAlignedBox::new(center - Vec3::repeat(size), center + Vec3::repeat(size))?.into(),
            1 => Sphere::new(center, size)?.into(),
            _ => {
                let transform = Mat4::new_translation(&center)
                    * Mat4::new_rotation(Vec3::new(0.0, longitude, latitude));
                let half = Vec3::new(size, size * 0.25, size);
                OrientedBox::new(-half, half, transform)?.into()
            }
        };

        let mesh = meshes.insert(format!("tile-{}", i));
        tiles.push(Tile { mesh, bounds });
    }

    Ok(tiles)
}

fn run_frame(
    frame: usize,
    camera: &Camera,
    tiles: &[Tile],
    context: &mut FrameContext,
    config: &KernelConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    context.begin_frame();
    let frustum = camera.frustum();
    let mut sink = LineCounter::default();
    let mut culled = 0usize;
    let mut coverage = 0.0;
    let mut visible_union: Option<BoundingVolume> = None;

    for tile in tiles {
        if !tile.bounds.touches_frustum(&frustum) {
            culled += 1;
            continue;
        }

        coverage += tile.bounds.projected_area(camera);
        tile.bounds.render(&mut sink, &config.wireframe);

        let distance = (tile.bounds.center() - camera.position).magnitude();
        context.add_ordered_renderable(OrderedRenderable::new(tile.mesh, distance))?;

        visible_union = Some(match visible_union {
            Some(union) => match union.merged_with_policy(&tile.bounds, config.cross_kind_policy) {
                Ok(merged) => merged,
                Err(err) => {
                    log::warn!("  tile left out of the visible union: {}", err);
                    union
                }
            },
            None => tile.bounds.clone(),
        });
    }

    let sorted = context.sorted_ordered_renderables()?;
    log::info!(
        "Frame {}: {} visible, {} culled, {:.0} px² covered",
        frame,
        sorted.len(),
        culled,
        coverage
    );
    if let (Some(farthest), Some(nearest)) = (sorted.first(), sorted.last()) {
        log::info!(
            "  draw order: farthest {:.1}, nearest {:.1}",
            farthest.distance_from_eye,
            nearest.distance_from_eye
        );
    }
    log::debug!(
        "  wireframes: {} meshes, {} lines, {} bytes",
        sink.meshes,
        sink.lines,
        sink.bytes
    );
    if let Some(union) = visible_union {
        log::debug!("  visible union: {:?} around {:?}", union.kind(), union.center());
    }

    // pick through the pixel under the nearest visible tile
    let nearest = sorted
        .last()
        .and_then(|renderable| tiles.iter().find(|tile| tile.mesh == renderable.mesh));
    if let Some(target) = nearest {
        let pixel = camera.point_to_pixel(&target.bounds.center());
        let ray = camera.pixel_to_ray(&pixel)?;
        let picked = tiles
            .iter()
            .filter_map(|tile| tile.bounds.intersection_with_ray(&ray).map(|hit| (tile, hit)))
            .min_by(|(_, a), (_, b)| {
                let da = (a - ray.origin).magnitude_squared();
                let db = (b - ray.origin).magnitude_squared();
                da.total_cmp(&db)
            });
        match picked {
            Some((tile, hit)) => log::info!(
                "  picked {:?} tile at pixel ({:.0}, {:.0}), hit {:?}",
                tile.bounds.kind(),
                pixel.x,
                pixel.y,
                hit
            ),
            None => log::info!("  nothing under pixel ({:.0}, {:.0})", pixel.x, pixel.y),
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting globe culling demo");
    log::debug!("Configuration: {:?}", config);

    let mut rng = StdRng::seed_from_u64(2024);
    let mut meshes = SlotMap::with_key();
    let tiles = scatter_tiles(&mut meshes, &mut rng)?;
    log::info!("Scattered {} tiles over a globe of radius {}", tiles.len(), GLOBE_RADIUS);

    let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, CAMERA_DISTANCE), 30.0, (1280, 720), 1.0, 1000.0);
    let mut context = FrameContext::from_config(&config);

    for frame in 0..FRAME_COUNT {
        let angle = frame as f64 * PI / 2.0;
        camera.set_position(Vec3::new(angle.sin(), 0.2, angle.cos()).normalize() * CAMERA_DISTANCE);
        camera.look_at(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        run_frame(frame, &camera, &tiles, &mut context, &config)?;
    }

    log::info!("Globe culling demo finished after {} frames", context.frame_number());
    Ok(())
}
