use super::*;
use crate::foundation::math::constants::PI;
use crate::foundation::math::Mat4;
use crate::geometry::Plane;
use crate::render::Camera;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vec(rng: &mut StdRng, range: f64) -> Vec3 {
    Vec3::new(
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
    )
}

fn random_box(rng: &mut StdRng) -> AxisAlignedBox {
    let lower = random_vec(rng, 10.0);
    let size = Vec3::new(rng.gen_range(0.1..5.0), rng.gen_range(0.1..5.0), rng.gen_range(0.1..5.0));
    AxisAlignedBox::new(lower, lower + size).unwrap()
}

fn random_sphere(rng: &mut StdRng) -> Sphere {
    Sphere::new(random_vec(rng, 10.0), rng.gen_range(0.1..5.0)).unwrap()
}

fn random_oriented_box(rng: &mut StdRng) -> OrientedBox {
    let half = Vec3::new(rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0));
    let transform = Mat4::new_translation(&random_vec(rng, 10.0)) * Mat4::new_rotation(random_vec(rng, PI));
    OrientedBox::new(-half, half, transform).unwrap()
}

fn random_volume(rng: &mut StdRng, kind: VolumeKind) -> BoundingVolume {
    match kind {
        VolumeKind::Box => random_box(rng).into(),
        VolumeKind::Sphere => random_sphere(rng).into(),
        VolumeKind::OrientedBox => random_oriented_box(rng).into(),
    }
}

/// Point strictly inside the volume
fn sample_inside(rng: &mut StdRng, volume: &BoundingVolume) -> Vec3 {
    let in_bounds = |rng: &mut StdRng, lower: &Vec3, upper: &Vec3| {
        Vec3::new(
            rng.gen_range(lower.x..=upper.x),
            rng.gen_range(lower.y..=upper.y),
            rng.gen_range(lower.z..=upper.z),
        )
    };

    match volume {
        BoundingVolume::Box(aabb) => in_bounds(rng, aabb.lower(), aabb.upper()),
        BoundingVolume::Sphere(sphere) => {
            let direction = loop {
                let v = random_vec(rng, 1.0);
                if v.magnitude_squared() > 1e-6 {
                    break v.normalize();
                }
            };
            sphere.center() + direction * sphere.radius() * rng.gen_range(0.0..0.999)
        }
        BoundingVolume::OrientedBox(obb) => {
            let local = in_bounds(rng, obb.local_lower(), obb.local_upper());
            obb.to_world(&local)
        }
    }
}

const KINDS: [VolumeKind; 3] = [VolumeKind::Box, VolumeKind::Sphere, VolumeKind::OrientedBox];

/// Cube `[-1, 1]^3` turned 45° about Z
fn diamond() -> OrientedBox {
    OrientedBox::new(
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Mat4::new_rotation(Vec3::new(0.0, 0.0, PI / 4.0)),
    )
    .unwrap()
}

#[test]
fn test_merge_covers_both_inputs() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for left in KINDS {
        for right in KINDS {
            for _ in 0..40 {
                let a = random_volume(&mut rng, left);
                let b = random_volume(&mut rng, right);
                let merged = a.merged_with(&b).unwrap();

                for _ in 0..20 {
                    let p = sample_inside(&mut rng, &a);
                    assert!(merged.contains(&p), "{:?}+{:?} lost {:?} of the left input", left, right, p);
                    let q = sample_inside(&mut rng, &b);
                    assert!(merged.contains(&q), "{:?}+{:?} lost {:?} of the right input", left, right, q);
                }
            }
        }
    }
}

#[test]
fn test_inputs_contained_in_merge() {
    let mut rng = StdRng::seed_from_u64(42);

    for left in KINDS {
        for right in KINDS {
            for _ in 0..20 {
                let a = random_volume(&mut rng, left);
                let b = random_volume(&mut rng, right);
                let merged = a.merged_with(&b).unwrap();
                if merged.kind() == VolumeKind::Box {
                    assert!(a.fully_contained_in(&merged).unwrap());
                    assert!(b.fully_contained_in(&merged).unwrap());
                }
            }
        }
    }
}

#[test]
fn test_touches_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);

    for left in KINDS {
        for right in KINDS {
            for _ in 0..50 {
                let a = random_volume(&mut rng, left);
                let b = random_volume(&mut rng, right);
                assert_eq!(a.touches(&b).unwrap(), b.touches(&a).unwrap());
            }
        }
    }
}

#[test]
fn test_overlapping_volumes_touch() {
    let mut rng = StdRng::seed_from_u64(99);

    for left in KINDS {
        for right in KINDS {
            for _ in 0..30 {
                let a = random_volume(&mut rng, left);
                let b = random_volume(&mut rng, right);
                let p = sample_inside(&mut rng, &a);
                // p clear of b's containment tolerance
                let probe = BoundingVolume::from(Sphere::new(p, 2e-3).unwrap());
                if probe.fully_contained_in(&b).unwrap() {
                    assert!(a.touches(&b).unwrap(), "{:?} and {:?} share {:?}", left, right, p);
                }
            }
        }
    }
}

#[test]
fn test_sphere_merged_with_itself() {
    let sphere = BoundingVolume::from(Sphere::new(Vec3::new(3.0, -1.0, 2.0), 1.5).unwrap());
    assert_eq!(sphere.merged_with(&sphere).unwrap(), sphere);
}

#[test]
fn test_sphere_box_merge_keeps_sphere_when_box_inside() {
    let sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 10.0).unwrap());
    let aabb = BoundingVolume::from(AxisAlignedBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).unwrap());

    assert_eq!(sphere.merged_with(&aabb).unwrap(), sphere);
    assert_eq!(aabb.merged_with(&sphere).unwrap(), sphere);
}

#[test]
fn test_sphere_box_merge_falls_back_to_box() {
    let sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 1.0).unwrap());
    let aabb = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)).unwrap());

    let merged = sphere.merged_with(&aabb).unwrap();
    let expected = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0)).unwrap();
    assert_eq!(merged, BoundingVolume::Box(expected));
}

#[test]
fn test_oriented_boxes_with_same_transform_stay_oriented() {
    let a = diamond();
    let b = OrientedBox::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0), *a.world_transform()).unwrap();
    let merged = BoundingVolume::from(a).merged_with_policy(&b.into(), CrossKindPolicy::Strict).unwrap();
    assert_eq!(merged.kind(), VolumeKind::OrientedBox);
}

#[test]
fn test_box_inside_oriented_box_merges_to_oriented_box() {
    let obb = BoundingVolume::from(diamond());
    let small = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(-0.2, -0.2, -0.2), Vec3::new(0.2, 0.2, 0.2)).unwrap());
    assert_eq!(obb.merged_with(&small).unwrap(), obb);
    assert_eq!(small.merged_with(&obb).unwrap(), obb);
}

#[test]
fn test_strict_policy_rejects_approximations() {
    let sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 1.0).unwrap());
    let obb = BoundingVolume::from(diamond());
    let aabb = BoundingVolume::from(AxisAlignedBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).unwrap());
    let strict = CrossKindPolicy::Strict;

    assert_eq!(
        sphere.touches_with_policy(&obb, strict),
        Err(GeometryError::UnsupportedCombination {
            operation: "touches",
            left: VolumeKind::Sphere,
            right: VolumeKind::OrientedBox,
        })
    );
    assert_eq!(
        obb.touches_with_policy(&sphere, strict),
        Err(GeometryError::UnsupportedCombination {
            operation: "touches",
            left: VolumeKind::OrientedBox,
            right: VolumeKind::Sphere,
        })
    );
    assert!(aabb.merged_with_policy(&obb, strict).is_err());
    assert!(sphere.merged_with_policy(&obb, strict).is_err());
    assert!(sphere.fully_contained_in_with_policy(&obb, strict).is_err());

    // exact answers stay available
    assert!(aabb.touches_with_policy(&obb, strict).unwrap());
    assert!(obb.fully_contained_in_with_policy(&sphere, strict).is_ok());
    assert!(aabb.merged_with_policy(&sphere, strict).is_ok());
}

#[test]
fn test_conservative_sphere_oriented_box_touch() {
    let obb = BoundingVolume::from(diamond());
    // inside the world bounds, outside the turned cube
    let in_gap = BoundingVolume::from(Sphere::new(Vec3::new(1.3, 1.3, 0.0), 0.05).unwrap());
    let beyond = BoundingVolume::from(Sphere::new(Vec3::new(3.0, 3.0, 0.0), 0.05).unwrap());

    assert!(in_gap.touches(&obb).unwrap());
    assert!(!beyond.touches(&obb).unwrap());
}

#[test]
fn test_containment_all_pairs() {
    let big_box = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(-5.0, -5.0, -5.0), Vec3::new(5.0, 5.0, 5.0)).unwrap());
    let big_sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 5.0).unwrap());
    let big_obb = BoundingVolume::from(
        OrientedBox::new(Vec3::new(-4.0, -4.0, -4.0), Vec3::new(4.0, 4.0, 4.0), Mat4::new_rotation(Vec3::new(0.3, 0.2, 0.1))).unwrap(),
    );

    let small_box = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)).unwrap());
    let small_sphere = BoundingVolume::from(Sphere::new(Vec3::new(0.2, 0.0, 0.0), 0.5).unwrap());
    let small_obb = BoundingVolume::from(diamond());

    for inner in [&small_box, &small_sphere, &small_obb] {
        for outer in [&big_box, &big_sphere, &big_obb] {
            assert!(inner.fully_contained_in(outer).unwrap(), "{:?} in {:?}", inner.kind(), outer.kind());
            assert!(!outer.fully_contained_in(inner).unwrap(), "{:?} in {:?}", outer.kind(), inner.kind());
        }
    }
}

#[test]
fn test_box_in_box_uses_tolerance() {
    let outer = BoundingVolume::from(AxisAlignedBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).unwrap());
    let flush = BoundingVolume::from(AxisAlignedBox::new(Vec3::zeros(), Vec3::new(1.0005, 1.0, 1.0)).unwrap());
    assert!(flush.fully_contained_in(&outer).unwrap());
}

#[test]
fn test_ray_dispatch() {
    let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();

    let sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 1.0).unwrap());
    assert_relative_eq!(sphere.intersection_with_ray(&ray).unwrap(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);

    let obb = BoundingVolume::from(diamond());
    let hit = obb.intersection_with_ray(&ray).unwrap();
    assert_relative_eq!(hit, Vec3::new(-(2.0_f64.sqrt()), 0.0, 0.0), epsilon = 1e-9);

    let aabb = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 6.0, 1.0)).unwrap());
    assert!(aabb.intersection_with_ray(&ray).is_none());
}

#[test]
fn test_frustum_uses_enclosing_sphere() {
    let frustum = crate::geometry::Frustum::new(
        Plane::new(Vec3::new(-1.0, 0.0, 0.0), -1.0),
        Plane::new(Vec3::new(1.0, 0.0, 0.0), -1.0),
        Plane::new(Vec3::new(0.0, 1.0, 0.0), -1.0),
        Plane::new(Vec3::new(0.0, -1.0, 0.0), -1.0),
        Plane::new(Vec3::new(0.0, 0.0, -1.0), -1.0),
        Plane::new(Vec3::new(0.0, 0.0, 1.0), -1.0),
    );

    let outside = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(6.0, 1.0, 1.0)).unwrap());
    let straddling = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(3.0, 0.5, 0.5)).unwrap());
    let inside = BoundingVolume::from(Sphere::new(Vec3::zeros(), 0.5).unwrap());

    assert!(!outside.touches_frustum(&frustum));
    assert!(straddling.touches_frustum(&frustum));
    assert!(inside.touches_frustum(&frustum));
}

#[test]
fn test_close_globe_camera_culls_limb_and_picks_front_tile() {
    use crate::render::ScreenProjection;

    // globe of radius 100 seen from 150 units with a 30° field of view
    let camera = Camera::perspective(Vec3::new(0.0, 0.0, 150.0), 30.0, (1280, 720), 1.0, 1000.0);
    let frustum = camera.frustum();

    let limb = BoundingVolume::from(Sphere::new(Vec3::new(100.0, 0.0, 0.0), 2.0).unwrap());
    let front = BoundingVolume::from(
        AxisAlignedBox::new(Vec3::new(8.0, -2.0, 98.0), Vec3::new(12.0, 2.0, 102.0)).unwrap(),
    );
    assert!(!limb.touches_frustum(&frustum));
    assert!(front.touches_frustum(&frustum));

    let pixel = camera.point_to_pixel(&front.center());
    let ray = camera.pixel_to_ray(&pixel).unwrap();
    let hit = front.intersection_with_ray(&ray).unwrap();
    assert!(front.contains(&hit));
    assert!(limb.intersection_with_ray(&ray).is_none());
}

#[test]
fn test_projected_extent_sphere_is_square() {
    let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 90.0, (800, 600), 0.1, 100.0);
    let sphere = BoundingVolume::from(Sphere::new(Vec3::zeros(), 1.0).unwrap());

    // 60 px radius on a 600 px tall viewport
    assert_relative_eq!(sphere.projected_area(&camera), PI * 3600.0, epsilon = 1e-6);
    assert_relative_eq!(sphere.projected_extent(&camera), Vec2::new(120.0, 120.0), epsilon = 1e-6);
}

#[test]
fn test_projected_extent_box_grows_when_closer() {
    let near = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, (800, 600), 0.1, 100.0);
    let far = Camera::perspective(Vec3::new(0.0, 0.0, 20.0), 60.0, (800, 600), 0.1, 100.0);
    let aabb = BoundingVolume::from(AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)).unwrap());

    assert!(aabb.projected_area(&near) > aabb.projected_area(&far));
    assert!(aabb.projected_area(&far) > 0.0);
}

#[test]
fn test_render_and_invalidate_through_enum() {
    struct CountingSink(usize);
    impl WireframeSink for CountingSink {
        fn draw_lines(&mut self, mesh: &WireframeMesh) {
            assert!(mesh.line_count() > 0);
            self.0 += 1;
        }
    }

    let mut sink = CountingSink(0);
    let style = WireframeStyle::default();
    let mut volume = BoundingVolume::from(diamond());

    assert!(!volume.has_cached_mesh());
    volume.render(&mut sink, &style);
    assert!(volume.has_cached_mesh());

    volume.invalidate_mesh();
    assert!(!volume.has_cached_mesh());
    volume.render(&mut sink, &style);
    assert_eq!(sink.0, 2);
}

#[test]
fn test_kind_order() {
    assert!(VolumeKind::Box < VolumeKind::Sphere);
    assert!(VolumeKind::Sphere < VolumeKind::OrientedBox);
}
