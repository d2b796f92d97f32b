use glam::Vec3;
use ray_caster::camera::Camera;
use ray_caster::snapshot::SurfaceBuffer;
use ray_caster::surfaces::{BakedSurface, Cylinder, Sphere, Surface, Triangle};

/// A fixed battery of rays: a fan of directions from two origins.
fn ray_battery() -> Vec<(Vec3, Vec3)> {
    let mut rays = Vec::new();
    for origin in [Vec3::ZERO, Vec3::new(2.0, -1.0, -5.0)] {
        for ix in -3..=3 {
            for iy in -3..=3 {
                let direction = Vec3::new(ix as f32 * 0.2, iy as f32 * 0.2, 1.0).normalize();
                rays.push((origin, direction));
            }
        }
    }
    rays
}

fn test_surfaces() -> Vec<Surface> {
    vec![
        Surface::Triangle(Triangle::new(
            [
                Vec3::new(-8.0, 6.0, 22.0),
                Vec3::new(9.0, 7.0, 25.0),
                Vec3::new(0.0, -9.0, 18.0),
            ],
            Vec3::new(1.0, 0.4, 0.1),
        )),
        Surface::Sphere(Sphere::new(Vec3::new(-2.0, 1.0, 15.0), 3.5, Vec3::ONE)),
        Surface::Cylinder(Cylinder::new(
            Vec3::new(4.0, -5.0, 20.0),
            Vec3::new(0.2, 1.0, 0.1),
            2.0,
            8.0,
            Vec3::new(0.3, 0.3, 0.9),
        )),
    ]
}

fn assert_hits_match(a: &BakedSurface, b: &BakedSurface, label: &str) {
    for (origin, direction) in ray_battery() {
        for plane_only in [false, true] {
            let direct = a.intersect(origin, direction, f32::INFINITY, plane_only);
            let decoded = b.intersect(origin, direction, f32::INFINITY, plane_only);

            match (direct, decoded) {
                (None, None) => {}
                (Some(x), Some(y)) => {
                    assert!(
                        (x.t - y.t).abs() < 1e-5,
                        "{label}: t {} vs {}",
                        x.t,
                        y.t
                    );
                    assert!((x.point - y.point).length() < 1e-4, "{label}: point");
                    assert!((x.normal - y.normal).length() < 1e-5, "{label}: normal");
                }
                (direct, decoded) => {
                    panic!("{label}: hit mismatch for ray {origin:?} -> {direction:?}: {direct:?} vs {decoded:?}")
                }
            }
        }
    }
}

/// Intersections computed from the serialized records must match the
/// ones computed on the baked objects directly, ray for ray.
#[test]
fn serialized_records_reproduce_object_intersections() {
    let camera = Camera::new(Vec3::new(1.5, -0.5, -12.0), Vec3::new(0.1, 0.05, 1.0));
    let inverse_rotation = camera.inverse_rotation();

    let mut buffer = SurfaceBuffer::new();
    let mut baked = Vec::new();
    for surface in test_surfaces() {
        let b = surface.bake(Vec3::ZERO, camera.position, inverse_rotation);
        buffer.push(b.tag(), b.record());
        baked.push(b);
    }

    // Through the wire encoding and back
    let decoded = SurfaceBuffer::from_bytes(&buffer.to_bytes()).unwrap();
    assert_eq!(decoded.len(), baked.len());

    for (index, original) in baked.iter().enumerate() {
        let rebuilt =
            BakedSurface::from_record(decoded.tag(index), decoded.record(index)).unwrap();
        let label = format!("surface {index}");
        assert_hits_match(original, &rebuilt, &label);
    }
}

/// Baking must be a pure function of its inputs: repeating it changes
/// nothing, byte for byte.
#[test]
fn rebaking_produces_identical_records() {
    let camera = Camera::new(Vec3::new(3.0, 2.0, -20.0), Vec3::new(-0.2, 0.1, 1.0));
    let inverse_rotation = camera.inverse_rotation();

    for surface in test_surfaces() {
        let first = surface.bake(Vec3::new(1.0, 0.0, 2.0), camera.position, inverse_rotation);
        let second = surface.bake(Vec3::new(1.0, 0.0, 2.0), camera.position, inverse_rotation);
        assert_eq!(first.record(), second.record());
    }
}
