use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Mat3, Vec3};

use ray_caster::dispatch::FrameBuffer;
use ray_caster::render::{render_band, RenderJob};
use ray_caster::scene::{Drawable, Light, Scene};
use ray_caster::surfaces::{Cylinder, Sphere, Surface, Triangle};

fn baked_triangle() -> ray_caster::surfaces::BakedTriangle {
    Triangle::new(
        [
            Vec3::new(-5.0, 5.0, 20.0),
            Vec3::new(5.0, 5.0, 20.0),
            Vec3::new(0.0, -5.0, 20.0),
        ],
        Vec3::ONE,
    )
    .bake(Vec3::ZERO, Vec3::ZERO, Mat3::IDENTITY)
}

fn bench_triangle_intersection(c: &mut Criterion) {
    let triangle = baked_triangle();
    let direction = Vec3::new(0.05, -0.02, 1.0).normalize();

    c.bench_function("triangle_intersection_hit", |b| {
        b.iter(|| {
            black_box(triangle.intersect(
                black_box(Vec3::ZERO),
                black_box(direction),
                f32::INFINITY,
                false,
            ))
        })
    });
}

fn bench_sphere_intersection(c: &mut Criterion) {
    let sphere = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 4.0, Vec3::ONE).bake(
        Vec3::ZERO,
        Vec3::ZERO,
        Mat3::IDENTITY,
    );
    let direction = Vec3::new(0.05, -0.02, 1.0).normalize();

    c.bench_function("sphere_intersection_hit", |b| {
        b.iter(|| {
            black_box(sphere.intersect(black_box(Vec3::ZERO), black_box(direction), f32::INFINITY))
        })
    });
}

fn bench_cylinder_intersection(c: &mut Criterion) {
    let cylinder = Cylinder::new(Vec3::new(0.0, -4.0, 20.0), Vec3::Y, 2.0, 8.0, Vec3::ONE).bake(
        Vec3::ZERO,
        Vec3::ZERO,
        Mat3::IDENTITY,
    );
    let direction = Vec3::new(0.02, 0.01, 1.0).normalize();

    c.bench_function("cylinder_intersection_hit", |b| {
        b.iter(|| {
            black_box(cylinder.intersect(
                black_box(Vec3::ZERO),
                black_box(direction),
                f32::INFINITY,
            ))
        })
    });
}

/// Full linear-scan shading of one 64x64 band over a small mixed scene.
fn bench_render_band(c: &mut Criterion) {
    let scene = Scene::new(
        vec![
            Drawable::new(
                Vec3::ZERO,
                vec![
                    Surface::Triangle(Triangle::new(
                        [
                            Vec3::new(-30.0, 20.0, 40.0),
                            Vec3::new(30.0, 20.0, 40.0),
                            Vec3::new(0.0, -30.0, 40.0),
                        ],
                        Vec3::new(0.8, 0.8, 0.2),
                    )),
                    Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, 20.0), 4.0, Vec3::ONE)),
                    Surface::Cylinder(Cylinder::new(
                        Vec3::new(-8.0, -6.0, 25.0),
                        Vec3::Y,
                        2.0,
                        10.0,
                        Vec3::new(0.2, 0.6, 0.9),
                    )),
                ],
            ),
        ],
        vec![
            Light::new(Vec3::new(-10.0, 15.0, 0.0), Vec3::splat(400.0)),
            Light::new(Vec3::new(12.0, 5.0, 10.0), Vec3::splat(250.0)),
        ],
    );

    let camera = ray_caster::camera::Camera::new(Vec3::ZERO, Vec3::Z);
    let snapshot = Arc::new(scene.bake(&camera));
    let width = 64u32;

    c.bench_function("render_band_64x64", |b| {
        b.iter(|| {
            let job = RenderJob {
                row_start: 0,
                row_end: 64,
                width,
                height: 64,
                projection_distance: camera.projection_distance(width),
                snapshot: Arc::clone(&snapshot),
                frame_id: 1,
                frame_counter: Arc::new(AtomicU64::new(1)),
                output: FrameBuffer::new(width, 64),
            };
            black_box(render_band(&job).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_triangle_intersection,
    bench_sphere_intersection,
    bench_cylinder_intersection,
    bench_render_band
);
criterion_main!(benches);
