//! Built-in scenes. Everything here is plain authoring data; the engine
//! only ever sees the baked snapshots.

use glam::Vec3;

use crate::math::hsv_to_rgb;
use crate::scene::{Animation, Drawable, Light, Scene};
use crate::surfaces::{Cylinder, Sphere, Surface, Triangle};

/// Green slab of four triangles lit by a single static light.
pub fn create_walls_scene() -> Scene {
    let green = Vec3::new(0.0, 1.0, 0.0);
    let vertices = [
        [
            Vec3::new(20.0, 10.0, 10.0),
            Vec3::new(30.0, 10.0, 10.0),
            Vec3::new(20.0, -10.0, -10.0),
        ],
        [
            Vec3::new(30.0, 10.0, 10.0),
            Vec3::new(30.0, -10.0, -10.0),
            Vec3::new(20.0, -10.0, -10.0),
        ],
        [
            Vec3::new(30.0, 10.0, 10.0),
            Vec3::new(30.0, -10.0, 10.0),
            Vec3::new(30.0, -10.0, -10.0),
        ],
        [
            Vec3::new(20.0, 10.0, 10.0),
            Vec3::new(20.0, -10.0, 10.0),
            Vec3::new(20.0, -10.0, -10.0),
        ],
    ];

    let surfaces = vertices
        .into_iter()
        .map(|v| Surface::Triangle(Triangle::new(v, green)))
        .collect();

    Scene::new(
        vec![Drawable::new(Vec3::ZERO, surfaces)],
        vec![Light::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::splat(300.0))],
    )
}

/// Mixed-primitive showcase: a floor, colored walls, a sphere and a
/// cylinder, one static and one orbiting light with glow markers.
pub fn create_demo_scene() -> Scene {
    let mut drawables = Vec::new();

    // Floor quad
    let floor_color = Vec3::new(0.35, 0.35, 0.4);
    let floor = vec![
        Surface::Triangle(Triangle::new(
            [
                Vec3::new(-40.0, -6.0, -40.0),
                Vec3::new(40.0, -6.0, -40.0),
                Vec3::new(-40.0, -6.0, 60.0),
            ],
            floor_color,
        )),
        Surface::Triangle(Triangle::new(
            [
                Vec3::new(40.0, -6.0, -40.0),
                Vec3::new(40.0, -6.0, 60.0),
                Vec3::new(-40.0, -6.0, 60.0),
            ],
            floor_color,
        )),
    ];
    drawables.push(Drawable::new(Vec3::ZERO, floor));

    // Back wall built from hue-stepped triangle pairs
    let mut wall = Vec::new();
    for step in 0..6 {
        let x = -18.0 + step as f32 * 6.0;
        let color = hsv_to_rgb(step as f32 / 6.0, 0.7, 0.9);
        wall.push(Surface::Triangle(Triangle::new(
            [
                Vec3::new(x, -6.0, 40.0),
                Vec3::new(x + 6.0, -6.0, 40.0),
                Vec3::new(x, 8.0, 40.0),
            ],
            color,
        )));
        wall.push(Surface::Triangle(Triangle::new(
            [
                Vec3::new(x + 6.0, -6.0, 40.0),
                Vec3::new(x + 6.0, 8.0, 40.0),
                Vec3::new(x, 8.0, 40.0),
            ],
            color,
        )));
    }
    drawables.push(Drawable::new(Vec3::ZERO, wall));

    // Centerpiece sphere, slowly circling
    drawables.push(
        Drawable::new(
            Vec3::new(0.0, 0.0, 15.0),
            vec![Surface::Sphere(Sphere::new(
                Vec3::ZERO,
                4.0,
                Vec3::new(0.9, 0.25, 0.2),
            ))],
        )
        .animated(Animation::Orbit {
            radius: 6.0,
            speed: 0.4,
        }),
    );

    // Standing cylinder off to the side
    drawables.push(Drawable::new(
        Vec3::new(-12.0, 0.0, 20.0),
        vec![Surface::Cylinder(Cylinder::new(
            Vec3::new(0.0, -6.0, 0.0),
            Vec3::Y,
            2.5,
            11.0,
            Vec3::new(0.2, 0.5, 0.9),
        ))],
    ));

    // Lights, each with a small glow marker that neither shades nor
    // casts shadows
    let key_light = Light::new(Vec3::new(14.0, 12.0, 0.0), Vec3::splat(420.0));
    let orbit = Animation::Orbit {
        radius: 18.0,
        speed: 0.8,
    };
    let moving_light =
        Light::new(Vec3::new(0.0, 6.0, 15.0), Vec3::new(260.0, 240.0, 160.0)).animated(orbit);

    let marker = |pos: Vec3, color: Vec3| {
        Drawable::new(
            pos,
            vec![Surface::Sphere(
                Sphere::new(Vec3::ZERO, 0.6, color).glowing().shadowless(),
            )],
        )
    };
    drawables.push(marker(key_light.position, Vec3::new(1.0, 1.0, 0.9)));
    drawables.push(marker(moving_light.position, Vec3::new(1.0, 0.95, 0.7)).animated(orbit));

    Scene::new(drawables, vec![key_light, moving_light])
}

/// Scene registry used by the binary.
pub fn create_scene(name: &str) -> Scene {
    match name {
        "walls" => create_walls_scene(),
        _ => create_demo_scene(),
    }
}
