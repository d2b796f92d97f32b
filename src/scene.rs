//! Authoring-side scene graph: drawables owning surfaces, lights, and
//! time-based motion rules. Each frame the scene is baked into an
//! immutable [`SceneSnapshot`] in camera-relative coordinates; the bake
//! never mutates the scene itself.

use glam::Vec3;

use crate::camera::Camera;
use crate::snapshot::{LightRecord, SceneSnapshot, SurfaceBuffer};
use crate::surfaces::Surface;

/// A time-based motion rule for a drawable or light.
#[derive(Debug, Clone, Copy)]
pub enum Animation {
    /// Horizontal circle of `radius` around the object's resting
    /// position, at `speed` radians per second.
    Orbit { radius: f32, speed: f32 },
}

impl Animation {
    fn position(&self, rest: Vec3, time: f32) -> Vec3 {
        match *self {
            Animation::Orbit { radius, speed } => {
                let phase = speed * time;
                rest + Vec3::new(phase.cos(), 0.0, -phase.sin()) * radius
            }
        }
    }
}

/// A positioned group of surfaces. Surface coordinates are local to the
/// drawable, so moving the drawable moves all of them.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub position: Vec3,
    rest_position: Vec3,
    pub surfaces: Vec<Surface>,
    animation: Option<Animation>,
}

impl Drawable {
    pub fn new(position: Vec3, surfaces: Vec<Surface>) -> Self {
        Self {
            position,
            rest_position: position,
            surfaces,
            animation: None,
        }
    }

    pub fn animated(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    fn tick(&mut self, time: f32) {
        if let Some(animation) = self.animation {
            self.position = animation.position(self.rest_position, time);
        }
    }
}

/// A point light. `color` is a per-channel radiant scale and is not
/// clamped to [0, 1]; brightness falls off with squared distance.
#[derive(Debug, Clone)]
pub struct Light {
    pub position: Vec3,
    rest_position: Vec3,
    pub color: Vec3,
    animation: Option<Animation>,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            rest_position: position,
            color,
            animation: None,
        }
    }

    pub fn animated(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    fn tick(&mut self, time: f32) {
        if let Some(animation) = self.animation {
            self.position = animation.position(self.rest_position, time);
        }
    }
}

/// Ordered drawables and lights; order is preserved through the bake so
/// surface indices stay stable within a frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub drawables: Vec<Drawable>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(drawables: Vec<Drawable>, lights: Vec<Light>) -> Self {
        Self { drawables, lights }
    }

    pub fn surface_count(&self) -> usize {
        self.drawables.iter().map(|d| d.surfaces.len()).sum()
    }

    /// Advance every motion rule to the given time (seconds).
    pub fn tick(&mut self, time: f32) {
        for drawable in &mut self.drawables {
            drawable.tick(time);
        }
        for light in &mut self.lights {
            light.tick(time);
        }
    }

    /// Re-express every surface and light in the camera frame and pack
    /// the results into flat buffers. Pure: the scene is not touched, and
    /// baking twice with the same camera yields identical snapshots.
    pub fn bake(&self, camera: &Camera) -> SceneSnapshot {
        let inverse_rotation = camera.inverse_rotation();

        let mut surfaces = SurfaceBuffer::with_capacity(self.surface_count());
        for drawable in &self.drawables {
            for surface in &drawable.surfaces {
                let baked = surface.bake(drawable.position, camera.position, inverse_rotation);
                surfaces.push(baked.tag(), baked.record());
            }
        }

        let lights = self
            .lights
            .iter()
            .map(|light| LightRecord {
                position: (inverse_rotation * (light.position - camera.position)).to_array(),
                color: light.color.to_array(),
            })
            .collect();

        SceneSnapshot { surfaces, lights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::Sphere;
    use std::f32::consts::FRAC_PI_2;

    fn one_sphere_scene() -> Scene {
        let sphere = Surface::Sphere(Sphere::new(Vec3::ZERO, 1.0, Vec3::ONE));
        Scene::new(
            vec![Drawable::new(Vec3::new(0.0, 0.0, 10.0), vec![sphere])],
            vec![Light::new(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(100.0))],
        )
    }

    #[test]
    fn bake_packs_every_surface_and_light() {
        let scene = one_sphere_scene();
        let camera = Camera::new(Vec3::ZERO, Vec3::Z);
        let snapshot = scene.bake(&camera);

        assert_eq!(snapshot.surfaces.len(), 1);
        assert_eq!(snapshot.lights.len(), 1);
    }

    #[test]
    fn bake_is_camera_relative() {
        let scene = one_sphere_scene();
        let camera = Camera::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let snapshot = scene.bake(&camera);

        assert_eq!(snapshot.surfaces.record(0).pos, [0.0, 0.0, 20.0]);
        assert_eq!(snapshot.lights[0].position, [0.0, 5.0, 10.0]);
    }

    #[test]
    fn bake_applies_the_inverse_camera_rotation() {
        let scene = one_sphere_scene();
        // Looking along +x puts the sphere, which sits along +z, off to
        // the camera's left
        let camera = Camera::new(Vec3::ZERO, Vec3::X);
        let snapshot = scene.bake(&camera);

        let pos = Vec3::from_array(snapshot.surfaces.record(0).pos);
        assert!((pos - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn bake_twice_yields_identical_snapshots() {
        let scene = one_sphere_scene();
        let camera = Camera::new(Vec3::new(1.0, 2.0, -3.0), Vec3::new(0.3, -0.1, 1.0));

        let first = scene.bake(&camera);
        let second = scene.bake(&camera);
        assert_eq!(first.surfaces, second.surfaces);
        assert_eq!(first.lights, second.lights);
    }

    #[test]
    fn orbit_animation_moves_around_the_rest_position() {
        let mut scene = one_sphere_scene();
        scene.lights[0] = Light::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE).animated(
            Animation::Orbit {
                radius: 4.0,
                speed: 1.0,
            },
        );

        scene.tick(0.0);
        assert!((scene.lights[0].position - Vec3::new(14.0, 0.0, 0.0)).length() < 1e-4);

        scene.tick(FRAC_PI_2);
        assert!((scene.lights[0].position - Vec3::new(10.0, 0.0, -4.0)).length() < 1e-4);

        // Rest position is the anchor, so ticking is not cumulative
        scene.tick(0.0);
        assert!((scene.lights[0].position - Vec3::new(14.0, 0.0, 0.0)).length() < 1e-4);
    }
}
