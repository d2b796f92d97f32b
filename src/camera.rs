use glam::{Mat3, Vec3};
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::math;

pub const CAMERA_SPEED: f32 = 25.0;
pub const CAMERA_ROTATION_SPEED: f32 = 1.5;

#[derive(Default, Clone, Copy)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl MovementState {
    const fn to_direction(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    const fn velocity(&self) -> (f32, f32, f32) {
        (
            Self::to_direction(self.forward, self.backward),
            Self::to_direction(self.right, self.left),
            Self::to_direction(self.up, self.down),
        )
    }

    const fn rotation_velocity(&self) -> f32 {
        Self::to_direction(self.rotate_right, self.rotate_left)
    }
}

/// Pinhole camera with first-person controls. Orientation is stored as
/// yaw/pitch; the scene is rotated by the inverse orientation during the
/// bake so rays can be cast from the origin along +z.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub movement: MovementState,
}

impl Camera {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        let (yaw, pitch) = math::direction_angles(direction);
        Self {
            position,
            yaw,
            pitch,
            fov: std::f32::consts::FRAC_PI_2,
            movement: MovementState::default(),
        }
    }

    /// Starting pose for a named scene.
    pub fn new_for_scene(scene_name: &str) -> Self {
        match scene_name {
            "walls" => Camera::new(Vec3::new(0.0, 0.0, -30.0), Vec3::Z),
            _ => Camera::new(Vec3::new(0.0, 4.0, -35.0), Vec3::new(0.0, -0.1, 1.0)),
        }
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        let (yaw, pitch) = math::direction_angles(direction);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn direction(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    pub fn rotation(&self) -> Mat3 {
        math::camera_rotation(self.yaw, self.pitch)
    }

    pub fn inverse_rotation(&self) -> Mat3 {
        math::inverse_camera_rotation(self.yaw, self.pitch)
    }

    /// Distance from the eye to the image plane for the given image
    /// width, from the pinhole model.
    pub fn projection_distance(&self, width: u32) -> f32 {
        (width as f32 / 2.0) / (self.fov / 2.0).tan()
    }

    /// Integrate held movement keys over `delta` seconds. Translation
    /// happens in the yaw frame so "forward" ignores pitch.
    pub fn update(&mut self, delta: f32) {
        let (fwd, right, up) = self.movement.velocity();
        let translate = math::yaw(self.yaw) * Vec3::new(right, up, fwd);

        if translate.length_squared() > 0.0 {
            self.position += translate.normalize() * CAMERA_SPEED * delta;
        }
        self.yaw += self.movement.rotation_velocity() * CAMERA_ROTATION_SPEED * delta;
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) {
        let is_pressed = event.state.is_pressed();
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match keycode {
                KeyCode::KeyW => self.movement.forward = is_pressed,
                KeyCode::KeyS => self.movement.backward = is_pressed,
                KeyCode::KeyA => self.movement.left = is_pressed,
                KeyCode::KeyD => self.movement.right = is_pressed,
                KeyCode::Space => self.movement.up = is_pressed,
                KeyCode::ShiftLeft => self.movement.down = is_pressed,
                KeyCode::KeyQ => self.movement.rotate_left = is_pressed,
                KeyCode::KeyE => self.movement.rotate_right = is_pressed,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_angles() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Z);
        let wanted = Vec3::new(0.5, 0.3, 0.8).normalize();
        camera.set_direction(wanted);

        assert!((camera.direction() - wanted).length() < 1e-5);
    }

    #[test]
    fn forward_direction_has_zero_angles() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z);
        assert!(camera.yaw.abs() < 1e-6);
        assert!(camera.pitch.abs() < 1e-6);
    }

    #[test]
    fn projection_distance_matches_fov() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Z);
        camera.fov = std::f32::consts::FRAC_PI_2;
        // tan(45°) = 1, so the image plane sits half a width away
        assert!((camera.projection_distance(800) - 400.0).abs() < 1e-3);
    }

    #[test]
    fn update_translates_in_the_yaw_frame() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
        camera.movement.forward = true;
        camera.update(1.0);

        assert!(camera.position.x > 0.0);
        assert!(camera.position.z.abs() < 1e-3);
    }
}
