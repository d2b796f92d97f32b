use glam::{Mat3, Vec3};

/// Rotation about the world Y axis (looking left/right).
pub fn yaw(angle: f32) -> Mat3 {
    Mat3::from_rotation_y(angle)
}

/// Rotation about the camera X axis (looking up/down).
///
/// Positive pitch tilts the view direction upward, which is a rotation by
/// the negated angle about X.
pub fn pitch(angle: f32) -> Mat3 {
    Mat3::from_rotation_x(-angle)
}

/// Camera orientation: pitch applied first, then yaw.
pub fn camera_rotation(yaw_angle: f32, pitch_angle: f32) -> Mat3 {
    yaw(yaw_angle) * pitch(pitch_angle)
}

/// Inverse camera orientation.
///
/// A pure rotation is inverted by composing the negated elementary
/// rotations in reverse order; no general matrix inversion is needed.
pub fn inverse_camera_rotation(yaw_angle: f32, pitch_angle: f32) -> Mat3 {
    pitch(-pitch_angle) * yaw(-yaw_angle)
}

/// Yaw/pitch angles of a view direction (not necessarily normalized).
pub fn direction_angles(direction: Vec3) -> (f32, f32) {
    let yaw_angle = direction.x.atan2(direction.z);
    let pitch_angle = direction.y.atan2(direction.x.hypot(direction.z));
    (yaw_angle, pitch_angle)
}
