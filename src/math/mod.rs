mod color;
mod rotation;

pub use color::hsv_to_rgb;
pub use rotation::{
    camera_rotation, direction_angles, inverse_camera_rotation, pitch, yaw,
};
