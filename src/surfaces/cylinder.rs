use bytemuck::Zeroable;
use glam::{Mat3, Vec3};

use crate::snapshot::SurfaceRecord;

use super::{flag, to_camera, Hit};

/// An authored finite open cylinder: base center and unit axis local to
/// the owning drawable, extending `height` along the axis. No end caps.
#[derive(Debug, Clone)]
pub struct Cylinder {
    pub base: Vec3,
    pub axis: Vec3,
    pub radius: f32,
    pub height: f32,
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl Cylinder {
    pub fn new(base: Vec3, axis: Vec3, radius: f32, height: f32, color: Vec3) -> Self {
        Self {
            base,
            axis: axis.normalize(),
            radius,
            height,
            color,
            glow: false,
            no_shadow: false,
        }
    }

    pub fn glowing(mut self) -> Self {
        self.glow = true;
        self
    }

    pub fn shadowless(mut self) -> Self {
        self.no_shadow = true;
        self
    }

    /// Base and axis move with the camera frame; radius² and height are
    /// frame-invariant. The axis is only rotated, so it stays unit.
    pub fn bake(&self, offset: Vec3, camera_pos: Vec3, inverse_rotation: Mat3) -> BakedCylinder {
        BakedCylinder {
            base: to_camera(self.base, offset, camera_pos, inverse_rotation),
            axis: inverse_rotation * self.axis,
            radius_squared: self.radius * self.radius,
            height: self.height,
            color: self.color,
            glow: self.glow,
            no_shadow: self.no_shadow,
        }
    }
}

/// Camera-space cylinder.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedCylinder {
    pub base: Vec3,
    pub axis: Vec3,
    pub radius_squared: f32,
    pub height: f32,
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl BakedCylinder {
    pub fn intersect(&self, origin: Vec3, direction: Vec3, t_max: f32) -> Option<Hit> {
        // Solve on the plane perpendicular to the axis, then clamp the
        // accepted root to the finite segment.
        let rel = origin - self.base;
        let dir_perp = direction - self.axis * direction.dot(self.axis);
        let rel_perp = rel - self.axis * rel.dot(self.axis);

        let a = dir_perp.length_squared();
        if a == 0.0 {
            // Ray runs along the axis; the lateral wall is never crossed
            return None;
        }

        let b_half = rel_perp.dot(dir_perp);
        let c = rel_perp.length_squared() - self.radius_squared;
        let discriminant = b_half * b_half - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        // Near root first; the far root covers a ray starting inside the
        // tube or clipping past an out-of-range near hit, with the normal
        // mirrored like the sphere's front/back handling.
        let roots = [
            ((-b_half - sqrt_d) / a, false),
            ((-b_half + sqrt_d) / a, true),
        ];
        for (t, inside) in roots {
            if t <= 0.0 || t >= t_max {
                continue;
            }
            let point = origin + direction * t;
            let axial = (point - self.base).dot(self.axis);
            if axial <= 0.0 || axial >= self.height {
                continue;
            }
            let radial = (point - self.base - self.axis * axial).normalize();
            let normal = if inside { -radial } else { radial };
            return Some(Hit { t, point, normal });
        }

        None
    }

    pub fn record(&self) -> SurfaceRecord {
        SurfaceRecord {
            color: self.color.to_array(),
            glow: flag(self.glow),
            no_shadow: flag(self.no_shadow),
            pos: self.base.to_array(),
            axis: self.axis.to_array(),
            scalar: self.radius_squared,
            height: self.height,
            ..SurfaceRecord::zeroed()
        }
    }

    pub fn from_record(record: &SurfaceRecord) -> Self {
        Self {
            base: Vec3::from_array(record.pos),
            axis: Vec3::from_array(record.axis),
            radius_squared: record.scalar,
            height: record.height,
            color: Vec3::from_array(record.color),
            glow: record.glow != 0.0,
            no_shadow: record.no_shadow != 0.0,
        }
    }
}
