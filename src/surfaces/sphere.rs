use bytemuck::Zeroable;
use glam::{Mat3, Vec3};

use crate::snapshot::SurfaceRecord;

use super::{flag, to_camera, Hit};

/// An authored sphere: center local to the owning drawable.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            center,
            radius,
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

    /// Only the center moves between frames; radius² is frame-invariant.
    pub fn bake(&self, offset: Vec3, camera_pos: Vec3, inverse_rotation: Mat3) -> BakedSphere {
        BakedSphere {
            center: to_camera(self.center, offset, camera_pos, inverse_rotation),
            radius_squared: self.radius * self.radius,
            color: self.color,
            glow: self.glow,
            no_shadow: self.no_shadow,
        }
    }
}

/// Camera-space sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedSphere {
    pub center: Vec3,
    pub radius_squared: f32,
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl BakedSphere {
    pub fn intersect(&self, origin: Vec3, direction: Vec3, t_max: f32) -> Option<Hit> {
        // Shift to sphere-centered coordinates; direction is unit length,
        // so the quadratic reduces to the half-b form.
        let rel = origin - self.center;
        let b_half = rel.dot(direction);
        let c = rel.length_squared() - self.radius_squared;

        let discriminant = b_half * b_half - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        let near = -b_half - sqrt_d;
        if near > 0.0 && near < t_max {
            let point = origin + direction * near;
            return Some(Hit {
                t: near,
                point,
                normal: (point - self.center).normalize(),
            });
        }

        // Origin inside the sphere: take the far root, normal inverted
        let far = -b_half + sqrt_d;
        if far > 0.0 && far < t_max {
            let point = origin + direction * far;
            return Some(Hit {
                t: far,
                point,
                normal: (self.center - point).normalize(),
            });
        }

        None
    }

    pub fn record(&self) -> SurfaceRecord {
        SurfaceRecord {
            color: self.color.to_array(),
            glow: flag(self.glow),
            no_shadow: flag(self.no_shadow),
            pos: self.center.to_array(),
            scalar: self.radius_squared,
            ..SurfaceRecord::zeroed()
        }
    }

    pub fn from_record(record: &SurfaceRecord) -> Self {
        Self {
            center: Vec3::from_array(record.pos),
            radius_squared: record.scalar,
            color: Vec3::from_array(record.color),
            glow: record.glow != 0.0,
            no_shadow: record.no_shadow != 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat3;

    fn baked(center: Vec3, radius: f32) -> BakedSphere {
        Sphere::new(center, radius, Vec3::ONE).bake(Vec3::ZERO, Vec3::ZERO, Mat3::IDENTITY)
    }

    #[test]
    fn hit_from_outside_takes_near_root() {
        let sphere = baked(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let hit = sphere
            .intersect(Vec3::ZERO, Vec3::Z, f32::INFINITY)
            .unwrap();

        assert!((hit.t - 8.0).abs() < 1e-4);
        assert!((hit.normal - (-Vec3::Z)).length() < 1e-4);
    }

    #[test]
    fn through_center_roots_are_symmetric() {
        let sphere = baked(Vec3::new(0.0, 0.0, 10.0), 3.0);

        // Entry points from either side sit symmetrically about the center
        let from_front = sphere
            .intersect(Vec3::ZERO, Vec3::Z, f32::INFINITY)
            .unwrap();
        let from_back = sphere
            .intersect(Vec3::new(0.0, 0.0, 20.0), -Vec3::Z, f32::INFINITY)
            .unwrap();

        assert!((from_front.t - 7.0).abs() < 1e-4);
        assert!((from_back.t - 7.0).abs() < 1e-4);
    }

    #[test]
    fn miss_returns_none() {
        let sphere = baked(Vec3::new(0.0, 0.0, 10.0), 1.0);
        assert!(sphere.intersect(Vec3::ZERO, Vec3::X, f32::INFINITY).is_none());
    }

    #[test]
    fn origin_inside_uses_far_root_with_inverted_normal() {
        let sphere = baked(Vec3::ZERO, 5.0);
        let hit = sphere
            .intersect(Vec3::ZERO, Vec3::Z, f32::INFINITY)
            .unwrap();

        assert!((hit.t - 5.0).abs() < 1e-4);
        // Inside the sphere the normal points back toward the center
        assert!((hit.normal - (-Vec3::Z)).length() < 1e-4);
    }

    #[test]
    fn t_max_rejects_both_roots() {
        let sphere = baked(Vec3::new(0.0, 0.0, 10.0), 2.0);
        assert!(sphere.intersect(Vec3::ZERO, Vec3::Z, 7.9).is_none());
    }

    #[test]
    fn record_round_trip() {
        let sphere = baked(Vec3::new(1.0, -2.0, 3.0), 2.5);
        let rebuilt = BakedSphere::from_record(&sphere.record());
        assert_eq!(rebuilt, sphere);
    }
}
