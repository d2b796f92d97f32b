use glam::{Mat3, Vec3};

use crate::snapshot::SurfaceRecord;

use super::{flag, to_camera, Hit};

/// An authored triangle: three vertices local to the owning drawable.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl Triangle {
    pub fn new(vertices: [Vec3; 3], color: Vec3) -> Self {
        Self {
            vertices,
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

    /// Recompute all intersection coefficients in the camera frame.
    ///
    /// Callers guarantee a non-degenerate triangle; a zero-area one has
    /// no well-defined normal.
    pub fn bake(&self, offset: Vec3, camera_pos: Vec3, inverse_rotation: Mat3) -> BakedTriangle {
        let [a, b, c] = self
            .vertices
            .map(|v| to_camera(v, offset, camera_pos, inverse_rotation));

        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2).normalize();
        let plane_offset = -normal.dot(a);

        let dot11 = edge1.dot(edge1);
        let dot12 = edge1.dot(edge2);
        let dot22 = edge2.dot(edge2);
        let inv_denom = 1.0 / (dot11 * dot22 - dot12 * dot12);

        BakedTriangle {
            v0: a,
            normal,
            plane_offset,
            edge1,
            edge2,
            dot11,
            dot12,
            dot22,
            inv_denom,
            color: self.color,
            glow: self.glow,
            no_shadow: self.no_shadow,
        }
    }
}

/// Camera-space triangle with precomputed plane and barycentric
/// coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedTriangle {
    pub v0: Vec3,
    pub normal: Vec3,
    pub plane_offset: f32,
    pub edge1: Vec3,
    pub edge2: Vec3,
    pub dot11: f32,
    pub dot12: f32,
    pub dot22: f32,
    pub inv_denom: f32,
    pub color: Vec3,
    pub glow: bool,
    pub no_shadow: bool,
}

impl BakedTriangle {
    pub fn intersect(
        &self,
        origin: Vec3,
        direction: Vec3,
        t_max: f32,
        plane_only: bool,
    ) -> Option<Hit> {
        let denom = self.normal.dot(direction);
        if denom == 0.0 {
            // Ray parallel to the plane
            return None;
        }

        let t = -(self.normal.dot(origin) + self.plane_offset) / denom;
        if t <= 0.0 || t >= t_max {
            return None;
        }

        let point = origin + direction * t;
        if !plane_only && !self.contains(point) {
            return None;
        }

        // Normal opposes the incoming ray, back face included
        let normal = if denom > 0.0 { -self.normal } else { self.normal };
        Some(Hit { t, point, normal })
    }

    /// Barycentric membership test, tolerant of boundary rounding.
    fn contains(&self, point: Vec3) -> bool {
        let v = point - self.v0;
        let dot1p = self.edge1.dot(v);
        let dot2p = self.edge2.dot(v);

        let u = (self.dot22 * dot1p - self.dot12 * dot2p) * self.inv_denom;
        let w = (self.dot11 * dot2p - self.dot12 * dot1p) * self.inv_denom;

        u >= -f32::EPSILON && w >= -f32::EPSILON && u + w <= 1.0 + f32::EPSILON
    }

    pub fn record(&self) -> SurfaceRecord {
        SurfaceRecord {
            color: self.color.to_array(),
            glow: flag(self.glow),
            no_shadow: flag(self.no_shadow),
            pos: self.v0.to_array(),
            axis: self.normal.to_array(),
            scalar: self.plane_offset,
            height: 0.0,
            edge1: self.edge1.to_array(),
            edge2: self.edge2.to_array(),
            dot11: self.dot11,
            dot12: self.dot12,
            dot22: self.dot22,
            inv_denom: self.inv_denom,
            _pad: [0.0; 3],
        }
    }

    pub fn from_record(record: &SurfaceRecord) -> Self {
        Self {
            v0: Vec3::from_array(record.pos),
            normal: Vec3::from_array(record.axis),
            plane_offset: record.scalar,
            edge1: Vec3::from_array(record.edge1),
            edge2: Vec3::from_array(record.edge2),
            dot11: record.dot11,
            dot12: record.dot12,
            dot22: record.dot22,
            inv_denom: record.inv_denom,
            color: Vec3::from_array(record.color),
            glow: record.glow != 0.0,
            no_shadow: record.no_shadow != 0.0,
        }
    }
}
