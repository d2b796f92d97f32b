//! Surface primitives in two representations: rich authoring-side types
//! owning world-space fields, and camera-space baked counterparts holding
//! the precomputed intersection coefficients that serialize into
//! [`crate::snapshot::SurfaceRecord`]s. The two are kept separate on
//! purpose; a bake is an explicit step, never shared mutation.

mod cylinder;
mod sphere;
mod triangle;

pub use cylinder::{BakedCylinder, Cylinder};
pub use sphere::{BakedSphere, Sphere};
pub use triangle::{BakedTriangle, Triangle};

use glam::{Mat3, Vec3};

use crate::snapshot::{SnapshotError, SurfaceRecord, CYLINDER_TAG, SPHERE_TAG, TRIANGLE_TAG};

/// A ray/surface intersection. `point = origin + t * direction`; the
/// normal always opposes the incoming ray direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// An authored surface, in coordinates local to its owning drawable.
#[derive(Debug, Clone)]
pub enum Surface {
    Triangle(Triangle),
    Sphere(Sphere),
    Cylinder(Cylinder),
}

impl Surface {
    /// Re-express the surface in the camera frame and precompute its
    /// intersection coefficients. `offset` is the owning drawable's world
    /// position. Baking the same inputs twice yields identical
    /// coefficients; nothing accumulates.
    pub fn bake(&self, offset: Vec3, camera_pos: Vec3, inverse_rotation: Mat3) -> BakedSurface {
        match self {
            Surface::Triangle(t) => {
                BakedSurface::Triangle(t.bake(offset, camera_pos, inverse_rotation))
            }
            Surface::Sphere(s) => BakedSurface::Sphere(s.bake(offset, camera_pos, inverse_rotation)),
            Surface::Cylinder(c) => {
                BakedSurface::Cylinder(c.bake(offset, camera_pos, inverse_rotation))
            }
        }
    }
}

/// A camera-space surface with precomputed coefficients.
#[derive(Debug, Clone, PartialEq)]
pub enum BakedSurface {
    Triangle(BakedTriangle),
    Sphere(BakedSphere),
    Cylinder(BakedCylinder),
}

impl BakedSurface {
    /// Nearest intersection with the ray, if any, in `(0, t_max)`.
    ///
    /// `plane_only` applies to triangles only: it accepts the ray/plane
    /// hit without the triangle-membership test, for queries where a
    /// surface must report its own plane distance.
    pub fn intersect(
        &self,
        origin: Vec3,
        direction: Vec3,
        t_max: f32,
        plane_only: bool,
    ) -> Option<Hit> {
        match self {
            BakedSurface::Triangle(t) => t.intersect(origin, direction, t_max, plane_only),
            BakedSurface::Sphere(s) => s.intersect(origin, direction, t_max),
            BakedSurface::Cylinder(c) => c.intersect(origin, direction, t_max),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            BakedSurface::Triangle(_) => TRIANGLE_TAG,
            BakedSurface::Sphere(_) => SPHERE_TAG,
            BakedSurface::Cylinder(_) => CYLINDER_TAG,
        }
    }

    pub fn record(&self) -> SurfaceRecord {
        match self {
            BakedSurface::Triangle(t) => t.record(),
            BakedSurface::Sphere(s) => s.record(),
            BakedSurface::Cylinder(c) => c.record(),
        }
    }

    /// Reconstruct from a tagged record. An unrecognized tag is a
    /// producer/consumer contract violation and aborts the render job.
    pub fn from_record(tag: u8, record: &SurfaceRecord) -> Result<Self, SnapshotError> {
        match tag {
            TRIANGLE_TAG => Ok(BakedSurface::Triangle(BakedTriangle::from_record(record))),
            SPHERE_TAG => Ok(BakedSurface::Sphere(BakedSphere::from_record(record))),
            CYLINDER_TAG => Ok(BakedSurface::Cylinder(BakedCylinder::from_record(record))),
            other => Err(SnapshotError::UnknownTag(other)),
        }
    }

    pub fn color(&self) -> Vec3 {
        match self {
            BakedSurface::Triangle(t) => t.color,
            BakedSurface::Sphere(s) => s.color,
            BakedSurface::Cylinder(c) => c.color,
        }
    }

    pub fn glow(&self) -> bool {
        match self {
            BakedSurface::Triangle(t) => t.glow,
            BakedSurface::Sphere(s) => s.glow,
            BakedSurface::Cylinder(c) => c.glow,
        }
    }

    pub fn no_shadow(&self) -> bool {
        match self {
            BakedSurface::Triangle(t) => t.no_shadow,
            BakedSurface::Sphere(s) => s.no_shadow,
            BakedSurface::Cylinder(c) => c.no_shadow,
        }
    }
}

/// World point -> camera frame, for a surface owned by a drawable at
/// `offset`.
pub(crate) fn to_camera(
    point: Vec3,
    offset: Vec3,
    camera_pos: Vec3,
    inverse_rotation: Mat3,
) -> Vec3 {
    inverse_rotation * (offset + point - camera_pos)
}

pub(crate) fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}
