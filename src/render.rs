//! Per-worker render loop. A worker's unit of work is one row band of
//! one frame: a pure function of its input buffers, writing only into
//! its own disjoint slice of the shared output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;

use crate::dispatch::FrameBuffer;
use crate::snapshot::{LightRecord, SceneSnapshot, SnapshotError};
use crate::surfaces::{BakedSurface, Hit};

/// Pulled back from a shadow ray's reach so a light never occludes
/// itself against the surface it is illuminating.
pub const SHADOW_EPSILON: f32 = 1e-3;

/// One dispatched band: everything a worker needs, including the shared
/// frame counter and output handles.
pub struct RenderJob {
    pub row_start: u32,
    pub row_end: u32,
    pub width: u32,
    pub height: u32,
    pub projection_distance: f32,
    pub snapshot: Arc<SceneSnapshot>,
    pub frame_id: u64,
    pub frame_counter: Arc<AtomicU64>,
    pub output: Arc<FrameBuffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandOutcome {
    /// The band was rendered and written in full.
    Rendered,
    /// The job was superseded before it began; nothing was written.
    Stale,
}

/// Render one row band, or abort without touching the output.
///
/// The freshness check runs once, before any pixel work: if the shared
/// counter has moved past this job's frame id, a newer frame was
/// requested and this band's output would be discarded anyway. A job
/// that passes the check runs to completion, so a band region is always
/// written whole by a single frame or not at all.
pub fn render_band(job: &RenderJob) -> Result<BandOutcome, SnapshotError> {
    if job.frame_counter.load(Ordering::Acquire) != job.frame_id {
        return Ok(BandOutcome::Stale);
    }

    // Per-worker parse of the flat table; nothing here is shared or
    // mutated across threads.
    let surfaces = job
        .snapshot
        .surfaces
        .iter()
        .map(|(tag, record)| BakedSurface::from_record(tag, record))
        .collect::<Result<Vec<_>, _>>()?;
    let lights = &job.snapshot.lights;

    let half_width = job.width as f32 / 2.0;
    let half_height = job.height as f32 / 2.0;
    let stride = job.width as usize * 4;

    // SAFETY: the dispatcher hands every worker a distinct row range, so
    // this band slice never overlaps another live writer of this frame.
    let band = unsafe { job.output.band_mut(job.row_start, job.row_end) };

    for y in job.row_start..job.row_end {
        let row = &mut band[(y - job.row_start) as usize * stride..][..stride];
        for x in 0..job.width {
            // Ray through the camera (origin) and this pixel on the
            // image plane
            let direction = Vec3::new(
                x as f32 - half_width,
                half_height - y as f32,
                job.projection_distance,
            )
            .normalize();

            let pixel = &mut row[x as usize * 4..][..4];
            pixel.copy_from_slice(&shade(&surfaces, lights, direction));
        }
    }

    Ok(BandOutcome::Rendered)
}

/// Shade one primary ray into an RGBA pixel.
fn shade(surfaces: &[BakedSurface], lights: &[LightRecord], direction: Vec3) -> [u8; 4] {
    let Some((index, hit)) = nearest_hit(surfaces, Vec3::ZERO, direction) else {
        return [0, 0, 0, 0xff];
    };
    let surface = &surfaces[index];

    // Glow surfaces emit their flat color, no lighting
    if surface.glow() {
        return to_rgba(surface.color());
    }

    let mut color = Vec3::ZERO;
    for light in lights {
        let light_pos = Vec3::from_array(light.position);
        let offset = hit.point - light_pos;
        let distance = offset.length();
        if distance <= SHADOW_EPSILON {
            continue;
        }
        let incoming = offset / distance;

        if occluded(surfaces, index, light_pos, incoming, distance) {
            continue;
        }

        let facing = hit.normal.dot(incoming);
        if facing >= 0.0 {
            // Light behind the surface
            continue;
        }

        color += surface.color() * Vec3::from_array(light.color) * (-facing / (distance * distance));
    }

    to_rgba(color)
}

/// Linear scan for the globally nearest hit.
fn nearest_hit(surfaces: &[BakedSurface], origin: Vec3, direction: Vec3) -> Option<(usize, Hit)> {
    let mut nearest = None;
    let mut t_max = f32::INFINITY;

    for (index, surface) in surfaces.iter().enumerate() {
        if let Some(hit) = surface.intersect(origin, direction, t_max, false) {
            t_max = hit.t;
            nearest = Some((index, hit));
        }
    }

    nearest
}

/// Shadow test: cast from the light toward the lit point and look for
/// anything in between, skipping the lit surface itself and surfaces
/// excluded from occlusion.
fn occluded(
    surfaces: &[BakedSurface],
    lit_index: usize,
    light_pos: Vec3,
    incoming: Vec3,
    distance: f32,
) -> bool {
    let reach = distance - SHADOW_EPSILON;
    surfaces.iter().enumerate().any(|(index, surface)| {
        index != lit_index
            && !surface.no_shadow()
            && surface.intersect(light_pos, incoming, reach, false).is_some()
    })
}

fn to_rgba(color: Vec3) -> [u8; 4] {
    [
        (color.x * 255.0).clamp(0.0, 255.0) as u8,
        (color.y * 255.0).clamp(0.0, 255.0) as u8,
        (color.z * 255.0).clamp(0.0, 255.0) as u8,
        0xff,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SurfaceBuffer;
    use crate::surfaces::Sphere;
    use glam::Mat3;

    fn sphere_snapshot(glow: bool) -> Arc<SceneSnapshot> {
        let mut sphere = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 5.0, Vec3::new(0.2, 0.9, 0.4));
        sphere.glow = glow;
        let baked = sphere.bake(Vec3::ZERO, Vec3::ZERO, Mat3::IDENTITY);

        let mut surfaces = SurfaceBuffer::new();
        surfaces.push(crate::snapshot::SPHERE_TAG, baked.record());
        Arc::new(SceneSnapshot {
            surfaces,
            lights: vec![crate::snapshot::LightRecord {
                position: [0.0, 0.0, -10.0],
                color: [300.0, 300.0, 300.0],
            }],
        })
    }

    fn job_for(snapshot: Arc<SceneSnapshot>, frame_id: u64, counter: u64) -> RenderJob {
        let output = FrameBuffer::new(4, 4);
        RenderJob {
            row_start: 0,
            row_end: 4,
            width: 4,
            height: 4,
            projection_distance: 2.0,
            snapshot,
            frame_id,
            frame_counter: Arc::new(AtomicU64::new(counter)),
            output,
        }
    }

    #[test]
    fn fresh_band_renders_in_full() {
        let job = job_for(sphere_snapshot(true), 1, 1);
        assert_eq!(render_band(&job).unwrap(), BandOutcome::Rendered);

        let pixels = job.output.pixels();
        // Center rays hit the glow sphere: exact flat color
        let center = (2 * 4 + 2) * 4;
        assert_eq!(&pixels[center..center + 4], &[51, 229, 102, 0xff]);
        // Every alpha byte is opaque
        assert!(pixels.chunks_exact(4).all(|px| px[3] == 0xff));
    }

    #[test]
    fn superseded_band_writes_nothing() {
        // The counter moved past this job's frame before it started
        let job = job_for(sphere_snapshot(true), 1, 2);
        assert_eq!(render_band(&job).unwrap(), BandOutcome::Stale);

        let untouched = FrameBuffer::new(4, 4);
        assert_eq!(job.output.pixels(), untouched.pixels());
    }

    #[test]
    fn lit_sphere_is_brighter_toward_the_light() {
        let job = job_for(sphere_snapshot(false), 1, 1);
        render_band(&job).unwrap();

        let pixels = job.output.pixels();
        let center = (2 * 4 + 2) * 4;
        // Shaded, not the flat glow color, and green-dominant
        assert!(pixels[center + 1] > 0);
        assert!(pixels[center + 1] > pixels[center]);
        assert_ne!(&pixels[center..center + 3], &[51, 229, 102]);
    }

    #[test]
    fn unknown_tag_aborts_the_job() {
        let mut snapshot = (*sphere_snapshot(false)).clone();
        let record = *snapshot.surfaces.record(0);
        snapshot.surfaces.push(77, record);

        let job = job_for(Arc::new(snapshot), 1, 1);
        assert_eq!(render_band(&job), Err(SnapshotError::UnknownTag(77)));

        // Aborted before any pixel was touched
        let untouched = FrameBuffer::new(4, 4);
        assert_eq!(job.output.pixels(), untouched.pixels());
    }
}
