//! Flat, per-frame scene representation shared read-only with the worker
//! pool. The authoring types in [`crate::surfaces`] bake into fixed-stride
//! records so a worker can locate any surface with one index multiply,
//! regardless of its type.

use std::mem;

use thiserror::Error;

/// Type tag for a triangle record.
pub const TRIANGLE_TAG: u8 = 1;
/// Type tag for a sphere record.
pub const SPHERE_TAG: u8 = 2;
/// Type tag for a cylinder record.
pub const CYLINDER_TAG: u8 = 3;

/// Float slots per surface record. Every record occupies the full stride;
/// slots a type does not use stay zero. Uniform stride trades space for
/// branch-free random access.
pub const RECORD_FLOATS: usize = 26;

/// One serialized surface in camera-relative coordinates.
///
/// Field use per type tag:
/// - triangle: `pos` = first vertex, `axis` = unit plane normal,
///   `scalar` = signed plane offset, plus the edge vectors and the four
///   precomputed barycentric-test scalars.
/// - sphere: `pos` = center, `scalar` = radius².
/// - cylinder: `pos` = base center, `axis` = unit axis direction,
///   `scalar` = radius², `height` = finite extent along the axis.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceRecord {
    pub color: [f32; 3],
    pub glow: f32,
    pub no_shadow: f32,
    pub pos: [f32; 3],
    pub axis: [f32; 3],
    pub scalar: f32,
    pub height: f32,
    pub edge1: [f32; 3],
    pub edge2: [f32; 3],
    pub dot11: f32,
    pub dot12: f32,
    pub dot22: f32,
    pub inv_denom: f32,
    pub _pad: [f32; 3],
}

/// One serialized light: camera-relative position plus an unclamped
/// per-channel radiant scale.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRecord {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Contract violations between the snapshot producer and a worker. Both
/// are fatal for the affected render job; neither is recovered from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("unknown surface type tag {0}")]
    UnknownTag(u8),
    #[error("declared surface count {declared} does not match buffer length {actual}")]
    CountMismatch { declared: u32, actual: usize },
}

/// Tagged table of surface records.
///
/// The tag array and the record array are always the same length and
/// index-aligned: tag `i` describes record `i`. The byte encoding
/// produced by [`SurfaceBuffer::to_bytes`] is:
///
/// ```text
/// [0..4)              u32 surface count (little endian)
/// [4..4+pad)          zero padding so the records stay 4-byte aligned
/// [4+pad..4+pad+n)    u8 type tags
/// [4+pad+n..end)      f32 records, 26 floats each
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceBuffer {
    tags: Vec<u8>,
    records: Vec<SurfaceRecord>,
}

impl SurfaceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tags: Vec::with_capacity(capacity),
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tag: u8, record: SurfaceRecord) {
        self.tags.push(tag);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tag(&self, index: usize) -> u8 {
        self.tags[index]
    }

    pub fn record(&self, index: usize) -> &SurfaceRecord {
        &self.records[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &SurfaceRecord)> {
        self.tags.iter().copied().zip(self.records.iter())
    }

    fn tag_padding(count: usize) -> usize {
        (4 - count % 4) % 4
    }

    /// Encode into the flat wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.tags.len();
        let pad = Self::tag_padding(count);
        let record_bytes: &[u8] = bytemuck::cast_slice(&self.records);

        let mut bytes = Vec::with_capacity(4 + count + pad + record_bytes.len());
        bytes.extend_from_slice(&(count as u32).to_le_bytes());
        bytes.extend_from_slice(&self.tags);
        bytes.resize(bytes.len() + pad, 0);
        bytes.extend_from_slice(record_bytes);
        bytes
    }

    /// Decode the flat wire layout, validating the declared count against
    /// the actual payload length and every type tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let header: [u8; 4] = match bytes.get(..4).and_then(|b| b.try_into().ok()) {
            Some(header) => header,
            None => {
                return Err(SnapshotError::CountMismatch {
                    declared: 0,
                    actual: bytes.len(),
                })
            }
        };
        let declared = u32::from_le_bytes(header);
        let count = declared as usize;
        let pad = Self::tag_padding(count);
        let record_size = mem::size_of::<SurfaceRecord>();
        let expected = 4 + count + pad + count * record_size;
        if bytes.len() != expected {
            return Err(SnapshotError::CountMismatch {
                declared,
                actual: bytes.len(),
            });
        }

        let tags = bytes[4..4 + count].to_vec();
        for &tag in &tags {
            if !(TRIANGLE_TAG..=CYLINDER_TAG).contains(&tag) {
                return Err(SnapshotError::UnknownTag(tag));
            }
        }

        let records = bytes[4 + count + pad..]
            .chunks_exact(record_size)
            .map(bytemuck::pod_read_unaligned)
            .collect();

        Ok(Self { tags, records })
    }
}

/// Immutable per-frame bake output: all surfaces and lights of a scene in
/// camera-relative coordinates. Built once by the dispatcher, then shared
/// read-only with every worker for the duration of the frame.
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    pub surfaces: SurfaceBuffer,
    pub lights: Vec<LightRecord>,
}
