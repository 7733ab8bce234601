//! Geometry content hashing for change detection
//!
//! Re-import compares the stored hash of each entity's geometry against the
//! freshly decoded one. The hash must be stable across process runs and
//! library upgrades (it is persisted in entity links), so it uses a fixed
//! FNV-1a 64 rather than a seeded hasher, and it must be independent of
//! textual formatting, so coordinates are snapped to a quantization lattice
//! before hashing: the hash changes iff a coordinate moves beyond the
//! quantum.

use super::Geometry;
use crate::types::GeometryKind;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

/// Default quantization step (one tenth of the round-trip tolerance)
pub const DEFAULT_QUANTUM: f64 = 1e-4;

/// Hash a geometry's quantized coordinate sequence
///
/// `quantum` is the lattice step; two geometries whose corresponding
/// coordinates all fall on the same lattice cells hash identically. The
/// geometry kind participates so an open chain and a ring over the same
/// vertices do not collide.
pub fn geometry_hash(geometry: &Geometry, quantum: f64) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;

    hash = fnv_byte(hash, kind_tag(geometry.kind));
    for p in &geometry.points {
        hash = fnv_i64(hash, quantize(p.x, quantum));
        hash = fnv_i64(hash, quantize(p.y, quantum));
        hash = fnv_i64(hash, quantize(p.z, quantum));
    }
    hash
}

fn kind_tag(kind: GeometryKind) -> u8 {
    match kind {
        GeometryKind::Point => 1,
        GeometryKind::Line => 2,
        GeometryKind::Polygon => 3,
    }
}

fn quantize(value: f64, quantum: f64) -> i64 {
    (value / quantum).round() as i64
}

fn fnv_byte(mut hash: u64, byte: u8) -> u64 {
    hash ^= byte as u64;
    hash = hash.wrapping_mul(FNV_PRIME);
    hash
}

fn fnv_i64(mut hash: u64, value: i64) -> u64 {
    for byte in value.to_le_bytes() {
        hash = fnv_byte(hash, byte);
    }
    hash
}
