//! Index buffer codec
//!
//! Compresses triangle index streams by exploiting the edge and vertex reuse
//! between consecutive triangles that a cache-optimized ordering produces.
//! Both sides simulate the same two bounded FIFOs - a 16-entry edge history
//! and a 16-entry vertex history - and the operation-code stream drives the
//! decoder's replay, so encoder and decoder state evolve in lockstep.
//!
//! # Triangle record format
//!
//! ```text
//! op byte, high nibble h / low nibble l:
//!   h = 0..2   edge hit on the newest history entry, rotation h;
//!              l encodes the third vertex: 0x0-0xD vertex-history slot,
//!              0xE "next" (last + 1), 0xF the edge's stored opposite
//!              vertex. One byte total.
//!   h = 4..6   edge hit, rotation h - 4, l = edge-history slot; followed
//!              by a vertex byte: 0x00-0x0F history slot, 0x10 zig-zag
//!              delta varint, 0x11 "next", 0x12 opposite.
//!   0xF0       no edge matched; three zig-zag delta varints follow.
//! ```
//!
//! Every unassigned op or vertex byte value is reserved and rejected on
//! decode. The rotation nibble records which of the triangle's three edges
//! matched, so the decoder reproduces the original index order exactly
//! rather than a rotated equivalent.

use crate::bitstream::{
    ByteReader, ByteWriter, read_varint, unzigzag, varint_len, write_varint, zigzag,
};
use crate::error::{DecodeError, EncodeError};
use crate::{EDGE_HISTORY_SIZE, INDEX_STREAM_TAG, VERTEX_HISTORY_SIZE};

const OP_MISS: u8 = 0xF0;
const OP_LONG_BASE: u8 = 4;

// Compact third-vertex codes (low nibble of a one-byte hit)
const COMPACT_FIFO_MAX: u8 = 0xD;
const COMPACT_NEXT: u8 = 0xE;
const COMPACT_OPPOSITE: u8 = 0xF;

// Long-form third-vertex codes (dedicated byte after the op)
const VERTEX_FIFO_MAX: u8 = 0x0F;
const VERTEX_DELTA: u8 = 0x10;
const VERTEX_NEXT: u8 = 0x11;
const VERTEX_OPPOSITE: u8 = 0x12;

// =============================================================================
// History FIFOs
// =============================================================================

/// Ring buffer of the 16 most recent directed edges, each carrying the
/// opposite vertex of the triangle that emitted it. Slot 0 is the newest
/// entry; eviction is by overwrite.
struct EdgeHistory {
    entries: [(u32, u32, u32); EDGE_HISTORY_SIZE],
    head: usize,
    len: usize,
}

impl EdgeHistory {
    fn new() -> Self {
        Self {
            entries: [(0, 0, 0); EDGE_HISTORY_SIZE],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, a: u32, b: u32, opposite: u32) {
        self.entries[self.head] = (a, b, opposite);
        self.head = (self.head + 1) % EDGE_HISTORY_SIZE;
        self.len = (self.len + 1).min(EDGE_HISTORY_SIZE);
    }

    /// Entry at `slot`, 0 = newest
    fn get(&self, slot: usize) -> Option<(u32, u32, u32)> {
        if slot >= self.len {
            return None;
        }
        let idx = (self.head + EDGE_HISTORY_SIZE - 1 - slot) % EDGE_HISTORY_SIZE;
        Some(self.entries[idx])
    }

    /// Newest slot holding the directed edge (a, b), with its opposite vertex
    fn find(&self, a: u32, b: u32) -> Option<(usize, u32)> {
        (0..self.len).find_map(|slot| {
            let (ea, eb, opposite) = self.get(slot)?;
            (ea == a && eb == b).then_some((slot, opposite))
        })
    }
}

/// Ring buffer of the 16 most recently introduced vertex indices, duplicates
/// suppressed at push time. Slot 0 is the newest entry.
struct VertexHistory {
    entries: [u32; VERTEX_HISTORY_SIZE],
    head: usize,
    len: usize,
}

impl VertexHistory {
    fn new() -> Self {
        Self {
            entries: [0; VERTEX_HISTORY_SIZE],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, v: u32) {
        self.entries[self.head] = v;
        self.head = (self.head + 1) % VERTEX_HISTORY_SIZE;
        self.len = (self.len + 1).min(VERTEX_HISTORY_SIZE);
    }

    fn get(&self, slot: usize) -> Option<u32> {
        if slot >= self.len {
            return None;
        }
        let idx = (self.head + VERTEX_HISTORY_SIZE - 1 - slot) % VERTEX_HISTORY_SIZE;
        Some(self.entries[idx])
    }

    fn slot_of(&self, v: u32) -> Option<usize> {
        (0..self.len).find(|&slot| self.get(slot) == Some(v))
    }
}

/// Advance both histories past an emitted triangle. The decoder runs the
/// identical update, which is what keeps the FIFOs in lockstep.
fn push_triangle(edges: &mut EdgeHistory, verts: &mut VertexHistory, a: u32, b: u32, c: u32) {
    // A consistently wound neighbor traverses a shared edge in the opposite
    // direction, so edges are stored reversed to make its probe an exact match.
    edges.push(b, a, c);
    edges.push(c, b, a);
    edges.push(a, c, b);
    for v in [a, b, c] {
        if verts.slot_of(v).is_none() {
            verts.push(v);
        }
    }
}

/// Rotation r of triangle (a, b, c): the edge under test first, then the
/// vertex opposite it
fn rotate(r: u8, a: u32, b: u32, c: u32) -> (u32, u32, u32) {
    match r {
        0 => (a, b, c),
        1 => (b, c, a),
        _ => (c, a, b),
    }
}

/// Undo [`rotate`]: reassemble (a, b, c) from a matched edge and its third
/// vertex so the decoder reproduces the original index order
fn rotate_back(r: u8, p: u32, q: u32, v: u32) -> (u32, u32, u32) {
    match r {
        0 => (p, q, v),
        1 => (v, p, q),
        _ => (q, v, p),
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Worst-case encoded size for an index buffer of `index_count` indices over
/// `vertex_count` vertices
///
/// Computed from the miss-case record (op byte plus three worst-case delta
/// varints) plus the stream header, so a destination of this size never
/// fails with [`EncodeError::DestinationTooSmall`].
///
/// # Panics
/// Panics if `index_count` is not a multiple of 3.
pub fn encode_index_buffer_bound(index_count: usize, vertex_count: u32) -> usize {
    assert!(
        index_count.is_multiple_of(3),
        "index count must be a multiple of 3"
    );
    let triangle_count = index_count / 3;
    let worst_delta = varint_len(zigzag(i64::from(vertex_count.saturating_sub(1))));
    let header = 1 + varint_len(u64::from(vertex_count)) + varint_len(triangle_count as u64);

    header + triangle_count * (1 + 3 * worst_delta)
}

/// Encode a triangle index buffer into `destination`
///
/// Returns the number of bytes written. Adjacent triangles sharing edges
/// with earlier ones (the normal case after vertex-cache optimization)
/// encode in one or two bytes; isolated triangles fall back to delta
/// varints. Input order is preserved exactly by the decoder.
///
/// # Arguments
/// * `destination` - Caller-allocated output, sized via
///   [`encode_index_buffer_bound`]
/// * `indices` - Triangle list, three indices per triangle
/// * `vertex_count` - Number of vertices the indices address; every index
///   must be below it
///
/// # Errors
/// [`EncodeError::DestinationTooSmall`] if `destination` cannot hold the
/// stream. The partial fill is abandoned; `indices` is untouched.
///
/// # Panics
/// Panics if `indices.len()` is not a multiple of 3.
pub fn encode_index_buffer(
    destination: &mut [u8],
    indices: &[u32],
    vertex_count: u32,
) -> Result<usize, EncodeError> {
    assert!(
        indices.len().is_multiple_of(3),
        "index count must be a multiple of 3"
    );
    debug_assert!(indices.iter().all(|&i| i < vertex_count));

    let mut w = ByteWriter::new(destination);
    w.put_u8(INDEX_STREAM_TAG)?;
    write_varint(&mut w, u64::from(vertex_count))?;
    write_varint(&mut w, (indices.len() / 3) as u64)?;

    let mut edges = EdgeHistory::new();
    let mut verts = VertexHistory::new();
    let mut last = 0u32;

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        encode_triangle(&mut w, a, b, c, &mut last, &edges, &verts)?;
        push_triangle(&mut edges, &mut verts, a, b, c);
    }

    Ok(w.position())
}

fn encode_triangle(
    w: &mut ByteWriter<'_>,
    a: u32,
    b: u32,
    c: u32,
    last: &mut u32,
    edges: &EdgeHistory,
    verts: &VertexHistory,
) -> Result<(), EncodeError> {
    // Probe all three rotations and keep the hit on the newest slot; ties go
    // to the lowest rotation. The decoder never probes, so only the slot
    // numbering has to agree.
    let mut hit: Option<(u8, usize, u32, u32)> = None;
    for r in 0..3u8 {
        let (p, q, v) = rotate(r, a, b, c);
        if let Some((slot, opposite)) = edges.find(p, q)
            && hit.is_none_or(|(_, best, _, _)| slot < best)
        {
            hit = Some((r, slot, v, opposite));
        }
    }

    let Some((r, slot, v, opposite)) = hit else {
        w.put_u8(OP_MISS)?;
        for v in [a, b, c] {
            let delta = i64::from(v) - i64::from(*last);
            *last = v;
            write_varint(w, zigzag(delta))?;
        }
        return Ok(());
    };

    let fifo_slot = verts.slot_of(v);
    let is_next = u64::from(v) == u64::from(*last) + 1;

    if slot == 0 {
        if v == opposite {
            return w.put_u8((r << 4) | COMPACT_OPPOSITE);
        }
        if let Some(k) = fifo_slot
            && k as u8 <= COMPACT_FIFO_MAX
        {
            return w.put_u8((r << 4) | k as u8);
        }
        if is_next {
            *last = v;
            return w.put_u8((r << 4) | COMPACT_NEXT);
        }
    }

    w.put_u8(((OP_LONG_BASE + r) << 4) | slot as u8)?;
    if v == opposite {
        w.put_u8(VERTEX_OPPOSITE)
    } else if let Some(k) = fifo_slot {
        w.put_u8(k as u8)
    } else if is_next {
        *last = v;
        w.put_u8(VERTEX_NEXT)
    } else {
        w.put_u8(VERTEX_DELTA)?;
        let delta = i64::from(v) - i64::from(*last);
        *last = v;
        write_varint(w, zigzag(delta))
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode an index stream produced by [`encode_index_buffer`]
///
/// Replays the encoder's FIFO simulation from the operation codes, filling
/// `destination` (whose length is the expected index count). Every
/// reconstructed index is validated against `vertex_count` before it is
/// written; the stream is never trusted.
///
/// # Errors
/// * [`DecodeError::InvalidFormatVersion`] - tag byte is not an index
///   stream this decoder understands
/// * [`DecodeError::ShapeMismatch`] - `destination.len()` or `vertex_count`
///   disagree with the stream header
/// * [`DecodeError::CorruptStream`] - truncated stream, reserved code, an
///   out-of-range index, or trailing bytes
pub fn decode_index_buffer(
    destination: &mut [u32],
    vertex_count: u32,
    buffer: &[u8],
) -> Result<(), DecodeError> {
    if !destination.len().is_multiple_of(3) {
        return Err(DecodeError::ShapeMismatch);
    }

    let mut r = ByteReader::new(buffer);
    let tag = r.get_u8()?;
    if tag != INDEX_STREAM_TAG {
        return Err(DecodeError::InvalidFormatVersion(tag));
    }
    if read_varint(&mut r)? != u64::from(vertex_count) {
        return Err(DecodeError::ShapeMismatch);
    }
    if read_varint(&mut r)? != (destination.len() / 3) as u64 {
        return Err(DecodeError::ShapeMismatch);
    }

    let mut edges = EdgeHistory::new();
    let mut verts = VertexHistory::new();
    let mut last = 0u32;

    for tri in destination.chunks_exact_mut(3) {
        let (a, b, c) = decode_triangle(&mut r, &mut last, &edges, &verts, vertex_count)?;
        if a >= vertex_count || b >= vertex_count || c >= vertex_count {
            return Err(DecodeError::CorruptStream);
        }
        tri[0] = a;
        tri[1] = b;
        tri[2] = c;
        push_triangle(&mut edges, &mut verts, a, b, c);
    }

    if !r.is_empty() {
        return Err(DecodeError::CorruptStream);
    }
    Ok(())
}

fn decode_triangle(
    r: &mut ByteReader<'_>,
    last: &mut u32,
    edges: &EdgeHistory,
    verts: &VertexHistory,
    vertex_count: u32,
) -> Result<(u32, u32, u32), DecodeError> {
    let op = r.get_u8()?;
    let hi = op >> 4;
    let lo = op & 0x0F;

    if hi <= 2 {
        let (p, q, opposite) = edges.get(0).ok_or(DecodeError::CorruptStream)?;
        let v = match lo {
            COMPACT_NEXT => next_vertex(last, vertex_count)?,
            COMPACT_OPPOSITE => opposite,
            k => verts.get(k as usize).ok_or(DecodeError::CorruptStream)?,
        };
        return Ok(rotate_back(hi, p, q, v));
    }

    if (OP_LONG_BASE..OP_LONG_BASE + 3).contains(&hi) {
        let (p, q, opposite) = edges.get(lo as usize).ok_or(DecodeError::CorruptStream)?;
        let code = r.get_u8()?;
        let v = match code {
            0x00..=VERTEX_FIFO_MAX => verts
                .get(code as usize)
                .ok_or(DecodeError::CorruptStream)?,
            VERTEX_DELTA => delta_vertex(r, last, vertex_count)?,
            VERTEX_NEXT => next_vertex(last, vertex_count)?,
            VERTEX_OPPOSITE => opposite,
            _ => return Err(DecodeError::CorruptStream),
        };
        return Ok(rotate_back(hi - OP_LONG_BASE, p, q, v));
    }

    if op == OP_MISS {
        let a = delta_vertex(r, last, vertex_count)?;
        let b = delta_vertex(r, last, vertex_count)?;
        let c = delta_vertex(r, last, vertex_count)?;
        return Ok((a, b, c));
    }

    Err(DecodeError::CorruptStream)
}

fn delta_vertex(
    r: &mut ByteReader<'_>,
    last: &mut u32,
    vertex_count: u32,
) -> Result<u32, DecodeError> {
    let delta = unzigzag(read_varint(r)?);
    let v = i64::from(*last)
        .checked_add(delta)
        .ok_or(DecodeError::CorruptStream)?;
    if v < 0 || v >= i64::from(vertex_count) {
        return Err(DecodeError::CorruptStream);
    }
    *last = v as u32;
    Ok(*last)
}

fn next_vertex(last: &mut u32, vertex_count: u32) -> Result<u32, DecodeError> {
    let v = u64::from(*last) + 1;
    if v >= u64::from(vertex_count) {
        return Err(DecodeError::CorruptStream);
    }
    *last = v as u32;
    Ok(*last)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(indices: &[u32], vertex_count: u32) -> usize {
        let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), vertex_count)];
        let size = encode_index_buffer(&mut encoded, indices, vertex_count).unwrap();
        assert!(size <= encoded.len());

        let mut decoded = vec![0u32; indices.len()];
        decode_index_buffer(&mut decoded, vertex_count, &encoded[..size]).unwrap();
        assert_eq!(decoded, indices);
        size
    }

    #[test]
    fn test_roundtrip_empty() {
        let size = roundtrip(&[], 0);
        assert_eq!(size, 3); // tag + two zero varints, no body
    }

    #[test]
    fn test_roundtrip_single_triangle() {
        roundtrip(&[0, 1, 2], 3);
        roundtrip(&[2, 1, 0], 3);
        roundtrip(&[7, 7, 7], 8); // degenerate triangles are data too
    }

    #[test]
    fn test_roundtrip_strip_order() {
        // Marching strip: triangle i shares an edge with triangle i - 1
        let mut indices = Vec::new();
        for i in 0..100u32 {
            if i % 2 == 0 {
                indices.extend_from_slice(&[i, i + 1, i + 2]);
            } else {
                indices.extend_from_slice(&[i + 1, i, i + 2]);
            }
        }
        let size = roundtrip(&indices, 102);

        // The hit path keeps a coherent mesh under 2 bytes/triangle
        assert!(
            size < 2 * 100,
            "strip encoded to {} bytes, expected < 200",
            size
        );
    }

    #[test]
    fn test_roundtrip_double_sided() {
        // Back face reuses all three edges; opposite-vertex code is 1 byte
        let size = roundtrip(&[0, 1, 2, 0, 2, 1], 3);
        assert_eq!(size, 8);
    }

    #[test]
    fn test_roundtrip_random_order() {
        // No adjacency at all still round-trips, just bigger
        let indices: Vec<u32> = (0..300u32)
            .map(|i| (i.wrapping_mul(2654435761)) % 1000)
            .collect();
        roundtrip(&indices, 1000);
    }

    #[test]
    fn test_bound_is_sound_for_adversarial_deltas() {
        // Alternating extremes maximize every delta varint
        let vertex_count = 1 << 20;
        let indices: Vec<u32> = (0..300)
            .map(|i| if i % 2 == 0 { 0 } else { vertex_count - 1 })
            .collect();
        let bound = encode_index_buffer_bound(indices.len(), vertex_count);
        let mut encoded = vec![0u8; bound];
        let size = encode_index_buffer(&mut encoded, &indices, vertex_count).unwrap();
        assert!(size <= bound, "size {} exceeds bound {}", size, bound);
    }

    #[test]
    fn test_encode_destination_too_small() {
        let indices = [0u32, 1, 2, 2, 1, 3];
        let mut tiny = [0u8; 4];
        assert_eq!(
            encode_index_buffer(&mut tiny, &indices, 4),
            Err(EncodeError::DestinationTooSmall)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_tag() {
        let mut out = [0u32; 3];
        assert_eq!(
            decode_index_buffer(&mut out, 3, &[0x00, 3, 1]),
            Err(DecodeError::InvalidFormatVersion(0x00))
        );
    }

    #[test]
    fn test_decode_rejects_shape_mismatch() {
        let indices = [0u32, 1, 2];
        let mut encoded = vec![0u8; encode_index_buffer_bound(3, 3)];
        let size = encode_index_buffer(&mut encoded, &indices, 3).unwrap();

        let mut out = [0u32; 3];
        // Declared vertex_count disagrees with the stream header
        assert_eq!(
            decode_index_buffer(&mut out, 4, &encoded[..size]),
            Err(DecodeError::ShapeMismatch)
        );
        // Declared index_count disagrees too
        let mut six = [0u32; 6];
        assert_eq!(
            decode_index_buffer(&mut six, 3, &encoded[..size]),
            Err(DecodeError::ShapeMismatch)
        );
        // Non-triangle destination length
        let mut four = [0u32; 4];
        assert_eq!(
            decode_index_buffer(&mut four, 3, &encoded[..size]),
            Err(DecodeError::ShapeMismatch)
        );
    }

    #[test]
    fn test_decode_rejects_reserved_op() {
        // hi nibble 3 is unassigned
        let stream = [INDEX_STREAM_TAG, 3, 1, 0x30];
        let mut out = [0u32; 3];
        assert_eq!(
            decode_index_buffer(&mut out, 3, &stream),
            Err(DecodeError::CorruptStream)
        );
    }

    #[test]
    fn test_decode_rejects_out_of_range_index() {
        // Miss record whose first delta lands outside the vertex range
        let stream = [INDEX_STREAM_TAG, 2, 1, OP_MISS, 10, 0, 0];
        let mut out = [0u32; 3];
        assert_eq!(
            decode_index_buffer(&mut out, 2, &stream),
            Err(DecodeError::CorruptStream)
        );
    }

    #[test]
    fn test_decode_rejects_edge_ref_before_any_triangle() {
        // Compact hit as the very first record: the edge history is empty
        let stream = [INDEX_STREAM_TAG, 3, 1, 0x0F];
        let mut out = [0u32; 3];
        assert_eq!(
            decode_index_buffer(&mut out, 3, &stream),
            Err(DecodeError::CorruptStream)
        );
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let mut indices = Vec::new();
        for i in 0..20u32 {
            indices.extend_from_slice(&[i, i + 1, i + 2]);
        }
        let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), 22)];
        let size = encode_index_buffer(&mut encoded, &indices, 22).unwrap();

        let mut out = vec![0u32; indices.len()];
        for cut in 1..=size {
            let result = decode_index_buffer(&mut out, 22, &encoded[..size - cut]);
            assert!(result.is_err(), "truncation by {} decoded successfully", cut);
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let indices = [0u32, 1, 2];
        let mut encoded = vec![0u8; encode_index_buffer_bound(3, 3) + 1];
        let size = encode_index_buffer(&mut encoded, &indices, 3).unwrap();

        let mut out = [0u32; 3];
        assert_eq!(
            decode_index_buffer(&mut out, 3, &encoded[..size + 1]),
            Err(DecodeError::CorruptStream)
        );
    }

    #[test]
    fn test_history_eviction() {
        // More than 16 disjoint triangles cycle both FIFOs completely
        let indices: Vec<u32> = (0..32 * 3).collect();
        roundtrip(&indices, 32 * 3);
    }
}
