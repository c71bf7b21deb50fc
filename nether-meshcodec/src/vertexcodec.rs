//! Vertex buffer codec
//!
//! Compresses fixed-stride vertex records without interpreting them. Records
//! are processed in blocks of 16; within a block each of the `vertex_size`
//! byte offsets forms an independent lane. A lane stores the zig-zag mapped
//! wrapping deltas between consecutive records' bytes, bit-packed at the
//! smallest width that covers the whole block, behind a one-byte width
//! header. A lane that is constant across a block therefore costs a single
//! byte.
//!
//! Spatially coherent, cache-optimized meshes put similar attribute values
//! in consecutive records, which is exactly what keeps the per-block widths
//! small. The transform is exact for any input: floats, packed integers, or
//! arbitrary bits all round-trip unchanged.

use crate::bitstream::{
    BitReader, BitWriter, ByteReader, ByteWriter, read_varint, unzigzag8, varint_len,
    write_varint, zigzag8,
};
use crate::error::{DecodeError, EncodeError};
use crate::{VERTEX_BLOCK_SIZE, VERTEX_STREAM_TAG};

/// Widest residual a lane block can need; control bytes above this are
/// reserved
const MAX_LANE_WIDTH: u8 = 8;

/// Worst-case encoded size for `vertex_count` records of `vertex_size` bytes
///
/// One width byte per lane per block plus uncompressed residuals; always at
/// least the raw buffer size, so allocating against it is safe for any
/// input.
pub fn encode_vertex_buffer_bound(vertex_count: usize, vertex_size: usize) -> usize {
    let blocks = vertex_count.div_ceil(VERTEX_BLOCK_SIZE);
    let header = 1 + varint_len(vertex_count as u64) + varint_len(vertex_size as u64);

    header + blocks * vertex_size + vertex_count * vertex_size
}

/// Encode a vertex buffer into `destination`
///
/// Returns the number of bytes written. The encoding is lossless for every
/// byte of every record regardless of what the bytes mean.
///
/// # Arguments
/// * `destination` - Caller-allocated output, sized via
///   [`encode_vertex_buffer_bound`]
/// * `vertices` - `vertex_count * vertex_size` bytes of fixed-stride records
/// * `vertex_count` - Number of records
/// * `vertex_size` - Bytes per record
///
/// # Errors
/// [`EncodeError::DestinationTooSmall`] if `destination` cannot hold the
/// stream.
///
/// # Panics
/// Panics if `vertices.len() != vertex_count * vertex_size`.
pub fn encode_vertex_buffer(
    destination: &mut [u8],
    vertices: &[u8],
    vertex_count: usize,
    vertex_size: usize,
) -> Result<usize, EncodeError> {
    assert_eq!(
        vertices.len(),
        vertex_count * vertex_size,
        "vertex buffer length must equal vertex_count * vertex_size"
    );

    let mut w = ByteWriter::new(destination);
    w.put_u8(VERTEX_STREAM_TAG)?;
    write_varint(&mut w, vertex_count as u64)?;
    write_varint(&mut w, vertex_size as u64)?;

    let mut residuals = [0u8; VERTEX_BLOCK_SIZE];

    for block_start in (0..vertex_count).step_by(VERTEX_BLOCK_SIZE) {
        let block_len = VERTEX_BLOCK_SIZE.min(vertex_count - block_start);
        for lane in 0..vertex_size {
            let mut max_residual = 0u8;
            for (i, residual) in residuals.iter_mut().enumerate().take(block_len) {
                let record = block_start + i;
                let cur = vertices[record * vertex_size + lane];
                // Lane state carries across blocks: the baseline is the same
                // lane of the previous record, zero for the very first one.
                let prev = if record == 0 {
                    0
                } else {
                    vertices[(record - 1) * vertex_size + lane]
                };
                *residual = zigzag8(cur.wrapping_sub(prev) as i8);
                max_residual = max_residual.max(*residual);
            }

            // Smallest width that fits every residual in the block
            let width = 8 - max_residual.leading_zeros();
            w.put_u8(width as u8)?;
            if width > 0 {
                let mut bits = BitWriter::new();
                for &residual in residuals.iter().take(block_len) {
                    bits.push(&mut w, residual, width)?;
                }
                bits.flush(&mut w)?;
            }
        }
    }

    Ok(w.position())
}

/// Decode a vertex stream produced by [`encode_vertex_buffer`]
///
/// Fills `destination`, which must be exactly `vertex_count * vertex_size`
/// bytes; nothing outside it is ever written.
///
/// # Errors
/// * [`DecodeError::InvalidFormatVersion`] - tag byte is not a vertex
///   stream this decoder understands
/// * [`DecodeError::ShapeMismatch`] - declared shape disagrees with the
///   stream header or with `destination.len()`
/// * [`DecodeError::CorruptStream`] - truncated stream, reserved lane
///   width, or trailing bytes
pub fn decode_vertex_buffer(
    destination: &mut [u8],
    vertex_count: usize,
    vertex_size: usize,
    buffer: &[u8],
) -> Result<(), DecodeError> {
    if destination.len() != vertex_count * vertex_size {
        return Err(DecodeError::ShapeMismatch);
    }

    let mut r = ByteReader::new(buffer);
    let tag = r.get_u8()?;
    if tag != VERTEX_STREAM_TAG {
        return Err(DecodeError::InvalidFormatVersion(tag));
    }
    if read_varint(&mut r)? != vertex_count as u64 {
        return Err(DecodeError::ShapeMismatch);
    }
    if read_varint(&mut r)? != vertex_size as u64 {
        return Err(DecodeError::ShapeMismatch);
    }

    for block_start in (0..vertex_count).step_by(VERTEX_BLOCK_SIZE) {
        let block_len = VERTEX_BLOCK_SIZE.min(vertex_count - block_start);
        for lane in 0..vertex_size {
            let width = r.get_u8()?;
            if width > MAX_LANE_WIDTH {
                return Err(DecodeError::CorruptStream);
            }
            // A fresh reader per lane discards the previous lane's padding
            let mut bits = BitReader::new();
            for i in 0..block_len {
                let record = block_start + i;
                let delta = unzigzag8(bits.pull(&mut r, u32::from(width))?);
                let prev = if record == 0 {
                    0
                } else {
                    destination[(record - 1) * vertex_size + lane]
                };
                destination[record * vertex_size + lane] = prev.wrapping_add(delta as u8);
            }
        }
    }

    if !r.is_empty() {
        return Err(DecodeError::CorruptStream);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
