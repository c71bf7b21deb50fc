//! Index-width adapters
//!
//! The codec core works on a single canonical index width (`u32`). Renderers
//! that keep 16-bit index buffers go through these adapters, which copy to
//! and from a scratch wide buffer at the call boundary and free it on scope
//! exit. The stream format is identical either way: a buffer encoded from
//! `u16` indices decodes into `u32` and vice versa.

use crate::error::{DecodeError, EncodeError};
use crate::indexcodec::{decode_index_buffer, encode_index_buffer};

/// Encode a 16-bit triangle index buffer
///
/// Widens the indices into a temporary canonical buffer and defers to
/// [`encode_index_buffer`]; see it for the contract.
///
/// # Panics
/// Panics if `indices.len()` is not a multiple of 3.
pub fn encode_index_buffer_u16(
    destination: &mut [u8],
    indices: &[u16],
    vertex_count: u32,
) -> Result<usize, EncodeError> {
    let wide: Vec<u32> = indices.iter().map(|&i| u32::from(i)).collect();
    encode_index_buffer(destination, &wide, vertex_count)
}

/// Decode an index stream into a 16-bit destination
///
/// Decodes through a temporary canonical buffer and narrows. A
/// `vertex_count` that cannot be addressed by 16-bit indices is rejected
/// up front as [`DecodeError::ShapeMismatch`], so the narrowing itself can
/// never truncate.
pub fn decode_index_buffer_u16(
    destination: &mut [u16],
    vertex_count: u32,
    buffer: &[u8],
) -> Result<(), DecodeError> {
    if u64::from(vertex_count) > u64::from(u16::MAX) + 1 {
        return Err(DecodeError::ShapeMismatch);
    }

    let mut wide = vec![0u32; destination.len()];
    decode_index_buffer(&mut wide, vertex_count, buffer)?;
    for (narrow, &index) in destination.iter_mut().zip(&wide) {
        *narrow = index as u16;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexcodec::encode_index_buffer_bound;

    #[test]
    fn test_u16_roundtrip() {
        let indices: Vec<u16> = vec![0, 1, 2, 2, 1, 3, 3, 1, 4];
        let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), 5)];
        let size = encode_index_buffer_u16(&mut encoded, &indices, 5).unwrap();

        let mut decoded = vec![0u16; indices.len()];
        decode_index_buffer_u16(&mut decoded, 5, &encoded[..size]).unwrap();
        assert_eq!(decoded, indices);
    }

    #[test]
    fn test_u16_stream_decodes_as_u32() {
        // The stream format is width-agnostic
        let indices: Vec<u16> = vec![10, 11, 12];
        let mut encoded = vec![0u8; encode_index_buffer_bound(3, 13)];
        let size = encode_index_buffer_u16(&mut encoded, &indices, 13).unwrap();

        let mut wide = [0u32; 3];
        decode_index_buffer(&mut wide, 13, &encoded[..size]).unwrap();
        assert_eq!(wide, [10, 11, 12]);
    }

    #[test]
    fn test_u16_rejects_unaddressable_vertex_count() {
        let mut decoded = [0u16; 3];
        assert_eq!(
            decode_index_buffer_u16(&mut decoded, 0x20000, &[]),
            Err(DecodeError::ShapeMismatch)
        );
    }

    #[test]
    fn test_u16_full_range() {
        // 65536 vertices is exactly addressable
        let indices: Vec<u16> = vec![0, u16::MAX, 1];
        let mut encoded = vec![0u8; encode_index_buffer_bound(3, 0x10000)];
        let size = encode_index_buffer_u16(&mut encoded, &indices, 0x10000).unwrap();

        let mut decoded = [0u16; 3];
        decode_index_buffer_u16(&mut decoded, 0x10000, &encoded[..size]).unwrap();
        assert_eq!(decoded, [0, u16::MAX, 1]);
    }
}
