//! Nether-MeshCodec: lossless buffer compression for GPU-ready meshes
//!
//! This crate compresses the two buffers a renderer uploads for an indexed
//! triangle mesh: the index buffer and the vertex buffer. Both codecs are
//! **lossless** - `decode(encode(x)) == x` byte for byte - and are tuned for
//! buffers that were previously reordered for vertex-cache locality. They
//! accept arbitrary buffers too; ordering only affects the compression ratio,
//! never correctness.
//!
//! The two codecs are independent: the index codec knows nothing about vertex
//! data and vice versa. Each call owns its own state, so concurrent calls on
//! disjoint buffers need no coordination.
//!
//! # Stream Formats
//!
//! ```text
//! Index stream:
//!   0x00: format tag (0xE1: index stream, version 1)
//!   var:  vertex_count (varint)
//!   var:  triangle_count (varint)
//!   var:  triangle records (op byte + optional vertex payload each)
//!
//! Vertex stream:
//!   0x00: format tag (0xD1: vertex stream, version 1)
//!   var:  vertex_count (varint)
//!   var:  vertex_size (varint)
//!   var:  blocks of 16 records; per byte lane: one bit-width control byte,
//!         then the block's zig-zag byte deltas packed at that width
//! ```
//!
//! # Compression
//!
//! A cache-optimized mesh encodes most triangles as a single op byte
//! (shared edge in the 16-entry edge history, third vertex predicted),
//! landing well under 2 bytes per triangle before general-purpose
//! compression. Vertex buffers shrink by whatever byte-lane coherence the
//! attribute layout exposes; worst case is bounded a little above the raw
//! size, never unbounded.
//!
//! # Sizing destination buffers
//!
//! Encoders write into caller-allocated buffers and fail with
//! [`EncodeError::DestinationTooSmall`] rather than allocating. Size the
//! destination once with [`encode_index_buffer_bound`] /
//! [`encode_vertex_buffer_bound`]; the bound is a guaranteed worst case for
//! the given shape.
//!
//! # Usage
//!
//! ```
//! use nether_meshcodec::{
//!     decode_index_buffer, encode_index_buffer, encode_index_buffer_bound,
//! };
//!
//! let indices = [0u32, 1, 2, 2, 1, 3];
//! let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), 4)];
//! let size = encode_index_buffer(&mut encoded, &indices, 4).unwrap();
//!
//! let mut decoded = [0u32; 6];
//! decode_index_buffer(&mut decoded, 4, &encoded[..size]).unwrap();
//! assert_eq!(decoded, indices);
//! ```

mod adapter;
mod bitstream;
mod error;
mod indexcodec;
mod vertexcodec;

pub use adapter::{decode_index_buffer_u16, encode_index_buffer_u16};
pub use error::{DecodeError, EncodeError};
pub use indexcodec::{decode_index_buffer, encode_index_buffer, encode_index_buffer_bound};
pub use vertexcodec::{decode_vertex_buffer, encode_vertex_buffer, encode_vertex_buffer_bound};

// =============================================================================
// Constants
// =============================================================================

/// Format tag of index streams (high nibble: stream kind, low nibble: version)
pub const INDEX_STREAM_TAG: u8 = 0xE1;

/// Format tag of vertex streams (high nibble: stream kind, low nibble: version)
pub const VERTEX_STREAM_TAG: u8 = 0xD1;

/// Capacity of the edge history FIFO simulated by the index codec
pub const EDGE_HISTORY_SIZE: usize = 16;

/// Capacity of the vertex history FIFO simulated by the index codec
pub const VERTEX_HISTORY_SIZE: usize = 16;

/// Records per block in the vertex codec (one control byte per lane per block)
pub const VERTEX_BLOCK_SIZE: usize = 16;

// =============================================================================
// Tests
// =============================================================================
