//! Round-trip, bound-soundness, and compression-sensitivity properties
//! exercised across both codecs with generated buffers.

use nether_meshcodec::{
    decode_index_buffer, decode_vertex_buffer, encode_index_buffer, encode_index_buffer_bound,
    encode_vertex_buffer, encode_vertex_buffer_bound,
};
use proptest::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Encode then decode, asserting exact equality and bound soundness;
/// returns the encoded size
fn index_roundtrip(indices: &[u32], vertex_count: u32) -> usize {
    let bound = encode_index_buffer_bound(indices.len(), vertex_count);
    let mut encoded = vec![0u8; bound];
    let size = encode_index_buffer(&mut encoded, indices, vertex_count).unwrap();
    assert!(size <= bound, "encoded {} bytes, bound {}", size, bound);

    let mut decoded = vec![0u32; indices.len()];
    decode_index_buffer(&mut decoded, vertex_count, &encoded[..size]).unwrap();
    assert_eq!(decoded, indices);
    size
}

fn vertex_roundtrip(vertices: &[u8], vertex_count: usize, vertex_size: usize) -> usize {
    let bound = encode_vertex_buffer_bound(vertex_count, vertex_size);
    let mut encoded = vec![0u8; bound];
    let size = encode_vertex_buffer(&mut encoded, vertices, vertex_count, vertex_size).unwrap();
    assert!(size <= bound, "encoded {} bytes, bound {}", size, bound);

    let mut decoded = vec![0u8; vertices.len()];
    decode_vertex_buffer(&mut decoded, vertex_count, vertex_size, &encoded[..size]).unwrap();
    assert_eq!(decoded, vertices);
    size
}

fn index_buffer_strategy() -> impl Strategy<Value = (u32, Vec<u32>)> {
    (1u32..300).prop_flat_map(|vertex_count| {
        prop::collection::vec(0..vertex_count, 0..150).prop_map(move |mut indices| {
            let whole_triangles = indices.len() - indices.len() % 3;
            indices.truncate(whole_triangles);
            (vertex_count, indices)
        })
    })
}

fn vertex_buffer_strategy() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    (0usize..50, 0usize..40).prop_flat_map(|(vertex_count, vertex_size)| {
        prop::collection::vec(any::<u8>(), vertex_count * vertex_size)
            .prop_map(move |data| (vertex_count, vertex_size, data))
    })
}

proptest! {
    #[test]
    fn prop_index_buffers_roundtrip((vertex_count, indices) in index_buffer_strategy()) {
        index_roundtrip(&indices, vertex_count);
    }

    #[test]
    fn prop_vertex_buffers_roundtrip(
        (vertex_count, vertex_size, vertices) in vertex_buffer_strategy()
    ) {
        vertex_roundtrip(&vertices, vertex_count, vertex_size);
    }

    #[test]
    fn prop_index_decode_never_panics_on_noise(noise in prop::collection::vec(any::<u8>(), 0..64)) {
        // Arbitrary bytes must produce an error or a valid buffer, never a
        // panic or an out-of-range index
        let mut out = [u32::MAX; 12];
        if decode_index_buffer(&mut out, 7, &noise).is_ok() {
            prop_assert!(out.iter().all(|&i| i < 7));
        }
    }

    #[test]
    fn prop_vertex_decode_never_panics_on_noise(noise in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut out = [0u8; 24];
        let _ = decode_vertex_buffer(&mut out, 6, 4, &noise);
    }
}

/// Marching-strip triangles: every triangle shares an edge with its
/// predecessor, the shape vertex-cache optimization produces
fn strip_indices(triangle_count: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(triangle_count as usize * 3);
    for i in 0..triangle_count {
        if i % 2 == 0 {
            indices.extend_from_slice(&[i, i + 1, i + 2]);
        } else {
            indices.extend_from_slice(&[i + 1, i, i + 2]);
        }
    }
    indices
}

#[test]
fn cache_optimized_order_beats_adversarial_order() {
    // Same triangle set, two orders: contiguous strip vs a stride
    // permutation in which consecutive triangles share nothing
    let triangle_count = 150;
    let strip = strip_indices(triangle_count);
    assert!(strip.len() >= 300);

    let mut scattered = Vec::with_capacity(strip.len());
    for step in 0..triangle_count as usize {
        let t = (step * 37) % triangle_count as usize;
        scattered.extend_from_slice(&strip[t * 3..t * 3 + 3]);
    }

    let vertex_count = triangle_count + 2;
    let optimized = index_roundtrip(&strip, vertex_count);
    let adversarial = index_roundtrip(&scattered, vertex_count);
    assert!(
        optimized < adversarial,
        "optimized {} bytes, adversarial {} bytes",
        optimized,
        adversarial
    );
}

#[test]
fn large_seeded_mesh_roundtrips() {
    // A mesh-shaped workload: locally clustered indices and slowly varying
    // vertex records, sizes past every FIFO and block boundary
    let mut rng = Pcg32::seed_from_u64(0x6d65_7368);

    let vertex_count = 4096u32;
    let mut indices = Vec::new();
    let mut cursor = 0u32;
    for _ in 0..2000 {
        cursor = (cursor + rng.random_range(0..5)) % (vertex_count - 8);
        let spread = rng.random_range(1..8);
        indices.extend_from_slice(&[cursor, cursor + spread, cursor + spread / 2 + 1]);
    }
    index_roundtrip(&indices, vertex_count);

    let vertex_size = 20usize;
    let mut vertices = vec![0u8; vertex_count as usize * vertex_size];
    let mut lanes = vec![0u8; vertex_size];
    for record in vertices.chunks_exact_mut(vertex_size) {
        for (byte, lane) in record.iter_mut().zip(lanes.iter_mut()) {
            *lane = lane.wrapping_add(rng.random_range(0..4));
            *byte = *lane;
        }
    }
    let encoded = vertex_roundtrip(&vertices, vertex_count as usize, vertex_size);
    assert!(
        encoded < vertices.len(),
        "coherent vertex data grew: {} >= {}",
        encoded,
        vertices.len()
    );
}
