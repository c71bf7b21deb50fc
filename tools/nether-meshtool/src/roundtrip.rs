//! Roundtrip command - in-memory encode/decode verification
//!
//! Compresses a buffer, expands it again, and proves byte equality with
//! xxh3 checksums, reporting sizes along the way. The quickest way to see
//! what the codec buys on a given asset without touching it.

use anyhow::{Context, Result, bail, ensure};
use clap::Args;
use std::path::PathBuf;
use xxhash_rust::xxh3::xxh3_64;

use nether_meshcodec::{
    decode_index_buffer, decode_vertex_buffer, encode_index_buffer, encode_index_buffer_bound,
    encode_vertex_buffer, encode_vertex_buffer_bound,
};

use crate::encode::read_index_file;

/// Arguments for the roundtrip command
#[derive(Args)]
pub struct RoundtripArgs {
    /// Raw index buffer to verify (requires --vertex-count)
    #[arg(long)]
    pub indices: Option<PathBuf>,

    /// Number of vertices the index buffer addresses
    #[arg(long)]
    pub vertex_count: Option<u32>,

    /// Raw vertex buffer to verify (requires --vertex-size)
    #[arg(long)]
    pub vertices: Option<PathBuf>,

    /// Bytes per vertex record
    #[arg(long)]
    pub vertex_size: Option<usize>,
}

/// Execute the roundtrip command
pub fn execute(args: RoundtripArgs) -> Result<()> {
    if args.indices.is_none() && args.vertices.is_none() {
        bail!("nothing to verify: pass --indices and/or --vertices");
    }

    if let Some(path) = &args.indices {
        let Some(vertex_count) = args.vertex_count else {
            bail!("--indices requires --vertex-count");
        };
        let indices = read_index_file(path, vertex_count)?;

        let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), vertex_count)];
        let size = encode_index_buffer(&mut encoded, &indices, vertex_count)?;
        let mut decoded = vec![0u32; indices.len()];
        decode_index_buffer(&mut decoded, vertex_count, &encoded[..size])
            .with_context(|| format!("re-decoding {}", path.display()))?;

        let before = xxh3_64(bytemuck::cast_slice(&indices));
        let after = xxh3_64(bytemuck::cast_slice(&decoded));
        ensure!(before == after, "index roundtrip mismatch: {:016x} != {:016x}", before, after);

        println!(
            "indices:  {} -> {} bytes ({:.2} bytes/triangle), xxh3 {:016x} ok",
            indices.len() * 4,
            size,
            size as f64 / (indices.len() as f64 / 3.0).max(1.0),
            after
        );
    }

    if let Some(path) = &args.vertices {
        let Some(vertex_size) = args.vertex_size else {
            bail!("--vertices requires --vertex-size");
        };
        let vertices =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        ensure!(vertex_size > 0, "--vertex-size must be nonzero");
        ensure!(
            vertices.len().is_multiple_of(vertex_size),
            "{}: length {} is not a multiple of stride {}",
            path.display(),
            vertices.len(),
            vertex_size
        );
        let vertex_count = vertices.len() / vertex_size;

        let mut encoded = vec![0u8; encode_vertex_buffer_bound(vertex_count, vertex_size)];
        let size = encode_vertex_buffer(&mut encoded, &vertices, vertex_count, vertex_size)?;
        let mut decoded = vec![0u8; vertices.len()];
        decode_vertex_buffer(&mut decoded, vertex_count, vertex_size, &encoded[..size])
            .with_context(|| format!("re-decoding {}", path.display()))?;

        let before = xxh3_64(&vertices);
        let after = xxh3_64(&decoded);
        ensure!(before == after, "vertex roundtrip mismatch: {:016x} != {:016x}", before, after);

        println!(
            "vertices: {} -> {} bytes ({:.1}% of raw), xxh3 {:016x} ok",
            vertices.len(),
            size,
            size as f64 / (vertices.len() as f64).max(1.0) * 100.0,
            after
        );
    }

    Ok(())
}
