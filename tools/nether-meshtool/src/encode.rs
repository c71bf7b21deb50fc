//! Encode commands - compress raw buffers into streams
//!
//! Index files are little-endian `u32` triples; vertex files are tightly
//! packed records whose stride the caller supplies. The encoded stream is
//! written byte for byte with no container around it.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};

use nether_meshcodec::{
    encode_index_buffer, encode_index_buffer_bound, encode_vertex_buffer,
    encode_vertex_buffer_bound,
};

/// Arguments for the encode-index command
#[derive(Args)]
pub struct EncodeIndexArgs {
    /// Raw index buffer (little-endian u32 triples)
    pub input: PathBuf,

    /// Encoded stream output
    pub output: PathBuf,

    /// Number of vertices the indices address
    #[arg(long)]
    pub vertex_count: u32,
}

/// Arguments for the encode-vertex command
#[derive(Args)]
pub struct EncodeVertexArgs {
    /// Raw vertex buffer (tightly packed records)
    pub input: PathBuf,

    /// Encoded stream output
    pub output: PathBuf,

    /// Bytes per vertex record
    #[arg(long)]
    pub vertex_size: usize,
}

/// Read and validate a raw index file
pub fn read_index_file(path: &Path, vertex_count: u32) -> Result<Vec<u32>> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if !raw.len().is_multiple_of(4) {
        bail!("{}: length {} is not a multiple of 4", path.display(), raw.len());
    }
    let indices: Vec<u32> = raw
        .chunks_exact(4)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect();
    if !indices.len().is_multiple_of(3) {
        bail!(
            "{}: {} indices do not form whole triangles",
            path.display(),
            indices.len()
        );
    }
    if let Some(&max) = indices.iter().max()
        && max >= vertex_count
    {
        bail!("index {} out of range for {} vertices", max, vertex_count);
    }
    Ok(indices)
}

/// Execute the encode-index command
pub fn encode_index(args: EncodeIndexArgs) -> Result<()> {
    let indices = read_index_file(&args.input, args.vertex_count)?;
    tracing::debug!("read {} indices from {}", indices.len(), args.input.display());

    let mut encoded = vec![0u8; encode_index_buffer_bound(indices.len(), args.vertex_count)];
    let size = encode_index_buffer(&mut encoded, &indices, args.vertex_count)?;
    std::fs::write(&args.output, &encoded[..size])
        .with_context(|| format!("writing {}", args.output.display()))?;

    let raw_bytes = indices.len() * 4;
    println!(
        "Encoded {} triangles: {} -> {} bytes ({:.2} bytes/triangle)",
        indices.len() / 3,
        raw_bytes,
        size,
        size as f64 / (indices.len() as f64 / 3.0).max(1.0)
    );
    Ok(())
}

/// Execute the encode-vertex command
pub fn encode_vertex(args: EncodeVertexArgs) -> Result<()> {
    let vertices =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    if args.vertex_size == 0 {
        bail!("--vertex-size must be nonzero for file-based encoding");
    }
    if !vertices.len().is_multiple_of(args.vertex_size) {
        bail!(
            "{}: length {} is not a multiple of stride {}",
            args.input.display(),
            vertices.len(),
            args.vertex_size
        );
    }
    let vertex_count = vertices.len() / args.vertex_size;
    tracing::debug!("read {} records from {}", vertex_count, args.input.display());

    let mut encoded = vec![0u8; encode_vertex_buffer_bound(vertex_count, args.vertex_size)];
    let size = encode_vertex_buffer(&mut encoded, &vertices, vertex_count, args.vertex_size)?;
    std::fs::write(&args.output, &encoded[..size])
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Encoded {} vertices: {} -> {} bytes ({:.1}% of raw)",
        vertex_count,
        vertices.len(),
        size,
        size as f64 / (vertices.len() as f64).max(1.0) * 100.0
    );
    Ok(())
}
