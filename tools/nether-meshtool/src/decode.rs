//! Decode commands - expand encoded streams back to raw buffers
//!
//! The stream carries its own shape for validation, but the codec contract
//! requires the caller to declare the expected shape up front, so both
//! commands take the counts as arguments and fail on any disagreement.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;

use nether_meshcodec::{decode_index_buffer, decode_vertex_buffer};

/// Arguments for the decode-index command
#[derive(Args)]
pub struct DecodeIndexArgs {
    /// Encoded index stream
    pub input: PathBuf,

    /// Raw output buffer (little-endian u32 triples)
    pub output: PathBuf,

    /// Expected number of indices
    #[arg(long)]
    pub index_count: usize,

    /// Number of vertices the indices address
    #[arg(long)]
    pub vertex_count: u32,
}

/// Arguments for the decode-vertex command
#[derive(Args)]
pub struct DecodeVertexArgs {
    /// Encoded vertex stream
    pub input: PathBuf,

    /// Raw output buffer (tightly packed records)
    pub output: PathBuf,

    /// Expected number of vertex records
    #[arg(long)]
    pub vertex_count: usize,

    /// Bytes per vertex record
    #[arg(long)]
    pub vertex_size: usize,
}

/// Execute the decode-index command
pub fn decode_index(args: DecodeIndexArgs) -> Result<()> {
    let stream =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    if !args.index_count.is_multiple_of(3) {
        bail!("--index-count {} does not form whole triangles", args.index_count);
    }

    let mut indices = vec![0u32; args.index_count];
    decode_index_buffer(&mut indices, args.vertex_count, &stream)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Decoded {} triangles: {} -> {} bytes",
        args.index_count / 3,
        stream.len(),
        indices.len() * 4
    );
    Ok(())
}

/// Execute the decode-vertex command
pub fn decode_vertex(args: DecodeVertexArgs) -> Result<()> {
    let stream =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;

    let mut vertices = vec![0u8; args.vertex_count * args.vertex_size];
    decode_vertex_buffer(&mut vertices, args.vertex_count, args.vertex_size, &stream)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    std::fs::write(&args.output, &vertices)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Decoded {} vertices: {} -> {} bytes",
        args.vertex_count,
        stream.len(),
        vertices.len()
    );
    Ok(())
}
