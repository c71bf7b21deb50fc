//! Meshtool - mesh buffer compression CLI
//!
//! # Commands
//!
//! - `meshtool encode-index` - Compress a raw index buffer into a stream
//! - `meshtool encode-vertex` - Compress a raw vertex buffer into a stream
//! - `meshtool decode-index` - Expand an encoded index stream
//! - `meshtool decode-vertex` - Expand an encoded vertex stream
//! - `meshtool gen` - Generate a deterministic test mesh as raw buffers
//! - `meshtool roundtrip` - Encode + decode in memory and report ratios
//!
//! Buffers are plain files: index buffers are little-endian `u32` triples,
//! vertex buffers are tightly packed fixed-stride records, encoded streams
//! are stored byte for byte. Shape parameters the files cannot carry
//! (vertex count, record stride) are command-line arguments.
//!
//! # Usage
//!
//! ```bash
//! # Make a 64x64 test patch, compress both buffers, expand them again
//! meshtool gen --width 64 --height 64 --out-dir ./patch
//! meshtool encode-index ./patch/patch.indices.bin ./patch/patch.nmi --vertex-count 4225
//! meshtool decode-index ./patch/patch.nmi ./patch/restored.bin \
//!     --index-count 24576 --vertex-count 4225
//!
//! # One-shot compression report
//! meshtool roundtrip --indices ./patch/patch.indices.bin --vertex-count 4225
//! ```

mod decode;
mod encode;
mod r#gen;
mod roundtrip;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Meshtool - mesh buffer compression toolkit
#[derive(Parser)]
#[command(name = "meshtool")]
#[command(about = "Compress, expand, and inspect mesh buffers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a raw index buffer into an encoded stream
    EncodeIndex(encode::EncodeIndexArgs),

    /// Compress a raw vertex buffer into an encoded stream
    EncodeVertex(encode::EncodeVertexArgs),

    /// Expand an encoded index stream back to a raw buffer
    DecodeIndex(decode::DecodeIndexArgs),

    /// Expand an encoded vertex stream back to a raw buffer
    DecodeVertex(decode::DecodeVertexArgs),

    /// Generate a deterministic test mesh as raw buffers
    Gen(r#gen::GenArgs),

    /// Encode + decode in memory and report sizes and checksums
    Roundtrip(roundtrip::RoundtripArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::EncodeIndex(args) => encode::encode_index(args),
        Commands::EncodeVertex(args) => encode::encode_vertex(args),
        Commands::DecodeIndex(args) => decode::decode_index(args),
        Commands::DecodeVertex(args) => decode::decode_vertex(args),
        Commands::Gen(args) => {
            r#gen::execute(args)?;
            Ok(())
        }
        Commands::Roundtrip(args) => roundtrip::execute(args),
    }
}
