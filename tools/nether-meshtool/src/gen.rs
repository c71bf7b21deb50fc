//! Gen command - deterministic test mesh generation
//!
//! Emits a jittered heightfield patch as raw index/vertex files, ordered
//! the way a cache optimizer would leave them: row-major quads, each
//! triangle sharing an edge with its neighbor. Useful as codec input that
//! behaves like real content without needing an asset pipeline.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use clap::Args;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::path::PathBuf;

/// Arguments for the gen command
#[derive(Args)]
pub struct GenArgs {
    /// Quads along the X axis
    #[arg(long, default_value_t = 64)]
    pub width: u32,

    /// Quads along the Z axis
    #[arg(long, default_value_t = 64)]
    pub height: u32,

    /// Height jitter seed
    #[arg(long, default_value_t = 0x6d65_7368)]
    pub seed: u64,

    /// Directory for the generated buffers
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Interleaved vertex record written to the raw buffer (32 bytes)
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Shape of the buffers [`execute`] wrote
pub struct GenReport {
    pub index_path: PathBuf,
    pub vertex_path: PathBuf,
    pub index_count: usize,
    pub vertex_count: usize,
    pub vertex_size: usize,
}

/// Execute the gen command
pub fn execute(args: GenArgs) -> Result<GenReport> {
    let cols = args.width + 1;
    let rows = args.height + 1;
    let mut rng = Pcg32::seed_from_u64(args.seed);

    // Heightfield first so normals can sample neighbors
    let heights: Vec<f32> = (0..rows * cols)
        .map(|_| rng.random_range(-0.5f32..0.5))
        .collect();
    let height_at = |x: i64, z: i64| -> f32 {
        let x = x.clamp(0, i64::from(cols) - 1) as u32;
        let z = z.clamp(0, i64::from(rows) - 1) as u32;
        heights[(z * cols + x) as usize]
    };

    let mut vertices = Vec::with_capacity((rows * cols) as usize);
    for z in 0..rows {
        for x in 0..cols {
            let position = Vec3::new(x as f32, height_at(x.into(), z.into()), z as f32);
            let dx = height_at(i64::from(x) + 1, z.into()) - height_at(i64::from(x) - 1, z.into());
            let dz = height_at(x.into(), i64::from(z) + 1) - height_at(x.into(), i64::from(z) - 1);
            let normal = Vec3::new(-dx, 2.0, -dz).normalize();
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [x as f32 / args.width as f32, z as f32 / args.height as f32],
            });
        }
    }

    // Two triangles per quad, wound so each shares an edge with its neighbor
    let mut indices = Vec::with_capacity((args.width * args.height * 6) as usize);
    for z in 0..args.height {
        for x in 0..args.width {
            let i0 = z * cols + x;
            let i1 = i0 + 1;
            let i2 = i0 + cols;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let index_path = args.out_dir.join("patch.indices.bin");
    let vertex_path = args.out_dir.join("patch.vertices.bin");
    let index_bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
    std::fs::write(&index_path, &index_bytes)
        .with_context(|| format!("writing {}", index_path.display()))?;
    std::fs::write(&vertex_path, bytemuck::cast_slice::<Vertex, u8>(&vertices))
        .with_context(|| format!("writing {}", vertex_path.display()))?;

    println!(
        "Generated {}x{} patch: {} vertices ({} bytes each), {} triangles",
        args.width,
        args.height,
        vertices.len(),
        size_of::<Vertex>(),
        indices.len() / 3
    );

    Ok(GenReport {
        index_path,
        vertex_path,
        index_count: indices.len(),
        vertex_count: vertices.len(),
        vertex_size: size_of::<Vertex>(),
    })
}
