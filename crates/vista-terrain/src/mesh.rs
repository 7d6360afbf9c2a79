//! Terrain triangles, their planar uvs and the interleaved upload layout.

use vista_assets::InterleavedMesh;

use crate::heightmap::HeightField;
use crate::options::TerrainOptions;

/// A flat triangle list over the footprint `[0, width] x [0, depth]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    positions: Vec<[f32; 3]>,
    width: f32,
    depth: f32,
}

impl TerrainMesh {
    /// Build from nine floats per triangle, as produced by
    /// [`vista_assets::load_obj_positions`]. A trailing partial triangle is
    /// dropped.
    pub fn from_flat_positions(flat: &[f32], width: f32, depth: f32) -> Self {
        let whole = flat.len() - flat.len() % 9;
        let positions = flat[..whole]
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        Self {
            positions,
            width,
            depth,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Each triangle as nine floats.
    pub fn triangles(&self) -> impl Iterator<Item = [f32; 9]> + '_ {
        self.positions.chunks_exact(3).map(|t| {
            [
                t[0][0], t[0][1], t[0][2], //
                t[1][0], t[1][1], t[1][2], //
                t[2][0], t[2][1], t[2][2],
            ]
        })
    }

    /// Planar projection onto the footprint: `(x / width, z / depth)`.
    pub fn planar_uvs(&self) -> Vec<[f32; 2]> {
        let project = |v: f32, extent: f32| if extent != 0.0 { v / extent } else { 0.0 };
        self.positions
            .iter()
            .map(|p| [project(p[0], self.width), project(p[2], self.depth)])
            .collect()
    }

    pub fn interleave(&self) -> InterleavedMesh {
        InterleavedMesh::from_parts(&self.positions, Some(&self.planar_uvs()))
    }
}

/// Produces a [`TerrainMesh`] from [`TerrainOptions`]. The same options
/// always yield the same mesh.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerrainGenerator;

impl TerrainGenerator {
    pub fn generate(&self, options: &TerrainOptions) -> TerrainMesh {
        let (cols, rows) = match (cells(options.width), cells(options.depth)) {
            (Some(c), Some(r)) => (c, r),
            _ => {
                tracing::warn!(
                    width = options.width,
                    depth = options.depth,
                    "terrain footprint is empty"
                );
                return TerrainMesh {
                    positions: Vec::new(),
                    width: options.width,
                    depth: options.depth,
                };
            }
        };

        let field = HeightField::new(options);
        let step_x = options.width / cols as f32;
        let step_z = options.depth / rows as f32;

        // Grid corners, row-major, (cols + 1) per row.
        let stride = cols + 1;
        let mut grid = Vec::with_capacity(stride * (rows + 1));
        for row in 0..=rows {
            let z = row as f32 * step_z;
            for col in 0..=cols {
                let x = col as f32 * step_x;
                grid.push([x, field.sample(x as f64, z as f64) as f32, z]);
            }
        }

        let mut positions = Vec::with_capacity(cols * rows * 6);
        for row in 0..rows {
            for col in 0..cols {
                let a = grid[row * stride + col];
                let b = grid[row * stride + col + 1];
                let c = grid[(row + 1) * stride + col];
                let d = grid[(row + 1) * stride + col + 1];
                positions.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        tracing::info!(
            seed = options.seed,
            noise = %options.noise,
            triangles = positions.len() / 3,
            "generated terrain"
        );

        TerrainMesh {
            positions,
            width: options.width,
            depth: options.depth,
        }
    }
}

/// Roughly one grid cell per world unit.
fn cells(extent: f32) -> Option<usize> {
    if !extent.is_finite() || extent <= 0.0 {
        return None;
    }
    Some(extent.round().max(1.0) as usize)
}
