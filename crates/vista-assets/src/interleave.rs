//! Renderer-ready vertex buffers: position followed by texture coordinate,
//! five `f32`s per vertex.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(Vertex, [f32; InterleavedMesh::STRIDE_FLOATS]);

/// A flat triangle list, three vertices per triangle, no index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterleavedMesh {
    vertices: Vec<Vertex>,
}

impl InterleavedMesh {
    pub const STRIDE_FLOATS: usize = 5;
    pub const STRIDE_BYTES: usize = Self::STRIDE_FLOATS * std::mem::size_of::<f32>();
    /// Byte offset of the texture coordinate inside one vertex.
    pub const UV_OFFSET_BYTES: usize = 3 * std::mem::size_of::<f32>();

    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Interleave per-vertex positions with texture coordinates.
    ///
    /// Texture coordinates are only used when there is one per position;
    /// otherwise every vertex gets (0, 0).
    pub fn from_parts(positions: &[[f32; 3]], uvs: Option<&[[f32; 2]]>) -> Self {
        let uvs = uvs.filter(|uvs| uvs.len() >= positions.len());
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                uv: uvs.map_or([0.0, 0.0], |uvs| uvs[i]),
            })
            .collect();
        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// `vertex_count() * STRIDE_FLOATS` floats, ready for upload.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
