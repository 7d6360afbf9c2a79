//! The capability object every draw goes through.
//!
//! [`GpuDriver`] is the only path from the renderer to a graphics API. Meshes
//! and textures are referred to by handles the driver hands out, and shader
//! inputs by locations resolved once after the shader is linked.

use glam::{Mat4, Vec3};
use vista_assets::{DecodedTexture, InterleavedMesh};
use vista_scene::BufferHandle;

use crate::gpu::SurfaceError;

pub const POSITION_ATTRIBUTE: &str = "a_Position";
pub const UV_ATTRIBUTE: &str = "a_UV";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create vertex buffer `{0}`")]
    BufferCreation(String),

    #[error("shader has no vertex attribute `{0}`")]
    MissingAttribute(String),

    #[error("shader has no uniform `{0}`")]
    MissingUniform(String),

    #[error("failed to create texture `{0}`")]
    TextureCreation(String),

    #[error("unknown GPU buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    #[error("vertex stride {0} does not match the pipeline")]
    IncompatibleLayout(u32),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Float(f32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
}

impl DepthState {
    pub const OPAQUE: Self = Self {
        test: true,
        write: true,
    };
    /// Tested against opaque geometry but never occludes.
    pub const READ_ONLY: Self = Self {
        test: true,
        write: false,
    };
    pub const DISABLED: Self = Self {
        test: false,
        write: false,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// `src * a + dst * (1 - a)`
    Alpha,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: AttributeLocation,
    pub components: u32,
    pub offset_bytes: u32,
}

/// How the interleaved position+uv records map onto shader attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride_bytes: u32,
    pub position: VertexAttribute,
    pub uv: VertexAttribute,
}

impl VertexLayout {
    /// Look up both attributes on the linked shader.
    pub fn resolve<D: GpuDriver + ?Sized>(driver: &D) -> Result<Self, GpuError> {
        let lookup = |name: &str| {
            driver
                .attribute_location(name)
                .ok_or_else(|| GpuError::MissingAttribute(name.to_string()))
        };
        Ok(Self {
            stride_bytes: InterleavedMesh::STRIDE_BYTES as u32,
            position: VertexAttribute {
                location: lookup(POSITION_ATTRIBUTE)?,
                components: 3,
                offset_bytes: 0,
            },
            uv: VertexAttribute {
                location: lookup(UV_ATTRIBUTE)?,
                components: 2,
                offset_bytes: InterleavedMesh::UV_OFFSET_BYTES as u32,
            },
        })
    }
}

/// Everything the renderer needs from a graphics API.
///
/// State setters (`set_uniform`, `set_depth`, `set_blend`, `bind_*`) are
/// sticky: a draw uses whatever was last set, across frames.
pub trait GpuDriver {
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        mesh: &InterleavedMesh,
    ) -> Result<BufferHandle, GpuError>;

    fn create_texture(
        &mut self,
        label: &str,
        texture: &DecodedTexture,
    ) -> Result<TextureHandle, GpuError>;

    fn uniform_location(&self, name: &str) -> Option<UniformLocation>;

    fn attribute_location(&self, name: &str) -> Option<AttributeLocation>;

    /// Physical pixel size of the render target.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Start a frame whose color and depth buffers are cleared first.
    fn begin_frame(&mut self, clear_color: Vec3) -> Result<(), GpuError>;

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn set_depth(&mut self, state: DepthState);

    fn set_blend(&mut self, mode: BlendMode);

    /// `None` samples the driver's 1x1 white fallback.
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<(), GpuError>;

    /// Non-indexed triangle list over the bound buffer.
    fn draw_triangles(&mut self, vertex_count: u32);

    fn end_frame(&mut self) -> Result<(), GpuError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingDriver;

    #[test]
    fn test_layout_matches_interleaved_records() {
        let driver = RecordingDriver::new();
        let layout = VertexLayout::resolve(&driver).unwrap();
        assert_eq!(layout.stride_bytes, 20);
        assert_eq!(layout.position.components, 3);
        assert_eq!(layout.position.offset_bytes, 0);
        assert_eq!(layout.uv.components, 2);
        assert_eq!(layout.uv.offset_bytes, 12, "uv follows three floats");
        assert_ne!(layout.position.location, layout.uv.location);
    }

    #[test]
    fn test_missing_attribute_is_named() {
        let driver = RecordingDriver::new().without_attribute(UV_ATTRIBUTE);
        assert_eq!(
            VertexLayout::resolve(&driver),
            Err(GpuError::MissingAttribute("a_UV".to_string()))
        );
    }
}
