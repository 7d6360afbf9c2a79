//! A [`GpuDriver`] that records calls instead of drawing.
//!
//! Renderer ordering and suppression rules are checked against the recording
//! without a graphics context.

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec3};
use vista_assets::{DecodedTexture, InterleavedMesh};
use vista_scene::BufferHandle;

use crate::driver::{
    AttributeLocation, BlendMode, DepthState, GpuDriver, GpuError, TextureHandle,
    UniformLocation, UniformValue, VertexLayout,
};
use crate::gpu::SurfaceError;
use crate::uniforms::Uniform;

const ATTRIBUTES: [&str; 2] = [crate::driver::POSITION_ATTRIBUTE, crate::driver::UV_ATTRIBUTE];

#[derive(Clone, Debug, PartialEq)]
pub enum DriverCall {
    CreateVertexBuffer { label: String, vertex_count: usize },
    CreateTexture { label: String, width: u32, height: u32 },
    SetViewport(u32, u32),
    BeginFrame(Vec3),
    SetUniform(UniformLocation, UniformValue),
    SetDepth(DepthState),
    SetBlend(BlendMode),
    BindTexture(Option<TextureHandle>),
    BindVertexBuffer(BufferHandle),
    Draw(u32),
    EndFrame,
}

/// Pipeline state captured at a draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub buffer: BufferHandle,
    pub vertex_count: u32,
    pub depth: DepthState,
    pub blend: BlendMode,
    pub texture: Option<TextureHandle>,
    pub uniforms: HashMap<Uniform, UniformValue>,
    /// Issued between `begin_frame` and `end_frame`.
    pub in_frame: bool,
}

impl DrawRecord {
    pub fn mat4(&self, uniform: Uniform) -> Option<Mat4> {
        match self.uniforms.get(&uniform) {
            Some(UniformValue::Mat4(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn vec3(&self, uniform: Uniform) -> Option<Vec3> {
        match self.uniforms.get(&uniform) {
            Some(UniformValue::Vec3(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, uniform: Uniform) -> Option<f32> {
        match self.uniforms.get(&uniform) {
            Some(UniformValue::Float(f)) => Some(*f),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingDriver {
    pub calls: Vec<DriverCall>,
    pub draws: Vec<DrawRecord>,
    /// Returned once by the next `begin_frame`.
    pub fail_next_frame: Option<SurfaceError>,
    missing_uniforms: HashSet<String>,
    missing_attributes: HashSet<String>,
    buffers: Vec<usize>,
    texture_count: u32,
    bound: Option<BufferHandle>,
    depth: Option<DepthState>,
    blend: BlendMode,
    texture: Option<TextureHandle>,
    uniforms: HashMap<Uniform, UniformValue>,
    in_frame: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_uniform(mut self, name: &str) -> Self {
        self.missing_uniforms.insert(name.to_string());
        self
    }

    pub fn without_attribute(mut self, name: &str) -> Self {
        self.missing_attributes.insert(name.to_string());
        self
    }

    /// Forget everything recorded so far; GPU state is kept.
    pub fn clear_recording(&mut self) {
        self.calls.clear();
        self.draws.clear();
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn clear_colors(&self) -> Vec<Vec3> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::BeginFrame(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn draws_of(&self, buffer: BufferHandle) -> impl Iterator<Item = &DrawRecord> {
        self.draws.iter().filter(move |draw| draw.buffer == buffer)
    }
}

impl GpuDriver for RecordingDriver {
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        mesh: &InterleavedMesh,
    ) -> Result<BufferHandle, GpuError> {
        self.calls.push(DriverCall::CreateVertexBuffer {
            label: label.to_string(),
            vertex_count: mesh.vertex_count(),
        });
        // Zero-sized buffers are rejected the same way wgpu rejects them.
        if mesh.is_empty() {
            return Err(GpuError::BufferCreation(label.to_string()));
        }
        self.buffers.push(mesh.vertex_count());
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn create_texture(
        &mut self,
        label: &str,
        texture: &DecodedTexture,
    ) -> Result<TextureHandle, GpuError> {
        self.calls.push(DriverCall::CreateTexture {
            label: label.to_string(),
            width: texture.width,
            height: texture.height,
        });
        self.texture_count += 1;
        Ok(TextureHandle(self.texture_count - 1))
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if self.missing_uniforms.contains(name) {
            return None;
        }
        Uniform::ALL
            .iter()
            .position(|uniform| uniform.name() == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn attribute_location(&self, name: &str) -> Option<AttributeLocation> {
        if self.missing_attributes.contains(name) {
            return None;
        }
        ATTRIBUTES
            .iter()
            .position(|attribute| *attribute == name)
            .map(|i| AttributeLocation(i as u32))
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(DriverCall::SetViewport(width, height));
    }

    fn begin_frame(&mut self, clear_color: Vec3) -> Result<(), GpuError> {
        if let Some(error) = self.fail_next_frame.take() {
            return Err(error.into());
        }
        self.in_frame = true;
        self.calls.push(DriverCall::BeginFrame(clear_color));
        Ok(())
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.calls.push(DriverCall::SetUniform(location, value));
        if let Some(uniform) = Uniform::ALL.get(location.0 as usize) {
            self.uniforms.insert(*uniform, value);
        }
    }

    fn set_depth(&mut self, state: DepthState) {
        self.calls.push(DriverCall::SetDepth(state));
        self.depth = Some(state);
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.calls.push(DriverCall::SetBlend(mode));
        self.blend = mode;
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.calls.push(DriverCall::BindTexture(texture));
        self.texture = texture;
    }

    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        _layout: &VertexLayout,
    ) -> Result<(), GpuError> {
        if buffer.0 as usize >= self.buffers.len() {
            return Err(GpuError::UnknownBuffer(buffer));
        }
        self.calls.push(DriverCall::BindVertexBuffer(buffer));
        self.bound = Some(buffer);
        Ok(())
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.calls.push(DriverCall::Draw(vertex_count));
        let Some(buffer) = self.bound else {
            return;
        };
        self.draws.push(DrawRecord {
            buffer,
            vertex_count,
            depth: self.depth.unwrap_or(DepthState::OPAQUE),
            blend: self.blend,
            texture: self.texture,
            uniforms: self.uniforms.clone(),
            in_frame: self.in_frame,
        });
    }

    fn end_frame(&mut self) -> Result<(), GpuError> {
        self.in_frame = false;
        self.calls.push(DriverCall::EndFrame);
        Ok(())
    }
}
