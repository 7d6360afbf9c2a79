//! Handles to GPU-resident geometry.

use glam::Mat4;

/// Opaque vertex buffer id handed out by the GPU driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// An uploaded interleaved triangle list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshHandle {
    pub buffer: BufferHandle,
    pub vertex_count: u32,
}

/// Geometry plus the transform its owning subsystem rewrites every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Model {
    pub mesh: MeshHandle,
    pub transform: Mat4,
}

impl Model {
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            transform: Mat4::IDENTITY,
        }
    }
}
