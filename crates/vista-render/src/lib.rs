//! Frame rendering for the Vista viewer: the scene draw sequence, the GPU
//! capability trait it is written against, and the wgpu implementation.

pub mod depth;
pub mod driver;
pub mod gpu;
pub mod palette;
pub mod recording;
pub mod renderer;
pub mod uniforms;
pub mod wgpu_driver;

pub use depth::DepthBuffer;
pub use driver::{
    AttributeLocation, BlendMode, DepthState, GpuDriver, GpuError, TextureHandle,
    UniformLocation, UniformValue, VertexAttribute, VertexLayout,
};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use palette::{STAR_TINT, Tints, cloud_tint, sky_color, tints};
pub use recording::{DrawRecord, DriverCall, RecordingDriver};
pub use renderer::SceneRenderer;
pub use uniforms::{Uniform, UniformTable};
pub use wgpu_driver::{SCENE_SHADER_SOURCE, SceneUniforms, WgpuDriver};
