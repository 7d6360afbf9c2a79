//! [`GpuDriver`] on top of wgpu.
//!
//! The trait is immediate-mode: state setters are sticky and every draw uses
//! whatever was last set. wgpu wants a render pass recorded in one go, so a
//! frame is buffered as a command list between `begin_frame` and `end_frame`.
//! Each draw snapshots the uniform block into its own slot of a dynamic-offset
//! uniform buffer; pipelines exist for every depth/blend pair.

use std::collections::HashMap;
use std::num::NonZeroU64;

use glam::{Mat4, Vec3};
use vista_assets::{DecodedTexture, InterleavedMesh};
use vista_scene::BufferHandle;

use crate::depth::DepthBuffer;
use crate::driver::{
    AttributeLocation, BlendMode, DepthState, GpuDriver, GpuError, POSITION_ATTRIBUTE,
    TextureHandle, UV_ATTRIBUTE, UniformLocation, UniformValue, VertexLayout,
};
use crate::gpu::RenderContext;
use crate::uniforms::Uniform;

/// Per-draw uniform block. Field order and padding mirror `SceneUniforms` in
/// [`SCENE_SHADER_SOURCE`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub model: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub camera: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub tint: [f32; 3],
    pub use_texture: f32,
    pub light_pos: [f32; 3],
    pub alpha: f32,
    pub view_pos: [f32; 3],
    pub lighting_mode: f32,
    pub time: f32,
    pub is_light: f32,
    pub _padding: [f32; 2],
}

static_assertions::assert_eq_size!(SceneUniforms, [u8; 320]);

impl Default for SceneUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            world: identity,
            camera: identity,
            projection: identity,
            tint: [1.0; 3],
            use_texture: 0.0,
            light_pos: [0.0; 3],
            alpha: 1.0,
            view_pos: [0.0; 3],
            lighting_mode: 0.0,
            time: 0.0,
            is_light: 0.0,
            _padding: [0.0; 2],
        }
    }
}

impl SceneUniforms {
    /// Write one field. A value of the wrong shape is dropped.
    pub fn set(&mut self, uniform: Uniform, value: UniformValue) {
        match (uniform, value) {
            (Uniform::Model, UniformValue::Mat4(m)) => self.model = m.to_cols_array_2d(),
            (Uniform::World, UniformValue::Mat4(m)) => self.world = m.to_cols_array_2d(),
            (Uniform::Camera, UniformValue::Mat4(m)) => self.camera = m.to_cols_array_2d(),
            (Uniform::Projection, UniformValue::Mat4(m)) => {
                self.projection = m.to_cols_array_2d()
            }
            (Uniform::Tint, UniformValue::Vec3(v)) => self.tint = v.to_array(),
            (Uniform::LightPos, UniformValue::Vec3(v)) => self.light_pos = v.to_array(),
            (Uniform::ViewPos, UniformValue::Vec3(v)) => self.view_pos = v.to_array(),
            (Uniform::UseTexture, UniformValue::Float(f)) => self.use_texture = f,
            (Uniform::Alpha, UniformValue::Float(f)) => self.alpha = f,
            (Uniform::LightingMode, UniformValue::Float(f)) => self.lighting_mode = f,
            (Uniform::Time, UniformValue::Float(f)) => self.time = f,
            (Uniform::IsLight, UniformValue::Float(f)) => self.is_light = f,
            (uniform, value) => {
                log::warn!("Ignoring {value:?} written to {}", uniform.name());
            }
        }
    }
}

/// Attribute lookup against the `VertexInput` struct of the scene shader.
fn shader_attribute(name: &str) -> Option<AttributeLocation> {
    match name {
        POSITION_ATTRIBUTE => Some(AttributeLocation(0)),
        UV_ATTRIBUTE => Some(AttributeLocation(1)),
        _ => None,
    }
}

fn shader_layout() -> VertexLayout {
    VertexLayout {
        stride_bytes: InterleavedMesh::STRIDE_BYTES as u32,
        position: crate::driver::VertexAttribute {
            location: AttributeLocation(0),
            components: 3,
            offset_bytes: 0,
        },
        uv: crate::driver::VertexAttribute {
            location: AttributeLocation(1),
            components: 2,
            offset_bytes: InterleavedMesh::UV_OFFSET_BYTES as u32,
        },
    }
}

fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PipelineKey {
    depth: DepthState,
    blend: BlendMode,
}

const PIPELINE_KEYS: [PipelineKey; 6] = [
    PipelineKey {
        depth: DepthState::OPAQUE,
        blend: BlendMode::Opaque,
    },
    PipelineKey {
        depth: DepthState::OPAQUE,
        blend: BlendMode::Alpha,
    },
    PipelineKey {
        depth: DepthState::READ_ONLY,
        blend: BlendMode::Opaque,
    },
    PipelineKey {
        depth: DepthState::READ_ONLY,
        blend: BlendMode::Alpha,
    },
    PipelineKey {
        depth: DepthState::DISABLED,
        blend: BlendMode::Opaque,
    },
    PipelineKey {
        depth: DepthState::DISABLED,
        blend: BlendMode::Alpha,
    },
];

enum Command {
    Pipeline(PipelineKey),
    Texture(Option<TextureHandle>),
    VertexBuffer(BufferHandle),
    Draw { vertex_count: u32, slot: u32 },
}

struct FrameRecording {
    surface_texture: wgpu::SurfaceTexture,
    clear_color: Vec3,
    commands: Vec<Command>,
    uniforms: Vec<SceneUniforms>,
}

pub struct WgpuDriver {
    context: RenderContext,
    depth_buffer: DepthBuffer,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Draw slots the uniform buffer currently holds.
    uniform_capacity: u64,
    uniform_stride: u64,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_texture: wgpu::BindGroup,
    textures: Vec<wgpu::BindGroup>,
    buffers: Vec<wgpu::Buffer>,
    current: SceneUniforms,
    pipeline: PipelineKey,
    texture: Option<TextureHandle>,
    bound: Option<BufferHandle>,
    frame: Option<FrameRecording>,
}

impl WgpuDriver {
    const INITIAL_UNIFORM_SLOTS: u64 = 256;

    pub fn new(context: RenderContext) -> Self {
        let device = &context.device;
        let (width, height) = context.size();
        let depth_buffer = DepthBuffer::new(device, width, height);

        let uniform_size = std::mem::size_of::<SceneUniforms>() as u64;
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = align_to(uniform_size, alignment);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-uniform-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_size),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene-shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipelines = PIPELINE_KEYS
            .iter()
            .map(|&key| {
                let pipeline = create_pipeline(
                    device,
                    &shader,
                    &pipeline_layout,
                    context.surface_format,
                    key,
                );
                (key, pipeline)
            })
            .collect();

        let (uniform_buffer, uniform_bind_group) = create_uniform_buffer(
            device,
            &uniform_layout,
            uniform_stride * Self::INITIAL_UNIFORM_SLOTS,
        );

        let fallback_texture = upload_texture(
            device,
            &context.queue,
            &texture_layout,
            &sampler,
            "white-fallback",
            &DecodedTexture::white(),
        );

        log::info!(
            "Scene driver ready: {} pipelines, uniform stride {} bytes",
            PIPELINE_KEYS.len(),
            uniform_stride
        );

        Self {
            context,
            depth_buffer,
            pipelines,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity: Self::INITIAL_UNIFORM_SLOTS,
            uniform_stride,
            texture_layout,
            sampler,
            fallback_texture,
            textures: Vec::new(),
            buffers: Vec::new(),
            current: SceneUniforms::default(),
            pipeline: PIPELINE_KEYS[0],
            texture: None,
            bound: None,
            frame: None,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Grow the uniform buffer so it holds at least `slots` draws.
    fn reserve_uniform_slots(&mut self, slots: u64) {
        if slots <= self.uniform_capacity {
            return;
        }
        let capacity = slots.next_power_of_two();
        let (buffer, bind_group) = create_uniform_buffer(
            &self.context.device,
            &self.uniform_layout,
            self.uniform_stride * capacity,
        );
        log::debug!("Uniform buffer grown to {capacity} draw slots");
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    fn push(&mut self, command: Command) {
        if let Some(frame) = &mut self.frame {
            frame.commands.push(command);
        }
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    size: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene-uniform-buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene-uniform-bind-group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<SceneUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    image: &DecodedTexture,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: None,
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let vertex_layout = shader_layout();
    let attributes = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: u64::from(vertex_layout.position.offset_bytes),
            shader_location: vertex_layout.position.location.0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: u64::from(vertex_layout.uv.offset_bytes),
            shader_location: vertex_layout.uv.location.0,
        },
    ];

    let depth_compare = if key.depth.test {
        DepthBuffer::COMPARE_FUNCTION
    } else {
        wgpu::CompareFunction::Always
    };
    let blend = match key.blend {
        BlendMode::Opaque => None,
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene-pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: u64::from(vertex_layout.stride_bytes),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // OBJ winding is not consistent across asset files
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: key.depth.write,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

impl GpuDriver for WgpuDriver {
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        mesh: &InterleavedMesh,
    ) -> Result<BufferHandle, GpuError> {
        use wgpu::util::DeviceExt;

        if mesh.is_empty() {
            return Err(GpuError::BufferCreation(label.to_string()));
        }
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: mesh.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });
        log::debug!("Uploaded {label}: {} vertices", mesh.vertex_count());
        self.buffers.push(buffer);
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn create_texture(
        &mut self,
        label: &str,
        texture: &DecodedTexture,
    ) -> Result<TextureHandle, GpuError> {
        let expected = texture.width as usize * texture.height as usize * 4;
        if texture.width == 0 || texture.height == 0 || texture.rgba.len() != expected {
            return Err(GpuError::TextureCreation(label.to_string()));
        }
        let bind_group = upload_texture(
            &self.context.device,
            &self.context.queue,
            &self.texture_layout,
            &self.sampler,
            label,
            texture,
        );
        self.textures.push(bind_group);
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        Uniform::ALL
            .iter()
            .position(|uniform| uniform.name() == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn attribute_location(&self, name: &str) -> Option<AttributeLocation> {
        shader_attribute(name)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (width, height) = self.context.size();
        self.depth_buffer
            .resize(&self.context.device, width, height);
    }

    fn begin_frame(&mut self, clear_color: Vec3) -> Result<(), GpuError> {
        if self.frame.is_some() {
            log::warn!("begin_frame while a frame is open, discarding it");
            self.frame = None;
        }
        let surface_texture = self.context.get_current_texture()?;
        let mut commands = vec![
            Command::Pipeline(self.pipeline),
            Command::Texture(self.texture),
        ];
        if let Some(buffer) = self.bound {
            commands.push(Command::VertexBuffer(buffer));
        }
        self.frame = Some(FrameRecording {
            surface_texture,
            clear_color,
            commands,
            uniforms: Vec::new(),
        });
        Ok(())
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if let Some(uniform) = Uniform::ALL.get(location.0 as usize) {
            self.current.set(*uniform, value);
        }
    }

    fn set_depth(&mut self, state: DepthState) {
        self.pipeline.depth = state;
        self.push(Command::Pipeline(self.pipeline));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.pipeline.blend = mode;
        self.push(Command::Pipeline(self.pipeline));
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
        self.push(Command::Texture(texture));
    }

    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<(), GpuError> {
        if buffer.0 as usize >= self.buffers.len() {
            return Err(GpuError::UnknownBuffer(buffer));
        }
        if *layout != shader_layout() {
            return Err(GpuError::IncompatibleLayout(layout.stride_bytes));
        }
        self.bound = Some(buffer);
        self.push(Command::VertexBuffer(buffer));
        Ok(())
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        let current = self.current;
        let Some(frame) = &mut self.frame else {
            log::warn!("draw outside of a frame dropped");
            return;
        };
        let slot = frame.uniforms.len() as u32;
        frame.uniforms.push(current);
        frame.commands.push(Command::Draw { vertex_count, slot });
    }

    fn end_frame(&mut self) -> Result<(), GpuError> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };

        self.reserve_uniform_slots(frame.uniforms.len() as u64);
        if !frame.uniforms.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut staging = vec![0u8; stride * frame.uniforms.len()];
            for (chunk, uniforms) in staging.chunks_exact_mut(stride).zip(&frame.uniforms) {
                let bytes = bytemuck::bytes_of(uniforms);
                chunk[..bytes.len()].copy_from_slice(bytes);
            }
            self.context
                .queue
                .write_buffer(&self.uniform_buffer, 0, &staging);
        }

        let view = frame
            .surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("scene-frame-encoder"),
                });

        {
            let clear = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear.x),
                            g: f64::from(clear.y),
                            b: f64::from(clear.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_buffer.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut has_buffer = false;
            for command in &frame.commands {
                match command {
                    Command::Pipeline(key) => {
                        if let Some(pipeline) = self.pipelines.get(key) {
                            pass.set_pipeline(pipeline);
                        }
                    }
                    Command::Texture(texture) => {
                        let bind_group = texture
                            .and_then(|handle| self.textures.get(handle.0 as usize))
                            .unwrap_or(&self.fallback_texture);
                        pass.set_bind_group(1, bind_group, &[]);
                    }
                    Command::VertexBuffer(buffer) => {
                        if let Some(buffer) = self.buffers.get(buffer.0 as usize) {
                            pass.set_vertex_buffer(0, buffer.slice(..));
                            has_buffer = true;
                        }
                    }
                    Command::Draw { vertex_count, slot } => {
                        if !has_buffer {
                            continue;
                        }
                        let offset = u64::from(*slot) * self.uniform_stride;
                        pass.set_bind_group(0, &self.uniform_bind_group, &[offset as u32]);
                        pass.draw(0..*vertex_count, 0..1);
                    }
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.surface_texture.present();
        Ok(())
    }
}

/// Shared by every draw. `u_IsLight` bypasses lighting for emissive bodies;
/// `u_LightingMode` selects Blinn-Phong (0) or banded toon shading (1).
/// Meshes carry no normals, so faces are shaded flat from screen-space
/// derivatives of the world position.
pub const SCENE_SHADER_SOURCE: &str = r#"
struct SceneUniforms {
    model: mat4x4<f32>,
    world: mat4x4<f32>,
    camera: mat4x4<f32>,
    projection: mat4x4<f32>,
    tint: vec3<f32>,
    use_texture: f32,
    light_pos: vec3<f32>,
    alpha: f32,
    view_pos: vec3<f32>,
    lighting_mode: f32,
    time: f32,
    is_light: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

@group(1) @binding(0)
var t_albedo: texture_2d<f32>;
@group(1) @binding(1)
var s_albedo: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = scene.world * scene.model * vec4<f32>(in.position, 1.0);
    out.clip_position = scene.projection * scene.camera * world_position;
    out.world_position = world_position.xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(t_albedo, s_albedo, in.uv).rgb;
    let normal = normalize(cross(dpdx(in.world_position), dpdy(in.world_position)));

    let base = select(scene.tint, sampled * scene.tint, scene.use_texture > 0.5);
    if (scene.is_light > 0.5) {
        return vec4<f32>(base, scene.alpha);
    }

    let to_light = normalize(scene.light_pos - in.world_position);
    let to_view = normalize(scene.view_pos - in.world_position);
    let n = faceForward(normal, -to_view, normal);
    let diffuse = max(dot(n, to_light), 0.0);

    var color: vec3<f32>;
    if (scene.lighting_mode > 0.5) {
        let bands = floor(diffuse * 4.0) / 4.0;
        color = base * (0.35 + 0.65 * bands);
    } else {
        let half_dir = normalize(to_light + to_view);
        let specular = pow(max(dot(n, half_dir), 0.0), 32.0) * 0.25;
        color = base * (0.3 + 0.7 * diffuse) + vec3<f32>(specular);
    }
    return vec4<f32>(color, scene.alpha);
}
"#;
