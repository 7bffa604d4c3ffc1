//! [`GraphicsContext`] backed by a real `wgpu` device.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::context::{GraphicsContext, MeshUpload, ShaderStage, TextureUpload, Vertex};
use crate::gpu_types::{GpuMesh, GpuProgram, GpuShader, GpuTexture};

/// Entry point expected in vertex shader sources.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";
/// Entry point expected in pixel shader sources.
pub const PIXEL_ENTRY_POINT: &str = "fs_main";

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// Creates GPU objects on a shared device and queue.
///
/// Shaders are WGSL. Programs are linked against `color_format` with the
/// [`Vertex`] layout and an automatically derived pipeline layout.
pub struct WgpuGraphicsContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    color_format: wgpu::TextureFormat,
}

impl WgpuGraphicsContext {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        tracing::debug!("Graphics context targets {:?}", color_format);
        Self {
            device,
            queue,
            color_format,
        }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl GraphicsContext for WgpuGraphicsContext {
    fn create_texture(&self, upload: &TextureUpload) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: upload.width,
            height: upload.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: upload.label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            upload.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(upload.width * 4),
                rows_per_image: Some(upload.height),
            },
            size,
        );

        GpuTexture::from_wgpu(texture)
    }

    fn create_mesh(&self, upload: &MeshUpload) -> GpuMesh {
        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: upload.label,
                contents: bytemuck::cast_slice(upload.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let indices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: upload.label,
                contents: bytemuck::cast_slice(upload.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        GpuMesh::from_wgpu(vertices, indices, upload.indices.len() as u32)
    }

    fn create_shader(&self, stage: ShaderStage, label: Option<&str>, source: &str) -> GpuShader {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        GpuShader::from_wgpu(stage, module)
    }

    fn link_program(
        &self,
        label: Option<&str>,
        vertex: &GpuShader,
        pixel: &GpuShader,
    ) -> GpuProgram {
        tracing::trace!("Linking program {:?}", label);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: None,
                vertex: wgpu::VertexState {
                    module: vertex.as_wgpu(),
                    entry_point: Some(VERTEX_ENTRY_POINT),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &VERTEX_ATTRIBUTES,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: pixel.as_wgpu(),
                    entry_point: Some(PIXEL_ENTRY_POINT),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        GpuProgram::from_wgpu(pipeline)
    }
}
