//! The trait resource finalization uses to create GPU objects.

use std::fmt;

use crate::gpu_types::{GpuMesh, GpuProgram, GpuShader, GpuTexture};

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    /// Stage could not be inferred from the source name.
    Undefined,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Interleaved vertex layout shared by every mesh upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Tightly packed RGBA8 pixels, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Copy)]
pub struct MeshUpload<'a> {
    pub label: Option<&'a str>,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
}

/// GPU object creation, called only from the frame thread.
///
/// Methods take `&self` and return owned wrappers so the context can be shared
/// behind an `Arc<dyn GraphicsContext>`. Creation is treated as infallible;
/// backend validation errors surface through the backend's own error handling.
pub trait GraphicsContext: Send + Sync {
    /// Upload an RGBA8 texture.
    fn create_texture(&self, upload: &TextureUpload) -> GpuTexture;

    /// Upload vertex and index buffers for one mesh.
    fn create_mesh(&self, upload: &MeshUpload) -> GpuMesh;

    /// Compile shader source for `stage`.
    fn create_shader(&self, stage: ShaderStage, label: Option<&str>, source: &str) -> GpuShader;

    /// Link a vertex and a pixel shader into a program.
    fn link_program(&self, label: Option<&str>, vertex: &GpuShader, pixel: &GpuShader)
    -> GpuProgram;
}
