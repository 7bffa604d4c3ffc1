//! GPU object wrappers that can be real or mock.
//!
//! Each wrapper hides whether it holds a `wgpu` object or a mock id. Cloning
//! is cheap since `wgpu` objects are reference counted internally; dropping
//! the last clone releases the GPU object.

use crate::context::ShaderStage;

/// Uploaded 2D texture.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    width: u32,
    height: u32,
    inner: GpuTextureInner,
}

#[derive(Clone, Debug)]
enum GpuTextureInner {
    Real {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuTexture {
    pub fn from_wgpu(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            width: texture.width(),
            height: texture.height(),
            inner: GpuTextureInner::Real { texture, view },
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            inner: GpuTextureInner::Mock { id },
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// # Panics
    /// Panics if this is a mock texture.
    pub fn as_wgpu(&self) -> &wgpu::Texture {
        match &self.inner {
            GpuTextureInner::Real { texture, .. } => texture,
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Texture from mock texture")
            }
        }
    }

    /// # Panics
    /// Panics if this is a mock texture.
    pub fn view(&self) -> &wgpu::TextureView {
        match &self.inner {
            GpuTextureInner::Real { view, .. } => view,
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { .. } => {
                panic!("Attempted to get wgpu::TextureView from mock texture")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuTextureInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuTextureInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

/// Vertex and index buffers for one indexed triangle list.
#[derive(Clone, Debug)]
pub struct GpuMesh {
    index_count: u32,
    inner: GpuMeshInner,
}

#[derive(Clone, Debug)]
enum GpuMeshInner {
    Real {
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
    },
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuMesh {
    pub fn from_wgpu(vertices: wgpu::Buffer, indices: wgpu::Buffer, index_count: u32) -> Self {
        Self {
            index_count,
            inner: GpuMeshInner::Real { vertices, indices },
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize, index_count: u32) -> Self {
        Self {
            index_count,
            inner: GpuMeshInner::Mock { id },
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertex and index buffers.
    ///
    /// # Panics
    /// Panics if this is a mock mesh.
    pub fn as_wgpu(&self) -> (&wgpu::Buffer, &wgpu::Buffer) {
        match &self.inner {
            GpuMeshInner::Real { vertices, indices } => (vertices, indices),
            #[cfg(feature = "mock")]
            GpuMeshInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Buffer from mock mesh")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuMeshInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuMeshInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

/// Compiled shader module tagged with its stage.
#[derive(Clone, Debug)]
pub struct GpuShader {
    stage: ShaderStage,
    inner: GpuShaderInner,
}

#[derive(Clone, Debug)]
enum GpuShaderInner {
    Real(wgpu::ShaderModule),
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuShader {
    pub fn from_wgpu(stage: ShaderStage, module: wgpu::ShaderModule) -> Self {
        Self {
            stage,
            inner: GpuShaderInner::Real(module),
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize, stage: ShaderStage) -> Self {
        Self {
            stage,
            inner: GpuShaderInner::Mock { id },
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// # Panics
    /// Panics if this is a mock shader.
    pub fn as_wgpu(&self) -> &wgpu::ShaderModule {
        match &self.inner {
            GpuShaderInner::Real(module) => module,
            #[cfg(feature = "mock")]
            GpuShaderInner::Mock { .. } => {
                panic!("Attempted to get wgpu::ShaderModule from mock")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuShaderInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuShaderInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

/// Linked vertex + pixel program.
#[derive(Clone, Debug)]
pub struct GpuProgram {
    inner: GpuProgramInner,
}

#[derive(Clone, Debug)]
enum GpuProgramInner {
    Real(wgpu::RenderPipeline),
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuProgram {
    pub fn from_wgpu(pipeline: wgpu::RenderPipeline) -> Self {
        Self {
            inner: GpuProgramInner::Real(pipeline),
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize) -> Self {
        Self {
            inner: GpuProgramInner::Mock { id },
        }
    }

    /// # Panics
    /// Panics if this is a mock program.
    pub fn as_wgpu(&self) -> &wgpu::RenderPipeline {
        match &self.inner {
            GpuProgramInner::Real(pipeline) => pipeline,
            #[cfg(feature = "mock")]
            GpuProgramInner::Mock { .. } => {
                panic!("Attempted to get wgpu::RenderPipeline from mock")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuProgramInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuProgramInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;

    #[test]
    fn test_mock_wrappers() {
        let texture = GpuTexture::mock(3, 4, 8);
        assert!(texture.is_mock());
        assert_eq!(texture.mock_id(), Some(3));
        assert_eq!((texture.width(), texture.height()), (4, 8));

        let shader = GpuShader::mock(1, ShaderStage::Pixel);
        assert_eq!(shader.stage(), ShaderStage::Pixel);

        let mesh = GpuMesh::mock(2, 36);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.mock_id(), Some(2));
    }

    #[test]
    #[should_panic(expected = "mock")]
    fn test_mock_program_has_no_pipeline() {
        let program = GpuProgram::mock(0);
        let _ = program.as_wgpu();
    }
}
