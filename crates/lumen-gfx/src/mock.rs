//! Mock implementation of [`GraphicsContext`] for testing.
//!
//! Records every creation call instead of touching a GPU.

use parking_lot::Mutex;

use crate::context::{GraphicsContext, MeshUpload, ShaderStage, TextureUpload};
use crate::gpu_types::{GpuMesh, GpuProgram, GpuShader, GpuTexture};

/// Records a graphics call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCall {
    CreateTexture {
        label: Option<String>,
        width: u32,
        height: u32,
    },
    CreateMesh {
        label: Option<String>,
        vertex_count: usize,
        index_count: usize,
    },
    CreateShader {
        label: Option<String>,
        stage: ShaderStage,
    },
    LinkProgram {
        label: Option<String>,
        vertex_id: Option<usize>,
        pixel_id: Option<usize>,
    },
}

/// Call-recording graphics context.
///
/// ```rust
/// use lumen_gfx::{GraphicsContext, MockGraphicsContext, ShaderStage};
///
/// let mock = MockGraphicsContext::new();
/// let vs = mock.create_shader(ShaderStage::Vertex, Some("basic.vs"), "");
/// let ps = mock.create_shader(ShaderStage::Pixel, Some("basic.ps"), "");
/// let program = mock.link_program(Some("basic.tech"), &vs, &ps);
///
/// assert!(program.is_mock());
/// assert_eq!(mock.count_shader_creates(), 2);
/// assert_eq!(mock.count_program_links(), 1);
/// ```
#[derive(Default)]
pub struct MockGraphicsContext {
    calls: Mutex<Vec<GraphicsCall>>,
    next_id: Mutex<usize>,
}

impl MockGraphicsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<GraphicsCall> {
        self.calls.lock().clone()
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count(|call| matches!(call, GraphicsCall::CreateTexture { .. }))
    }

    pub fn count_mesh_creates(&self) -> usize {
        self.count(|call| matches!(call, GraphicsCall::CreateMesh { .. }))
    }

    pub fn count_shader_creates(&self) -> usize {
        self.count(|call| matches!(call, GraphicsCall::CreateShader { .. }))
    }

    pub fn count_program_links(&self) -> usize {
        self.count(|call| matches!(call, GraphicsCall::LinkProgram { .. }))
    }

    /// Clear recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn count(&self, predicate: impl Fn(&GraphicsCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: GraphicsCall) -> usize {
        self.calls.lock().push(call);
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        id
    }
}

impl GraphicsContext for MockGraphicsContext {
    fn create_texture(&self, upload: &TextureUpload) -> GpuTexture {
        let id = self.record(GraphicsCall::CreateTexture {
            label: upload.label.map(str::to_owned),
            width: upload.width,
            height: upload.height,
        });
        GpuTexture::mock(id, upload.width, upload.height)
    }

    fn create_mesh(&self, upload: &MeshUpload) -> GpuMesh {
        let id = self.record(GraphicsCall::CreateMesh {
            label: upload.label.map(str::to_owned),
            vertex_count: upload.vertices.len(),
            index_count: upload.indices.len(),
        });
        GpuMesh::mock(id, upload.indices.len() as u32)
    }

    fn create_shader(&self, stage: ShaderStage, label: Option<&str>, _source: &str) -> GpuShader {
        let id = self.record(GraphicsCall::CreateShader {
            label: label.map(str::to_owned),
            stage,
        });
        GpuShader::mock(id, stage)
    }

    fn link_program(
        &self,
        label: Option<&str>,
        vertex: &GpuShader,
        pixel: &GpuShader,
    ) -> GpuProgram {
        let id = self.record(GraphicsCall::LinkProgram {
            label: label.map(str::to_owned),
            vertex_id: vertex.mock_id(),
            pixel_id: pixel.mock_id(),
        });
        GpuProgram::mock(id)
    }
}
