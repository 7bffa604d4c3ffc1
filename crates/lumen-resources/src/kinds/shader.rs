use std::convert::Infallible;

use lumen_gfx::{GpuShader, GraphicsContext, ShaderStage};

use super::{FinalizeContext, Finalized, ResourceKind, ResourceType};
use crate::error::{ResourceError, ResourceResult};
use crate::loader::{LoadContext, ResourceLoader};
use crate::source;

/// Shader resources. Content is the compiled module.
pub enum Shader {}

/// Shader text and the stage inferred for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub source: String,
}

impl ShaderSource {
    /// Infer the stage from a file extension.
    pub fn stage_for_path(path: &str) -> ShaderStage {
        match source::extension(path).as_deref() {
            Some("vs" | "vert") => ShaderStage::Vertex,
            Some("ps" | "frag" | "fs") => ShaderStage::Pixel,
            _ => ShaderStage::Undefined,
        }
    }
}

/// Reads UTF-8 shader text.
pub struct ShaderLoader;

impl ResourceLoader for ShaderLoader {
    type Output = ShaderSource;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<ShaderSource> {
        let text = std::str::from_utf8(ctx.bytes)
            .map_err(|e| ResourceError::decode(ctx.path, format!("invalid UTF-8: {}", e)))?;
        if text.trim().is_empty() {
            return Err(ResourceError::decode(ctx.path, "shader source is empty"));
        }
        Ok(ShaderSource {
            stage: ShaderSource::stage_for_path(ctx.path),
            source: text.to_string(),
        })
    }
}

impl ResourceType for Shader {
    const KIND: ResourceKind = ResourceKind::Shader;

    type Decoded = ShaderSource;
    type Staged = Infallible;
    type Content = GpuShader;

    super::kind_slots!(shader);

    fn finalize(
        decoded: ShaderSource,
        ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>> {
        let shader = ctx
            .graphics()
            .create_shader(decoded.stage, Some(ctx.path()), &decoded.source);
        Ok(Finalized::Ready(shader))
    }

    fn complete(
        _path: &str,
        staged: Infallible,
        _graphics: &dyn GraphicsContext,
    ) -> ResourceResult<GpuShader> {
        match staged {}
    }
}
