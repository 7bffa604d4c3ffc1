use std::collections::BTreeMap;

use lumen_gfx::{GpuProgram, GraphicsContext, ShaderStage};
use serde::Deserialize;

use super::{FinalizeContext, Finalized, ResourceKind, ResourceType, Shader};
use crate::error::{ResourceError, ResourceResult};
use crate::loader::{LoadContext, ResourceLoader};
use crate::resource::Handle;
use crate::source::resolve_relative;

/// Technique resources: a linked vertex + pixel shader pair plus parameters.
pub enum Technique {}

/// A technique parameter value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TechniqueParam {
    Float(f32),
    Vec(Vec<f32>),
}

/// JSON technique descriptor.
///
/// ```json
/// {
///     "vertex_shader": "basic.vs",
///     "pixel_shader": "basic.ps",
///     "parameters": { "roughness": 0.5, "tint": [1.0, 0.8, 0.8, 1.0] }
/// }
/// ```
///
/// Shader paths are relative to the descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TechniqueDescriptor {
    pub vertex_shader: String,
    pub pixel_shader: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, TechniqueParam>,
}

/// A technique waiting on its shaders.
pub struct TechniqueStaged {
    pub vertex: Handle<Shader>,
    pub pixel: Handle<Shader>,
    pub parameters: BTreeMap<String, TechniqueParam>,
}

/// A linked technique.
#[derive(Debug)]
pub struct TechniqueContent {
    pub vertex: Handle<Shader>,
    pub pixel: Handle<Shader>,
    pub program: GpuProgram,
    /// Sorted by name.
    pub parameters: BTreeMap<String, TechniqueParam>,
}

/// Parses JSON technique descriptors.
pub struct TechniqueLoader;

impl ResourceLoader for TechniqueLoader {
    type Output = TechniqueDescriptor;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<TechniqueDescriptor> {
        let descriptor: TechniqueDescriptor =
            serde_json::from_slice(ctx.bytes).map_err(|e| ResourceError::InvalidDescriptor {
                path: ctx.path.to_string(),
                message: e.to_string(),
            })?;

        for (field, value) in [
            ("vertex_shader", &descriptor.vertex_shader),
            ("pixel_shader", &descriptor.pixel_shader),
        ] {
            if value.trim().is_empty() {
                return Err(ResourceError::InvalidDescriptor {
                    path: ctx.path.to_string(),
                    message: format!("`{}` is empty", field),
                });
            }
        }
        Ok(descriptor)
    }
}

fn check_stage(path: &str, shader: &Handle<Shader>, expected: ShaderStage) -> ResourceResult<()> {
    let actual = shader
        .get()
        .map(|shader| shader.stage())
        .ok_or_else(|| ResourceError::DependencyFailed {
            path: path.to_string(),
            dependency: shader.path().to_string(),
        })?;
    if actual != expected {
        return Err(ResourceError::StageMismatch {
            path: path.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

impl ResourceType for Technique {
    const KIND: ResourceKind = ResourceKind::Technique;

    type Decoded = TechniqueDescriptor;
    type Staged = TechniqueStaged;
    type Content = TechniqueContent;

    super::kind_slots!(technique);

    fn finalize(
        decoded: TechniqueDescriptor,
        ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>> {
        let vertex_path = resolve_relative(ctx.path(), &decoded.vertex_shader);
        let pixel_path = resolve_relative(ctx.path(), &decoded.pixel_shader);
        let vertex = ctx.request::<Shader>(&vertex_path);
        let pixel = ctx.request::<Shader>(&pixel_path);

        Ok(Finalized::Waiting {
            dependencies: vec![vertex.clone().into(), pixel.clone().into()],
            staged: TechniqueStaged {
                vertex,
                pixel,
                parameters: decoded.parameters,
            },
        })
    }

    fn complete(
        path: &str,
        staged: TechniqueStaged,
        graphics: &dyn GraphicsContext,
    ) -> ResourceResult<TechniqueContent> {
        check_stage(path, &staged.vertex, ShaderStage::Vertex)?;
        check_stage(path, &staged.pixel, ShaderStage::Pixel)?;

        let program = {
            let vertex = staged.vertex.get();
            let pixel = staged.pixel.get();
            match (vertex, pixel) {
                (Some(vertex), Some(pixel)) => graphics.link_program(Some(path), &vertex, &pixel),
                _ => {
                    return Err(ResourceError::DependencyFailed {
                        path: path.to_string(),
                        dependency: staged.vertex.path().to_string(),
                    });
                }
            }
        };

        Ok(TechniqueContent {
            vertex: staged.vertex,
            pixel: staged.pixel,
            program,
            parameters: staged.parameters,
        })
    }
}
