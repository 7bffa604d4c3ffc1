//! Decoders the worker runs off the frame thread.

use crate::error::ResourceResult;
use crate::kinds::{
    FontData, FontLoader, ImageLoader, ModelData, ObjLoader, ShaderLoader, ShaderSource,
    TechniqueDescriptor, TechniqueLoader, TextureData,
};
use crate::source::{self, ByteSource};

/// Context passed to a loader.
pub struct LoadContext<'a> {
    /// Normalized path of the resource being loaded.
    pub path: &'a str,
    /// The raw bytes at `path`.
    pub bytes: &'a [u8],
    source: &'a dyn ByteSource,
}

impl<'a> LoadContext<'a> {
    pub fn new(path: &'a str, bytes: &'a [u8], source: &'a dyn ByteSource) -> Self {
        Self {
            path,
            bytes,
            source,
        }
    }

    /// Lowercased file extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        source::extension(self.path)
    }

    /// Resolve a path relative to this resource's directory.
    pub fn resolve(&self, relative: &str) -> String {
        source::resolve_relative(self.path, relative)
    }

    /// Read a file next to this resource, e.g. an OBJ's material library.
    pub fn read_sibling(&self, relative: &str) -> ResourceResult<Vec<u8>> {
        self.source.read(&self.resolve(relative))
    }
}

/// Turns raw bytes into a decoded payload.
///
/// Loaders run on the worker thread and must not touch GPU state. A panic
/// inside `load` is caught and reported as a decode failure.
///
/// ```rust
/// use lumen_resources::{LoadContext, Loaders, ResourceLoader, ResourceResult, ShaderSource};
/// use lumen_gfx::ShaderStage;
///
/// struct AlwaysVertex;
///
/// impl ResourceLoader for AlwaysVertex {
///     type Output = ShaderSource;
///
///     fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<ShaderSource> {
///         Ok(ShaderSource {
///             stage: ShaderStage::Vertex,
///             source: String::from_utf8_lossy(ctx.bytes).into_owned(),
///         })
///     }
/// }
///
/// let loaders = Loaders::default().with_shader(AlwaysVertex);
/// # let _ = loaders;
/// ```
pub trait ResourceLoader: Send + Sync {
    type Output;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<Self::Output>;
}

/// The loader used for each kind.
pub struct Loaders {
    pub(crate) font: Box<dyn ResourceLoader<Output = FontData>>,
    pub(crate) shader: Box<dyn ResourceLoader<Output = ShaderSource>>,
    pub(crate) technique: Box<dyn ResourceLoader<Output = TechniqueDescriptor>>,
    pub(crate) texture: Box<dyn ResourceLoader<Output = TextureData>>,
    pub(crate) model: Box<dyn ResourceLoader<Output = ModelData>>,
}

impl Default for Loaders {
    fn default() -> Self {
        Self {
            font: Box::new(FontLoader),
            shader: Box::new(ShaderLoader),
            technique: Box::new(TechniqueLoader),
            texture: Box::new(ImageLoader),
            model: Box::new(ObjLoader),
        }
    }
}

impl Loaders {
    pub fn with_font(mut self, loader: impl ResourceLoader<Output = FontData> + 'static) -> Self {
        self.font = Box::new(loader);
        self
    }

    pub fn with_shader(
        mut self,
        loader: impl ResourceLoader<Output = ShaderSource> + 'static,
    ) -> Self {
        self.shader = Box::new(loader);
        self
    }

    pub fn with_technique(
        mut self,
        loader: impl ResourceLoader<Output = TechniqueDescriptor> + 'static,
    ) -> Self {
        self.technique = Box::new(loader);
        self
    }

    pub fn with_texture(
        mut self,
        loader: impl ResourceLoader<Output = TextureData> + 'static,
    ) -> Self {
        self.texture = Box::new(loader);
        self
    }

    pub fn with_model(mut self, loader: impl ResourceLoader<Output = ModelData> + 'static) -> Self {
        self.model = Box::new(loader);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_context_helpers() {
        let source = MemorySource::new().with("models/crate.mtl", b"newmtl wood".to_vec());
        let ctx = LoadContext::new("models/crate.OBJ", b"", &source);

        assert_eq!(ctx.extension().as_deref(), Some("obj"));
        assert_eq!(ctx.resolve("wood.png"), "models/wood.png");
        assert_eq!(ctx.read_sibling("crate.mtl").unwrap(), b"newmtl wood");
        assert!(ctx.read_sibling("missing.mtl").unwrap_err().is_not_found());
    }
}
