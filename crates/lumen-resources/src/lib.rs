//! Asynchronous resource loading for Lumen.
//!
//! A [`ResourceManager`] turns path requests into [`Handle`]s that start out
//! `Loading` and settle exactly once into `Loaded` or `Failed`. Reads and
//! decoding happen on a single background worker; GPU object creation and
//! dependency resolution happen on the frame thread inside
//! [`ResourceManager::update`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lumen_resources::{ResourceConfig, ResourceManager, Texture};
//! # fn graphics() -> Arc<dyn lumen_gfx::GraphicsContext> { unimplemented!() }
//!
//! let mut resources = ResourceManager::new(ResourceConfig::default(), graphics())?;
//! let albedo = resources.request::<Texture>("textures/albedo.png");
//!
//! loop {
//!     resources.update();
//!     if let Some(texture) = albedo.get() {
//!         // draw with texture.texture
//! #       let _ = &texture.texture;
//!         break;
//!     }
//!     if albedo.is_failed() {
//!         break;
//!     }
//! }
//! # Ok::<(), lumen_resources::ResourceError>(())
//! ```

pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod kinds;
pub mod loader;
pub mod manager;
pub mod resource;
pub mod source;
pub mod status;
mod worker;

pub use cache::{ResourceCache, ResourceCaches};
pub use command::{LoadCommand, LoadCommands};
pub use config::ResourceConfig;
pub use error::{ResourceError, ResourceResult};
pub use event::{ResourceEvent, ResourceEventBuffer};
pub use kinds::{
    FinalizeContext, Finalized, Font, FontData, FontFormat, FontLoader, ImageLoader, Material,
    MaterialData, MeshData, Model, ModelContent, ModelData, ModelMesh, ObjLoader, ResourceKind,
    ResourceType, Shader, ShaderLoader, ShaderSource, Technique, TechniqueContent,
    TechniqueDescriptor, TechniqueLoader, TechniqueParam, Texture, TextureContent, TextureData,
};
pub use loader::{LoadContext, Loaders, ResourceLoader};
pub use manager::{PipelineStats, ResourceManager};
pub use resource::{AnyHandle, Handle, ResourceStatus, WeakHandle};
pub use source::{ByteSource, FileSource, MemorySource};
pub use status::LoadStatus;

static_assertions::assert_impl_all!(LoadCommands: Send);
static_assertions::assert_impl_all!(Handle<Texture>: Send, Sync);
static_assertions::assert_impl_all!(Handle<Model>: Send, Sync);
static_assertions::assert_impl_all!(Handle<Technique>: Send, Sync);
static_assertions::assert_impl_all!(ResourceError: Send, Sync);
