//! The closed set of resource kinds.
//!
//! Every pipeline stage walks [`ResourceKind::PROCESSING_ORDER`] and matches
//! exhaustively, so adding a kind is a compile error until every stage
//! handles it.

use std::fmt;

use lumen_gfx::GraphicsContext;

use crate::cache::{ResourceCache, ResourceCaches};
use crate::command::{LoadCommand, LoadCommands};
use crate::error::ResourceResult;
use crate::loader::{Loaders, ResourceLoader};
use crate::resource::{AnyHandle, Handle};
use crate::source::normalize_path;
use crate::worker::WorkQueue;

mod font;
mod model;
mod shader;
mod technique;
mod texture;

pub use font::{Font, FontData, FontFormat, FontLoader};
pub use model::{
    Material, MaterialData, MeshData, Model, ModelContent, ModelData, ModelMesh, ObjLoader,
};
pub use shader::{Shader, ShaderLoader, ShaderSource};
pub use technique::{
    Technique, TechniqueContent, TechniqueDescriptor, TechniqueLoader, TechniqueParam,
    TechniqueStaged,
};
pub use texture::{ImageLoader, Texture, TextureContent, TextureData};

/// Tag for each resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    Shader,
    Technique,
    Texture,
    Model,
}

impl ResourceKind {
    /// Order the worker and the frame thread process kinds in. Shaders come
    /// before techniques so a technique's shaders are usually ready by the
    /// time its dependency check runs.
    pub const PROCESSING_ORDER: [ResourceKind; 5] = [
        ResourceKind::Font,
        ResourceKind::Shader,
        ResourceKind::Technique,
        ResourceKind::Texture,
        ResourceKind::Model,
    ];

    /// Order for eviction: dependents before the resources they hold.
    pub const EVICTION_ORDER: [ResourceKind; 5] = [
        ResourceKind::Technique,
        ResourceKind::Model,
        ResourceKind::Shader,
        ResourceKind::Texture,
        ResourceKind::Font,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Font => "font",
            ResourceKind::Shader => "shader",
            ResourceKind::Technique => "technique",
            ResourceKind::Texture => "texture",
            ResourceKind::Model => "model",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run `$body` with `$ty` bound to the marker type for `$kind`.
macro_rules! for_kind {
    ($kind:expr, $ty:ident => $body:expr) => {
        match $kind {
            $crate::kinds::ResourceKind::Font => {
                type $ty = $crate::kinds::Font;
                $body
            }
            $crate::kinds::ResourceKind::Shader => {
                type $ty = $crate::kinds::Shader;
                $body
            }
            $crate::kinds::ResourceKind::Technique => {
                type $ty = $crate::kinds::Technique;
                $body
            }
            $crate::kinds::ResourceKind::Texture => {
                type $ty = $crate::kinds::Texture;
                $body
            }
            $crate::kinds::ResourceKind::Model => {
                type $ty = $crate::kinds::Model;
                $body
            }
        }
    };
}

pub(crate) use for_kind;

/// Accessors tying a kind to its slot in the per-kind containers.
macro_rules! kind_slots {
    ($field:ident) => {
        fn loader(
            loaders: &$crate::loader::Loaders,
        ) -> &dyn $crate::loader::ResourceLoader<Output = Self::Decoded> {
            loaders.$field.as_ref()
        }

        fn cache(caches: &$crate::cache::ResourceCaches) -> &$crate::cache::ResourceCache<Self> {
            &caches.$field
        }

        fn cache_mut(
            caches: &mut $crate::cache::ResourceCaches,
        ) -> &mut $crate::cache::ResourceCache<Self> {
            &mut caches.$field
        }

        fn batch(
            commands: &$crate::command::LoadCommands,
        ) -> &Vec<$crate::command::LoadCommand<Self>> {
            &commands.$field
        }

        fn batch_mut(
            commands: &mut $crate::command::LoadCommands,
        ) -> &mut Vec<$crate::command::LoadCommand<Self>> {
            &mut commands.$field
        }
    };
}

pub(crate) use kind_slots;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Font {}
    impl Sealed for super::Shader {}
    impl Sealed for super::Technique {}
    impl Sealed for super::Texture {}
    impl Sealed for super::Model {}
}

/// Per-kind behavior of the pipeline.
///
/// `Decoded` is what the worker produces off-thread. `finalize` runs on the
/// frame thread, creates GPU objects and may request dependencies; if it does,
/// the `Staged` value waits until `complete` can run with every dependency
/// loaded.
pub trait ResourceType: sealed::Sealed + Sized + Send + Sync + 'static {
    const KIND: ResourceKind;

    type Decoded: Send + 'static;
    type Staged: Send + 'static;
    type Content: Send + Sync + 'static;

    #[doc(hidden)]
    fn loader(loaders: &Loaders) -> &dyn ResourceLoader<Output = Self::Decoded>;
    #[doc(hidden)]
    fn cache(caches: &ResourceCaches) -> &ResourceCache<Self>;
    #[doc(hidden)]
    fn cache_mut(caches: &mut ResourceCaches) -> &mut ResourceCache<Self>;
    #[doc(hidden)]
    fn batch(commands: &LoadCommands) -> &Vec<LoadCommand<Self>>;
    #[doc(hidden)]
    fn batch_mut(commands: &mut LoadCommands) -> &mut Vec<LoadCommand<Self>>;

    /// Turn a decoded payload into content, or stage it behind dependencies.
    fn finalize(
        decoded: Self::Decoded,
        ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>>;

    /// Build the content once every dependency is loaded.
    fn complete(
        path: &str,
        staged: Self::Staged,
        graphics: &dyn GraphicsContext,
    ) -> ResourceResult<Self::Content>;
}

/// Outcome of [`ResourceType::finalize`].
pub enum Finalized<T: ResourceType> {
    Ready(T::Content),
    Waiting {
        staged: T::Staged,
        dependencies: Vec<AnyHandle>,
    },
}

/// Frame-thread context handed to [`ResourceType::finalize`].
pub struct FinalizeContext<'a> {
    path: &'a str,
    caches: &'a mut ResourceCaches,
    queue: &'a WorkQueue,
    graphics: &'a dyn GraphicsContext,
}

impl<'a> FinalizeContext<'a> {
    pub(crate) fn new(
        path: &'a str,
        caches: &'a mut ResourceCaches,
        queue: &'a WorkQueue,
        graphics: &'a dyn GraphicsContext,
    ) -> Self {
        Self {
            path,
            caches,
            queue,
            graphics,
        }
    }

    /// Path of the resource being finalized.
    pub fn path(&self) -> &str {
        self.path
    }

    pub fn graphics(&self) -> &dyn GraphicsContext {
        self.graphics
    }

    /// Request a dependency through the same cache as external requests.
    pub fn request<U: ResourceType>(&mut self, path: &str) -> Handle<U> {
        self.caches.get_or_create::<U>(&normalize_path(path), self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_order() {
        assert_eq!(
            ResourceKind::PROCESSING_ORDER,
            [
                ResourceKind::Font,
                ResourceKind::Shader,
                ResourceKind::Technique,
                ResourceKind::Texture,
                ResourceKind::Model,
            ]
        );
    }

    #[test]
    fn test_for_kind_dispatch() {
        for kind in ResourceKind::PROCESSING_ORDER {
            let dispatched = for_kind!(kind, T => T::KIND);
            assert_eq!(dispatched, kind);
        }
        assert_eq!(ResourceKind::Technique.to_string(), "technique");
    }

    #[test]
    fn test_eviction_order_covers_every_kind() {
        for kind in ResourceKind::PROCESSING_ORDER {
            assert!(ResourceKind::EVICTION_ORDER.contains(&kind));
        }
    }
}
