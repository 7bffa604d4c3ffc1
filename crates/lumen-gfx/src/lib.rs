//! Graphics seam for Lumen.
//!
//! Resource finalization never talks to `wgpu` directly. It goes through the
//! [`GraphicsContext`] trait, which hands back owned GPU wrapper types that are
//! either real `wgpu` objects or, with the `mock` feature, recorded stand-ins.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use lumen_gfx::{GraphicsContext, MockGraphicsContext, ShaderStage, TextureUpload};
//!
//! let mock = MockGraphicsContext::new();
//! let texture = mock.create_texture(&TextureUpload {
//!     label: Some("checker"),
//!     width: 2,
//!     height: 2,
//!     pixels: &[255; 16],
//! });
//!
//! assert!(texture.is_mock());
//! assert_eq!(mock.count_texture_creates(), 1);
//! # }
//! ```

pub mod context;
pub mod gpu_types;
pub mod wgpu_context;

#[cfg(feature = "mock")]
pub mod mock;

pub use context::{GraphicsContext, MeshUpload, ShaderStage, TextureUpload, Vertex};
pub use gpu_types::{GpuMesh, GpuProgram, GpuShader, GpuTexture};
pub use wgpu_context::WgpuGraphicsContext;

#[cfg(feature = "mock")]
pub use mock::{GraphicsCall, MockGraphicsContext};
