use std::convert::Infallible;

use lumen_gfx::{GpuTexture, GraphicsContext, TextureUpload};

use super::{FinalizeContext, Finalized, ResourceKind, ResourceType};
use crate::error::{ResourceError, ResourceResult};
use crate::loader::{LoadContext, ResourceLoader};

/// Texture resources.
pub enum Texture {}

/// Decoded image, always expanded to RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source image before expansion.
    pub channels: u8,
    /// `width * height * 4` bytes, row-major.
    pub pixels: Vec<u8>,
}

/// A loaded texture.
#[derive(Debug, Clone)]
pub struct TextureContent {
    pub texture: GpuTexture,
    pub channels: u8,
}

/// Decodes images with the `image` crate.
pub struct ImageLoader;

impl ResourceLoader for ImageLoader {
    type Output = TextureData;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<TextureData> {
        let image = image::load_from_memory(ctx.bytes)
            .map_err(|e| ResourceError::decode(ctx.path, e))?;
        let channels = image.color().channel_count();
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(ResourceError::decode(ctx.path, "image has no pixels"));
        }
        Ok(TextureData {
            width,
            height,
            channels,
            pixels: rgba.into_raw(),
        })
    }
}

impl ResourceType for Texture {
    const KIND: ResourceKind = ResourceKind::Texture;

    type Decoded = TextureData;
    type Staged = Infallible;
    type Content = TextureContent;

    super::kind_slots!(texture);

    fn finalize(
        decoded: TextureData,
        ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>> {
        let texture = ctx.graphics().create_texture(&TextureUpload {
            label: Some(ctx.path()),
            width: decoded.width,
            height: decoded.height,
            pixels: &decoded.pixels,
        });
        Ok(Finalized::Ready(TextureContent {
            texture,
            channels: decoded.channels,
        }))
    }

    fn complete(
        _path: &str,
        staged: Infallible,
        _graphics: &dyn GraphicsContext,
    ) -> ResourceResult<TextureContent> {
        match staged {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decodes_png_to_rgba8() {
        let source = MemorySource::new();
        let png = encode_png(3, 2);
        let ctx = LoadContext::new("a.png", &png, &source);

        let data = ImageLoader.load(&ctx).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.channels, 3);
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert_eq!(&data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_corrupt_image() {
        let source = MemorySource::new();
        let ctx = LoadContext::new("corrupt.png", b"\x89PNG garbage", &source);
        let err = ImageLoader.load(&ctx).unwrap_err();
        assert_eq!(err.path(), Some("corrupt.png"));
    }
}
