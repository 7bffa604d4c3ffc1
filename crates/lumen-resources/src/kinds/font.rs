use std::convert::Infallible;
use std::sync::Arc;

use cosmic_text::fontdb;
use lumen_gfx::GraphicsContext;

use super::{FinalizeContext, Finalized, ResourceKind, ResourceType};
use crate::error::{ResourceError, ResourceResult};
use crate::loader::{LoadContext, ResourceLoader};

/// Font resources. Loaded fonts are CPU-side data with no GPU object.
pub enum Font {}

/// Detected font file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    TrueType,
    OpenType,
    Woff,
    Woff2,
    TrueTypeCollection,
    Unknown,
}

impl FontFormat {
    /// Detect font format from the magic bytes.
    pub fn detect(data: &[u8]) -> Self {
        if data.len() < 4 {
            return FontFormat::Unknown;
        }

        match &data[0..4] {
            [0x00, 0x01, 0x00, 0x00] | [b't', b'r', b'u', b'e'] => FontFormat::TrueType,
            [b'O', b'T', b'T', b'O'] => FontFormat::OpenType,
            [b'w', b'O', b'F', b'F'] => FontFormat::Woff,
            [b'w', b'O', b'F', b'2'] => FontFormat::Woff2,
            [b't', b't', b'c', b'f'] => FontFormat::TrueTypeCollection,
            _ => FontFormat::Unknown,
        }
    }
}

/// A parsed font file.
#[derive(Debug, Clone)]
pub struct FontData {
    pub format: FontFormat,
    /// Family names of every face, sorted and deduplicated.
    pub families: Vec<String>,
    pub bytes: Arc<Vec<u8>>,
}

/// Default font loader backed by `fontdb`.
///
/// WOFF containers are detected but rejected, since `fontdb` only parses
/// uncompressed sfnt data.
pub struct FontLoader;

impl ResourceLoader for FontLoader {
    type Output = FontData;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<FontData> {
        let format = FontFormat::detect(ctx.bytes);
        match format {
            FontFormat::Unknown => {
                return Err(ResourceError::decode(
                    ctx.path,
                    format!(
                        "unrecognized font format (magic: {:02x?})",
                        &ctx.bytes[..4.min(ctx.bytes.len())]
                    ),
                ));
            }
            FontFormat::Woff | FontFormat::Woff2 => {
                return Err(ResourceError::decode(
                    ctx.path,
                    "compressed WOFF fonts are not supported",
                ));
            }
            _ => {}
        }

        let bytes = Arc::new(ctx.bytes.to_vec());
        let mut db = fontdb::Database::new();
        db.load_font_source(fontdb::Source::Binary(bytes.clone()));
        if db.len() == 0 {
            return Err(ResourceError::decode(ctx.path, "no font faces found"));
        }

        let mut families: Vec<String> = db
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
            .collect();
        families.sort();
        families.dedup();

        Ok(FontData {
            format,
            families,
            bytes,
        })
    }
}

impl ResourceType for Font {
    const KIND: ResourceKind = ResourceKind::Font;

    type Decoded = FontData;
    type Staged = Infallible;
    type Content = FontData;

    super::kind_slots!(font);

    fn finalize(
        decoded: FontData,
        _ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>> {
        Ok(Finalized::Ready(decoded))
    }

    fn complete(
        _path: &str,
        staged: Infallible,
        _graphics: &dyn GraphicsContext,
    ) -> ResourceResult<FontData> {
        match staged {}
    }
}
