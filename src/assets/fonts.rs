use std::{path::PathBuf, sync::Arc};

use crate::foundation::{
    core::Rgba8,
    error::{CertError, CertResult},
};

/// Where certificate text glyphs come from.
#[derive(Clone, Debug, Default)]
pub enum FontSource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
    /// Bold sans-serif face from the system font database.
    #[default]
    System,
}

/// Raw font file bytes plus the face index within them.
#[derive(Clone)]
pub struct LoadedFont {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontSource {
    pub fn load(&self) -> CertResult<LoadedFont> {
        match self {
            Self::Path(p) => {
                let bytes = std::fs::read(p).map_err(|e| {
                    CertError::resource_load(format!("read font '{}': {e}", p.display()))
                })?;
                Ok(LoadedFont {
                    bytes: Arc::new(bytes),
                    index: 0,
                })
            }
            Self::Bytes(b) => Ok(LoadedFont {
                bytes: b.clone(),
                index: 0,
            }),
            Self::System => system_sans_bold()
                .ok_or_else(|| CertError::resource_load("no system sans-serif font available")),
        }
    }
}

/// Build a font database with system fonts, used by the SVG snapshot path.
pub fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
}

/// Look up a bold sans-serif face, falling back to any installed face.
pub fn system_sans_bold() -> Option<LoadedFont> {
    let db = system_fontdb();
    let families = [
        usvg::fontdb::Family::Name("Arial"),
        usvg::fontdb::Family::SansSerif,
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight::BOLD,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    db.with_face_data(id, |data, index| LoadedFont {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
}

impl TextLayoutEngine {
    /// Register `font` and keep its family as the default stack for later layouts.
    pub fn new(font: &LoadedFont) -> CertResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CertError::resource_load("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CertError::resource_load("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name: Some(family_name),
        })
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// Shape a single unwrapped line of text.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CertResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CertError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self
            .family_name
            .clone()
            .ok_or_else(|| CertError::render("text engine has no font family"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
