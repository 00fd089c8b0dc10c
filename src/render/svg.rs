use std::{fmt::Write as _, sync::Arc};

use base64::Engine as _;

use crate::{
    assets::{
        decode::{BackgroundImage, EncodedImage},
        fonts::system_fontdb,
    },
    composition::layout::{RenderSpec, TextPlacement},
    foundation::error::{CertError, CertResult},
    render::backend::{RenderStrategy, RenderedSurface, Renderer},
};

/// Build the preview markup: an SVG document with the embedded background and one
/// `<text>` node per placement, positioned by percentage like the preview page.
pub fn preview_svg(spec: &RenderSpec, background: &EncodedImage) -> String {
    let (w, h) = (spec.canvas.width, spec.canvas.height);
    let data = base64::engine::general_purpose::STANDARD.encode(background.bytes.as_slice());

    let mut out = String::with_capacity(data.len() + 1024);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(out, r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##);
    let _ = write!(
        out,
        r#"<image x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="xMidYMid slice" xlink:href="data:{};base64,{data}"/>"#,
        background.mime_type()
    );
    for p in &spec.placements {
        write_text(&mut out, p);
    }
    out.push_str("</svg>");
    out
}

fn write_text(out: &mut String, p: &TextPlacement) {
    let _ = write!(
        out,
        r#"<text x="{:.3}%" y="{:.3}%" text-anchor="middle" dominant-baseline="central" font-family="Arial, Helvetica, sans-serif" font-weight="bold" font-size="{}" fill="{}" fill-opacity="{:.3}""#,
        p.position.x * 100.0,
        p.position.y * 100.0,
        p.font_size_px,
        p.fill.to_hex_rgb(),
        f64::from(p.fill.a) / 255.0,
    );
    if p.stroke_width_px > 0.0 && p.stroke.a > 0 {
        let _ = write!(
            out,
            r#" stroke="{}" stroke-opacity="{:.3}" stroke-width="{}" paint-order="stroke""#,
            p.stroke.to_hex_rgb(),
            f64::from(p.stroke.a) / 255.0,
            p.stroke_width_px,
        );
    }
    let _ = write!(out, ">{}</text>", xml_escape(&p.text));
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids the remaining C0 controls, even as character references.
            '\t' | '\n' | '\r' => out.push(ch),
            c if c < ' ' => {}
            c => out.push(c),
        }
    }
    out
}

/// Secondary strategy: rasterize [`preview_svg`] with `resvg`.
///
/// Text goes through whatever the font database resolves for the markup's font stack, so
/// glyphs may differ from the canvas strategy or be missing when no fonts are installed.
pub struct SvgSnapshotRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgSnapshotRenderer {
    pub fn new(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }

    pub fn with_system_fonts() -> Self {
        Self::new(system_fontdb())
    }
}

impl Renderer for SvgSnapshotRenderer {
    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::SvgSnapshot
    }

    fn render(
        &self,
        spec: &RenderSpec,
        background: &BackgroundImage,
    ) -> CertResult<RenderedSurface> {
        let markup = preview_svg(spec, &background.source);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&markup, &opts)
            .map_err(|e| CertError::render(format!("parse preview markup: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(spec.canvas.width, spec.canvas.height)
            .ok_or_else(|| CertError::render("failed to allocate snapshot pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(RenderedSurface {
            canvas: spec.canvas,
            rgba8_premul: pixmap.data().to_vec(),
            strategy: RenderStrategy::SvgSnapshot,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
