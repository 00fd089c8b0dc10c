use std::sync::Arc;

use crate::{
    assets::{
        decode::BackgroundImage,
        fonts::{FontSource, LoadedFont, TextLayoutEngine},
    },
    composition::layout::{RenderSpec, TextPlacement},
    foundation::{
        core::{Affine, Canvas, Rgba8},
        error::{CertError, CertResult},
    },
    render::{
        backend::{RenderStrategy, RenderedSurface, Renderer},
        cover::CoverFit,
    },
};

/// Primary strategy: `vello_cpu` rasterization with `parley` shaped text.
pub struct CanvasRenderer {
    font: Option<LoadedFont>,
}

impl CanvasRenderer {
    pub fn new(font: Option<LoadedFont>) -> Self {
        Self { font }
    }

    /// Resolve `source` up front. A missing system font is not fatal here: text renders
    /// then fail with [`CertError::Render`] so the fallback strategy can take over.
    pub fn from_font_source(source: &FontSource) -> CertResult<Self> {
        match source.load() {
            Ok(font) => Ok(Self::new(Some(font))),
            Err(e) if matches!(source, FontSource::System) => {
                tracing::warn!(error = %e, "canvas renderer has no font; text needs the fallback");
                Ok(Self::new(None))
            }
            Err(e) => Err(e),
        }
    }
}

impl Renderer for CanvasRenderer {
    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::Canvas
    }

    fn render(
        &self,
        spec: &RenderSpec,
        background: &BackgroundImage,
    ) -> CertResult<RenderedSurface> {
        let (w, h) = surface_dims(spec.canvas)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(Rgba8::WHITE));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        draw_background(&mut ctx, spec.canvas, background)?;

        if !spec.placements.is_empty() {
            let font = self
                .font
                .as_ref()
                .ok_or_else(|| CertError::render("no font available for certificate text"))?;
            let font_data = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                font.index,
            );
            let mut engine = TextLayoutEngine::new(font)?;
            tracing::debug!(family = engine.family_name(), "shaping certificate text");
            for placement in &spec.placements {
                draw_placement(&mut ctx, &mut engine, &font_data, spec.canvas, placement)?;
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RenderedSurface {
            canvas: spec.canvas,
            rgba8_premul: pixmap.data_as_u8_slice().to_vec(),
            strategy: RenderStrategy::Canvas,
        })
    }
}

fn surface_dims(canvas: Canvas) -> CertResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| CertError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| CertError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(CertError::render("surface width/height must be non-zero"));
    }
    Ok((w, h))
}

fn draw_background(
    ctx: &mut vello_cpu::RenderContext,
    canvas: Canvas,
    bg: &BackgroundImage,
) -> CertResult<()> {
    let pixmap = image_premul_bytes_to_pixmap(bg.rgba8_premul.as_slice(), bg.width, bg.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let fit = CoverFit::compute(canvas, bg.width, bg.height);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(fit.to_affine()));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(bg.width),
        f64::from(bg.height),
    ));
    Ok(())
}

/// Center/middle anchored: the layout box is centered on the normalized position.
fn draw_placement(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    font: &vello_cpu::peniko::FontData,
    canvas: Canvas,
    placement: &TextPlacement,
) -> CertResult<()> {
    let layout = engine.layout_line(
        &placement.text,
        placement.font_size_px,
        placement.fill.into(),
    )?;

    let anchor = canvas.to_px(placement.position);
    let origin_x = anchor.x - f64::from(layout.width()) / 2.0;
    let origin_y = anchor.y - f64::from(layout.height()) / 2.0;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));

    let stroke = placement.stroke_width_px > 0.0 && placement.stroke.a > 0;
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font_size = run.run().font_size();
            let glyphs = || {
                run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                })
            };

            if stroke {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(
                    placement.stroke_width_px,
                )));
                ctx.set_paint(cpu_color(placement.stroke));
                ctx.glyph_run(font)
                    .font_size(font_size)
                    .stroke_glyphs(glyphs());
            }

            ctx.set_paint(cpu_color(placement.fill));
            ctx.glyph_run(font).font_size(font_size).fill_glyphs(glyphs());
        }
    }
    Ok(())
}

fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CertResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CertError::render("background width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CertError::render("background height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CertError::render("background byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
