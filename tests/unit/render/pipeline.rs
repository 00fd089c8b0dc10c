use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::{
    CertError,
    encode::artifact::ArtifactFormat,
    foundation::core::Canvas,
    render::{
        backend::{RenderStrategy, RenderedSurface},
        cpu::CanvasRenderer,
    },
};

/// Fills the canvas with a flat color, or fails with the configured error.
struct FlatRenderer {
    strategy: RenderStrategy,
    fail_with: Option<fn() -> CertError>,
    calls: Arc<AtomicUsize>,
}

impl Renderer for FlatRenderer {
    fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    fn render(&self, spec: &RenderSpec, _bg: &BackgroundImage) -> CertResult<RenderedSurface> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(f) = self.fail_with {
            return Err(f());
        }
        Ok(RenderedSurface {
            canvas: spec.canvas,
            rgba8_premul: vec![255; spec.canvas.byte_len_rgba8()],
            strategy: self.strategy,
        })
    }
}

fn flat(strategy: RenderStrategy, fail_with: Option<fn() -> CertError>) -> (Box<dyn Renderer>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        Box::new(FlatRenderer {
            strategy,
            fail_with,
            calls: calls.clone(),
        }),
        calls,
    )
}

fn png_background() -> ImageResource {
    let img = image::RgbaImage::from_pixel(30, 20, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageResource::from_bytes(buf)
}

fn small_layout() -> LayoutConfig {
    LayoutConfig {
        canvas: Canvas::new(120, 80).unwrap(),
        ..LayoutConfig::default()
    }
}

fn vespa() -> CertificateRequest {
    CertificateRequest::new("Vespa Club X", "Malang").unwrap()
}

#[test]
fn primary_success_never_touches_fallback() {
    let (primary, primary_calls) = flat(RenderStrategy::Canvas, None);
    let (fallback, fallback_calls) = flat(RenderStrategy::SvgSnapshot, None);
    let comp = Compositor::new(small_layout(), primary).with_fallback(fallback);

    let artifact = comp.render(&vespa(), &png_background()).unwrap();
    assert_eq!(artifact.strategy(), RenderStrategy::Canvas);
    assert_eq!(artifact.filename(), "certificate-vespa-club-x.png");
    assert_eq!((artifact.width(), artifact.height()), (120, 80));
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn render_error_selects_fallback_with_same_filename() {
    let (primary, _) = flat(RenderStrategy::Canvas, Some(|| CertError::render("no surface")));
    let (fallback, fallback_calls) = flat(RenderStrategy::SvgSnapshot, None);
    let comp = Compositor::new(small_layout(), primary).with_fallback(fallback);

    let artifact = comp.render(&vespa(), &png_background()).unwrap();
    assert_eq!(artifact.strategy(), RenderStrategy::SvgSnapshot);
    assert_eq!(artifact.filename(), "certificate-vespa-club-x.png");
    assert_eq!((artifact.width(), artifact.height()), (120, 80));
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn render_error_without_fallback_surfaces() {
    let (primary, _) = flat(RenderStrategy::Canvas, Some(|| CertError::render("no surface")));
    let comp = Compositor::new(small_layout(), primary);
    assert!(matches!(
        comp.render(&vespa(), &png_background()),
        Err(CertError::Render(_))
    ));
}

#[test]
fn non_render_errors_skip_fallback() {
    let (primary, _) = flat(
        RenderStrategy::Canvas,
        Some(|| CertError::resource_load("font")),
    );
    let (fallback, fallback_calls) = flat(RenderStrategy::SvgSnapshot, None);
    let comp = Compositor::new(small_layout(), primary).with_fallback(fallback);
    assert!(matches!(
        comp.render(&vespa(), &png_background()),
        Err(CertError::ResourceLoad(_))
    ));
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn background_failure_aborts_before_any_renderer() {
    let (primary, primary_calls) = flat(RenderStrategy::Canvas, None);
    let (fallback, fallback_calls) = flat(RenderStrategy::SvgSnapshot, None);
    let comp = Compositor::new(small_layout(), primary).with_fallback(fallback);

    let err = comp
        .render(&vespa(), &ImageResource::from_bytes(b"nope".to_vec()))
        .unwrap_err();
    assert!(matches!(err, CertError::ResourceLoad(_)));
    assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn repeated_renders_are_identical() {
    let comp = Compositor::new(small_layout(), Box::new(CanvasRenderer::new(None)));
    let req = CertificateRequest::new("", "").unwrap();
    let a = comp.render(&req, &png_background()).unwrap();
    let b = comp.render(&req, &png_background()).unwrap();
    assert_eq!(a.bytes(), b.bytes());
    assert_eq!(a.filename(), "certificate-batu-vespa-fest.png");
}

#[test]
fn size_policy_switches_extension() {
    let (primary, _) = flat(RenderStrategy::Canvas, None);
    let comp = Compositor::new(small_layout(), primary).with_encode_policy(EncodePolicy {
        png_max_bytes: 1,
        jpeg_quality: 85,
    });
    let artifact = comp.render(&vespa(), &png_background()).unwrap();
    assert_eq!(artifact.format(), ArtifactFormat::Jpeg);
    assert_eq!(artifact.filename(), "certificate-vespa-club-x.jpg");
}

#[test]
fn preview_embeds_background_and_text() {
    let (primary, _) = flat(RenderStrategy::Canvas, None);
    let comp = Compositor::new(small_layout(), primary);
    let svg = comp.preview(&vespa(), &png_background()).unwrap();
    assert!(svg.contains("VESPA CLUB X"));
    assert!(svg.contains("Malang"));
    assert!(svg.contains(r#"width="120" height="80""#));
}
