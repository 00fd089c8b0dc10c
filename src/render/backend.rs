use crate::{
    assets::decode::BackgroundImage,
    composition::layout::RenderSpec,
    foundation::{core::Canvas, error::CertResult},
};

/// Which strategy produced a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Vector rasterizer drawing directly onto the fixed canvas.
    Canvas,
    /// Rasterized preview markup. Lower fidelity, no explicit font control.
    SvgSnapshot,
}

/// Rendered but not yet encoded pixels.
#[derive(Clone, Debug)]
pub struct RenderedSurface {
    pub canvas: Canvas,
    /// Row-major premultiplied RGBA8, `canvas.width * canvas.height * 4` bytes.
    pub rgba8_premul: Vec<u8>,
    pub strategy: RenderStrategy,
}

/// A way of turning a [`RenderSpec`] and a decoded background into pixels.
///
/// Implementations own no surface after returning; every call allocates its own.
pub trait Renderer: Send + Sync {
    fn strategy(&self) -> RenderStrategy;

    fn render(&self, spec: &RenderSpec, background: &BackgroundImage)
    -> CertResult<RenderedSurface>;
}
