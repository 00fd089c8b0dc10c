use crate::foundation::core::{Affine, Canvas, Vec2};

/// Uniform scale + centered offset that makes an image cover the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub offset: Vec2,
}

impl CoverFit {
    /// Pick whichever of fit-by-width / fit-by-height fully covers `canvas` and center
    /// the overflow on the other axis.
    pub fn compute(canvas: Canvas, image_width: u32, image_height: u32) -> Self {
        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        let iw = f64::from(image_width.max(1));
        let ih = f64::from(image_height.max(1));

        let scale = (cw / iw).max(ch / ih);
        let offset = Vec2::new((cw - iw * scale) / 2.0, (ch - ih * scale) / 2.0);
        Self { scale, offset }
    }

    /// Image-space to canvas-space transform.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cover.rs"]
mod tests;
