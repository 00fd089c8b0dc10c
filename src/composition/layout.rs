use crate::{
    composition::request::CertificateRequest,
    foundation::core::{Canvas, NormPoint, Rgba8},
    foundation::error::{CertError, CertResult},
};

/// Styling for one text line on the certificate.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextStyle {
    pub position: NormPoint,
    pub font_size_px: f32,
    pub fill: Rgba8,
    pub stroke: Rgba8,
    pub stroke_width_px: f32,
}

impl TextStyle {
    fn at(x: f64, y: f64) -> Self {
        Self {
            position: NormPoint { x, y },
            ..Self::default()
        }
    }

    fn validate(&self, what: &str) -> CertResult<()> {
        self.position
            .validate()
            .map_err(|e| CertError::config(format!("{what}: {e}")))?;
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(CertError::config(format!(
                "{what}: font_size_px must be finite and > 0"
            )));
        }
        if !self.stroke_width_px.is_finite() || self.stroke_width_px < 0.0 {
            return Err(CertError::config(format!(
                "{what}: stroke_width_px must be finite and >= 0"
            )));
        }
        Ok(())
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            position: NormPoint { x: 0.5, y: 0.5 },
            font_size_px: 36.0,
            fill: Rgba8::BLACK,
            stroke: Rgba8::rgba(255, 255, 255, 178),
            stroke_width_px: 3.0,
        }
    }
}

/// Fixed layout constants for the certificate template.
///
/// Deserializes field by field over [`LayoutConfig::default`], so a config that only sets
/// `participant_name.font_size_px` keeps that line's default position and colors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "LayoutOverrides")]
pub struct LayoutConfig {
    pub canvas: Canvas,
    pub participant_name: TextStyle,
    pub affiliation: TextStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            participant_name: TextStyle::at(0.5, 0.53),
            affiliation: TextStyle::at(0.5, 0.60),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> CertResult<()> {
        self.canvas
            .validate()
            .map_err(|e| CertError::config(e.to_string()))?;
        self.participant_name.validate("participant_name")?;
        self.affiliation.validate("affiliation")?;
        Ok(())
    }
}

#[derive(Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LayoutOverrides {
    canvas: Option<Canvas>,
    participant_name: TextStyleOverrides,
    affiliation: TextStyleOverrides,
}

#[derive(Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TextStyleOverrides {
    position: Option<NormPoint>,
    font_size_px: Option<f32>,
    fill: Option<Rgba8>,
    stroke: Option<Rgba8>,
    stroke_width_px: Option<f32>,
}

impl TextStyleOverrides {
    fn apply(self, base: TextStyle) -> TextStyle {
        TextStyle {
            position: self.position.unwrap_or(base.position),
            font_size_px: self.font_size_px.unwrap_or(base.font_size_px),
            fill: self.fill.unwrap_or(base.fill),
            stroke: self.stroke.unwrap_or(base.stroke),
            stroke_width_px: self.stroke_width_px.unwrap_or(base.stroke_width_px),
        }
    }
}

impl From<LayoutOverrides> for LayoutConfig {
    fn from(o: LayoutOverrides) -> Self {
        let base = Self::default();
        Self {
            canvas: o.canvas.unwrap_or(base.canvas),
            participant_name: o.participant_name.apply(base.participant_name),
            affiliation: o.affiliation.apply(base.affiliation),
        }
    }
}

/// One string to draw, with its resolved style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub position: NormPoint,
    pub font_size_px: f32,
    pub fill: Rgba8,
    pub stroke: Rgba8,
    pub stroke_width_px: f32,
}

impl TextPlacement {
    fn new(text: String, style: &TextStyle) -> Self {
        Self {
            text,
            position: style.position,
            font_size_px: style.font_size_px,
            fill: style.fill,
            stroke: style.stroke,
            stroke_width_px: style.stroke_width_px,
        }
    }
}

/// Everything a renderer needs besides the background pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSpec {
    pub canvas: Canvas,
    pub placements: Vec<TextPlacement>,
}

impl RenderSpec {
    /// Derive the draw list for `req`. Empty fields produce no placement.
    pub fn derive(req: &CertificateRequest, layout: &LayoutConfig) -> Self {
        let mut placements = Vec::with_capacity(2);
        if !req.participant_name().trim().is_empty() {
            placements.push(TextPlacement::new(
                req.participant_name().to_uppercase(),
                &layout.participant_name,
            ));
        }
        if !req.affiliation().trim().is_empty() {
            placements.push(TextPlacement::new(
                req.affiliation().to_string(),
                &layout.affiliation,
            ));
        }
        Self {
            canvas: layout.canvas,
            placements,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/layout.rs"]
mod tests;
