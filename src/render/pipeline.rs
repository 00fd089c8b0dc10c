use crate::{
    assets::decode::{BackgroundImage, ImageResource},
    composition::{
        layout::{LayoutConfig, RenderSpec},
        request::CertificateRequest,
    },
    encode::{
        artifact::{CertificateArtifact, artifact_filename},
        image::{EncodePolicy, encode_surface},
    },
    foundation::error::CertResult,
    render::{backend::Renderer, svg::preview_svg},
};

/// Filename slug used when the participant name slugs to nothing.
pub const DEFAULT_FILENAME_SLUG: &str = "batu-vespa-fest";

/// Certificate compositor: a primary renderer plus an optional lower-fidelity fallback.
///
/// Only [`crate::CertError::Render`] from the primary selects the fallback. Load and validation
/// errors surface as-is. Both strategies share the canvas and the filename convention.
pub struct Compositor {
    layout: LayoutConfig,
    encode: EncodePolicy,
    default_slug: String,
    primary: Box<dyn Renderer>,
    fallback: Option<Box<dyn Renderer>>,
}

impl Compositor {
    pub fn new(layout: LayoutConfig, primary: Box<dyn Renderer>) -> Self {
        Self {
            layout,
            encode: EncodePolicy::default(),
            default_slug: DEFAULT_FILENAME_SLUG.to_string(),
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn Renderer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_encode_policy(mut self, encode: EncodePolicy) -> Self {
        self.encode = encode;
        self
    }

    pub fn with_default_slug(mut self, slug: impl Into<String>) -> Self {
        self.default_slug = slug.into();
        self
    }

    /// Composite `req` onto `background` and encode the result.
    #[tracing::instrument(skip_all, fields(strategy))]
    pub fn render(
        &self,
        req: &CertificateRequest,
        background: &ImageResource,
    ) -> CertResult<CertificateArtifact> {
        let bg = background.load()?;
        let spec = RenderSpec::derive(req, &self.layout);

        let artifact = match self.produce(self.primary.as_ref(), req, &spec, &bg) {
            Ok(a) => a,
            Err(e) if e.allows_fallback() => {
                let Some(fallback) = self.fallback.as_deref() else {
                    return Err(e);
                };
                tracing::warn!(
                    error = %e,
                    primary = ?self.primary.strategy(),
                    fallback = ?fallback.strategy(),
                    "primary renderer failed, using fallback"
                );
                self.produce(fallback, req, &spec, &bg)?
            }
            Err(e) => return Err(e),
        };

        tracing::Span::current().record("strategy", tracing::field::debug(artifact.strategy()));
        tracing::debug!(
            filename = artifact.filename(),
            bytes = artifact.bytes().len(),
            "certificate rendered"
        );
        Ok(artifact)
    }

    /// Preview markup for `req`, the same document the snapshot strategy rasterizes.
    pub fn preview(&self, req: &CertificateRequest, background: &ImageResource) -> CertResult<String> {
        let encoded = background.read_encoded()?;
        let spec = RenderSpec::derive(req, &self.layout);
        Ok(preview_svg(&spec, &encoded))
    }

    fn produce(
        &self,
        renderer: &dyn Renderer,
        req: &CertificateRequest,
        spec: &RenderSpec,
        bg: &BackgroundImage,
    ) -> CertResult<CertificateArtifact> {
        let surface = renderer.render(spec, bg)?;
        let encoded = encode_surface(&surface, self.encode)?;
        let filename = artifact_filename(req.participant_name(), &self.default_slug, encoded.format);
        Ok(CertificateArtifact::new(
            encoded.bytes,
            surface.canvas.width,
            surface.canvas.height,
            encoded.format,
            filename,
            surface.strategy,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
