use std::io::Cursor;

use image::ImageEncoder as _;

use crate::{
    encode::artifact::ArtifactFormat,
    foundation::{
        core::unpremultiply_rgba8_in_place,
        error::{CertError, CertResult},
    },
    render::backend::RenderedSurface,
};

/// Output size bound: PNGs larger than `png_max_bytes` are re-encoded as JPEG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodePolicy {
    pub png_max_bytes: usize,
    pub jpeg_quality: u8,
}

impl Default for EncodePolicy {
    fn default() -> Self {
        Self {
            png_max_bytes: 1_500_000,
            jpeg_quality: 85,
        }
    }
}

impl EncodePolicy {
    pub fn validate(&self) -> CertResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CertError::config("jpeg_quality must be in 1..=100"));
        }
        if self.png_max_bytes == 0 {
            return Err(CertError::config("png_max_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Encoded bytes plus the container actually used.
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: ArtifactFormat,
}

pub fn encode_surface(surface: &RenderedSurface, policy: EncodePolicy) -> CertResult<Encoded> {
    let (w, h) = (surface.canvas.width, surface.canvas.height);
    if surface.rgba8_premul.len() != surface.canvas.byte_len_rgba8() {
        return Err(CertError::render("surface byte length mismatch"));
    }

    let mut rgba = surface.rgba8_premul.clone();
    unpremultiply_rgba8_in_place(&mut rgba);

    let png = encode_png(&rgba, w, h)?;
    if png.len() <= policy.png_max_bytes {
        return Ok(Encoded {
            bytes: png,
            format: ArtifactFormat::Png,
        });
    }

    let jpeg = encode_jpeg(&rgba, w, h, policy.jpeg_quality)?;
    tracing::debug!(
        png_bytes = png.len(),
        jpeg_bytes = jpeg.len(),
        limit = policy.png_max_bytes,
        "png over size limit, re-encoded as jpeg"
    );
    Ok(Encoded {
        bytes: jpeg,
        format: ArtifactFormat::Jpeg,
    })
}

fn encode_png(rgba: &[u8], w: u32, h: u32) -> CertResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut buf))
        .write_image(rgba, w, h, image::ExtendedColorType::Rgba8)
        .map_err(|e| CertError::render(format!("encode png: {e}")))?;
    Ok(buf)
}

/// JPEG has no alpha; pixels are flattened onto white first.
fn encode_jpeg(rgba: &[u8], w: u32, h: u32, quality: u8) -> CertResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        for &c in &px[..3] {
            rgb.push(((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality)
        .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|e| CertError::render(format!("encode jpeg: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image.rs"]
mod tests;
