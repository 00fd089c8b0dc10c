use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::{
    core::premultiply_rgba8_in_place,
    error::{CertError, CertResult},
};

/// Where the certificate background comes from. Treated as read-only.
#[derive(Clone, Debug)]
pub enum ImageResource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

impl ImageResource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::new(bytes.into()))
    }

    /// Read the encoded bytes and sniff the container without decoding pixels.
    pub fn read_encoded(&self) -> CertResult<EncodedImage> {
        let bytes = match self {
            Self::Path(p) => Arc::new(read_resource(p)?),
            Self::Bytes(b) => b.clone(),
        };
        let format = image::guess_format(&bytes).map_err(|e| {
            CertError::resource_load(format!("unrecognized background format: {e}"))
        })?;
        Ok(EncodedImage { bytes, format })
    }

    /// Read and decode the resource. Any failure is a [`CertError::ResourceLoad`].
    pub fn load(&self) -> CertResult<BackgroundImage> {
        decode_background(self.read_encoded()?)
    }
}

/// Background bytes as stored, with the sniffed container format.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub bytes: Arc<Vec<u8>>,
    pub format: image::ImageFormat,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Decoded background in premultiplied RGBA8, plus the original encoded bytes.
#[derive(Clone, Debug)]
pub struct BackgroundImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
    pub source: EncodedImage,
}

fn read_resource(path: &Path) -> CertResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        CertError::resource_load(format!("read background '{}': {e}", path.display()))
    })
}

pub fn decode_background(source: EncodedImage) -> CertResult<BackgroundImage> {
    let dyn_img = image::load_from_memory_with_format(&source.bytes, source.format)
        .map_err(|e| CertError::resource_load(format!("decode background: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(CertError::resource_load("background image is empty"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(BackgroundImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
        source,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
