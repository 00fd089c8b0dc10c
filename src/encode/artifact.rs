use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::CertResult,
    render::backend::RenderStrategy,
};

/// Encoded image container of an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Png,
    Jpeg,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// The finished certificate. Owned by the caller; nothing else keeps a copy.
#[derive(Clone, Debug)]
pub struct CertificateArtifact {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: ArtifactFormat,
    filename: String,
    strategy: RenderStrategy,
}

impl CertificateArtifact {
    pub(crate) fn new(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        format: ArtifactFormat,
        filename: String,
        strategy: RenderStrategy,
    ) -> Self {
        Self {
            bytes,
            width,
            height,
            format,
            filename,
            strategy,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Strategy that produced the pixels.
    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    /// Write the artifact into `dir` under its derived filename.
    pub fn save_in(&self, dir: &Path) -> CertResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write certificate '{}'", path.display()))?;
        Ok(path)
    }
}

/// Lowercase, whitespace runs to `-`, everything outside `[a-z0-9-]` dropped.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_sep = false;
    for ch in s.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('-');
        }
        pending_sep = false;
        out.push(ch);
    }
    out
}

/// `certificate-<slug>.<ext>`, with `default_slug` when the name slugs to nothing.
pub fn artifact_filename(participant_name: &str, default_slug: &str, format: ArtifactFormat) -> String {
    let slug = match slugify(participant_name) {
        s if s.is_empty() => slugify(default_slug),
        s => s,
    };
    let slug = if slug.is_empty() { "certificate".to_string() } else { slug };
    format!("certificate-{slug}.{}", format.extension())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
