//! certcraft generates event certificates.
//!
//! A participant name and affiliation are composited onto a fixed background and handed back
//! as a PNG. Submissions are also appended to a spreadsheet as a best-effort record.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: `CertificateRequest` enforces the field length bounds.
//! 2. **Derive**: `CertificateRequest + LayoutConfig -> RenderSpec` (normalized placements).
//! 3. **Render**: a [`Renderer`] draws the [`RenderSpec`] over the cover-fitted background.
//! 4. **Encode**: PNG, re-encoded as JPEG when the PNG is over the size threshold.
//!
//! Logging runs beside the render through [`RecordLogger`] with bounded retry, and a log
//! failure never withholds the certificate.
#![forbid(unsafe_code)]

mod assets;
mod composition;
mod encode;
mod foundation;
mod logger;
mod render;
/// HTTP surface and the render-plus-log orchestration.
pub mod service;

pub use crate::assets::decode::{BackgroundImage, ImageResource, decode_background};
pub use crate::assets::fonts::{FontSource, LoadedFont, system_fontdb, system_sans_bold};
pub use crate::composition::layout::{LayoutConfig, RenderSpec, TextPlacement, TextStyle};
pub use crate::composition::request::{
    CertificateRequest, MAX_AFFILIATION_CHARS, MAX_PARTICIPANT_NAME_CHARS,
};
pub use crate::encode::artifact::{
    ArtifactFormat, CertificateArtifact, artifact_filename, slugify,
};
pub use crate::encode::image::EncodePolicy;
pub use crate::foundation::config::{
    AppConfig, AssetsConfig, LoggingConfig, ServerConfig, SheetsConfig,
};
pub use crate::foundation::core::{Canvas, NormPoint, Rgba8};
pub use crate::foundation::error::{CertError, CertResult};
pub use crate::foundation::logging::init_logging;
pub use crate::logger::credential::{Secret, TokenSource};
pub use crate::logger::entry::{LogEntry, format_timestamp};
pub use crate::logger::record::{Ack, LogError, RecordLogger};
pub use crate::logger::retry::RetryPolicy;
pub use crate::logger::sheets::GoogleSheetsStore;
pub use crate::logger::store::{TabularStore, TracingStore};
pub use crate::render::backend::{RenderStrategy, RenderedSurface, Renderer};
pub use crate::render::cpu::CanvasRenderer;
pub use crate::render::pipeline::{Compositor, DEFAULT_FILENAME_SLUG};
pub use crate::render::svg::{SvgSnapshotRenderer, preview_svg};
pub use crate::service::http::{HttpService, Reply};
pub use crate::service::issuer::{Issued, Issuer};
