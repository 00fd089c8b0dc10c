use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    assets::{
        decode::ImageResource,
        fonts::FontSource,
    },
    composition::layout::LayoutConfig,
    encode::image::EncodePolicy,
    foundation::error::{CertError, CertResult},
    logger::{
        credential::TokenSource,
        record::RecordLogger,
        retry::RetryPolicy,
        sheets::{DEFAULT_SHEETS_ENDPOINT, GoogleSheetsStore},
        store::{TabularStore, TracingStore},
    },
    render::{
        cpu::CanvasRenderer,
        pipeline::{Compositor, DEFAULT_FILENAME_SLUG},
        svg::SvgSnapshotRenderer,
    },
};

/// Environment variable holding a service-account JSON key.
pub const SERVICE_ACCOUNT_KEY_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub background: PathBuf,
    /// `None` picks a bold sans-serif face from the system font database.
    pub font: Option<PathBuf>,
    pub default_slug: String,
    /// Rasterize the preview markup when the canvas renderer fails.
    pub snapshot_fallback: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            background: PathBuf::from("public/template-vespa-certificate.jpeg"),
            font: None,
            default_slug: DEFAULT_FILENAME_SLUG.to_string(),
            snapshot_fallback: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Without a spreadsheet id rows only go to the log.
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub endpoint: String,
    pub token: TokenSource,
    pub timeout_ms: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: "Sheet1".to_string(),
            endpoint: DEFAULT_SHEETS_ENDPOINT.to_string(),
            token: TokenSource::default(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Longest a submission reply waits for its row to be appended.
    pub submit_wait_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            submit_wait_ms: 2_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Whole-application configuration. Every field has a default, so `{}` is a valid file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutConfig,
    pub encode: EncodePolicy,
    pub assets: AssetsConfig,
    pub sheets: SheetsConfig,
    pub retry: RetryPolicy,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from an optional JSON file, apply environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> CertResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> CertResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| CertError::config(format!("parse config '{}': {e}", path.display())))
    }

    /// Apply overrides from `lookup` (the process environment outside tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("GOOGLE_SHEET_ID") {
            self.sheets.spreadsheet_id = Some(v);
        }
        if let Some(v) = non_empty("GOOGLE_SHEET_NAME") {
            self.sheets.sheet_name = v;
        }
        if non_empty(SERVICE_ACCOUNT_KEY_ENV).is_some() {
            self.sheets.token = TokenSource::ServiceAccount {
                key_env: SERVICE_ACCOUNT_KEY_ENV.to_string(),
            };
        }
        if let Some(v) = non_empty("CERTCRAFT_TOKEN_ENV") {
            self.sheets.token = TokenSource::Env { var: v };
        }
        if let Some(v) = non_empty("CERTCRAFT_BACKGROUND") {
            self.assets.background = PathBuf::from(v);
        }
        if let Some(v) = non_empty("CERTCRAFT_FONT") {
            self.assets.font = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty("CERTCRAFT_ADDR") {
            self.server.addr = v;
        }
    }

    pub fn validate(&self) -> CertResult<()> {
        self.layout.validate()?;
        self.encode.validate()?;
        self.retry.validate()?;
        if self.sheets.sheet_name.trim().is_empty() {
            return Err(CertError::config("sheets.sheet_name must be non-empty"));
        }
        if self.sheets.timeout_ms == 0 {
            return Err(CertError::config("sheets.timeout_ms must be > 0"));
        }
        Ok(())
    }

    pub fn background(&self) -> ImageResource {
        ImageResource::from_path(&self.assets.background)
    }

    pub fn font_source(&self) -> FontSource {
        match &self.assets.font {
            Some(p) => FontSource::Path(p.clone()),
            None => FontSource::System,
        }
    }

    pub fn build_compositor(&self) -> CertResult<Compositor> {
        let primary = CanvasRenderer::from_font_source(&self.font_source())?;
        let mut compositor = Compositor::new(self.layout.clone(), Box::new(primary))
            .with_encode_policy(self.encode)
            .with_default_slug(self.assets.default_slug.clone());
        if self.assets.snapshot_fallback {
            compositor = compositor.with_fallback(Box::new(SvgSnapshotRenderer::with_system_fonts()));
        }
        Ok(compositor)
    }

    pub fn build_store(&self) -> Box<dyn TabularStore> {
        match &self.sheets.spreadsheet_id {
            Some(id) => Box::new(
                GoogleSheetsStore::new(id.clone(), self.sheets.sheet_name.clone(), self.sheets.token.clone())
                    .with_endpoint(self.sheets.endpoint.clone())
                    .with_timeout(Duration::from_millis(self.sheets.timeout_ms)),
            ),
            None => Box::new(TracingStore),
        }
    }

    pub fn build_logger(&self) -> RecordLogger<Box<dyn TabularStore>> {
        RecordLogger::new(self.build_store(), self.retry)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
