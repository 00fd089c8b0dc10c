/// Convenience result type used across certcraft.
pub type CertResult<T> = Result<T, CertError>;

/// Top-level error taxonomy used by compositor and configuration APIs.
///
/// Logger failures are deliberately not part of this enum, see [`crate::LogError`].
#[derive(thiserror::Error, Debug)]
pub enum CertError {
    /// Input exceeded a length bound or a required field was missing.
    #[error("validation error: {0}")]
    Validation(String),

    /// Background image or font could not be read or decoded.
    #[error("resource load error: {0}")]
    ResourceLoad(String),

    /// Drawing surface or encoder failure.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration file or value.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CertError {
    /// Build a [`CertError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CertError::ResourceLoad`] value.
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Build a [`CertError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CertError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a secondary render strategy may be attempted after this error.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
