use std::sync::Arc;

use anyhow::anyhow;

use crate::{
    assets::decode::ImageResource,
    composition::request::CertificateRequest,
    encode::artifact::CertificateArtifact,
    foundation::error::{CertError, CertResult},
    logger::{
        entry::LogEntry,
        record::{Ack, LogError, RecordLogger},
        store::TabularStore,
    },
    render::pipeline::Compositor,
};

/// Outcome of [`Issuer::issue`]: the artifact plus the best-effort log result.
#[derive(Debug)]
pub struct Issued {
    pub artifact: CertificateArtifact,
    pub log: Result<Ack, LogError>,
}

/// Runs the compositor and the record logger for one request.
///
/// The two never share state and a logging failure never withholds the certificate.
pub struct Issuer<S> {
    compositor: Arc<Compositor>,
    logger: Arc<RecordLogger<S>>,
    background: ImageResource,
}

impl<S: TabularStore> Issuer<S> {
    pub fn new(compositor: Compositor, logger: RecordLogger<S>, background: ImageResource) -> Self {
        Self {
            compositor: Arc::new(compositor),
            logger: Arc::new(logger),
            background,
        }
    }

    /// Render on the blocking pool so the async caller keeps making progress.
    pub async fn render(&self, req: &CertificateRequest) -> CertResult<CertificateArtifact> {
        let compositor = self.compositor.clone();
        let background = self.background.clone();
        let req = req.clone();
        tokio::task::spawn_blocking(move || compositor.render(&req, &background))
            .await
            .map_err(|e| CertError::Other(anyhow!("render task failed: {e}")))?
    }

    /// Preview markup, built on the blocking pool like [`Issuer::render`].
    pub async fn preview(&self, req: &CertificateRequest) -> CertResult<String> {
        let compositor = self.compositor.clone();
        let background = self.background.clone();
        let req = req.clone();
        tokio::task::spawn_blocking(move || compositor.preview(&req, &background))
            .await
            .map_err(|e| CertError::Other(anyhow!("preview task failed: {e}")))?
    }

    /// Append `req` to the record store. Failures are logged here and returned for
    /// reporting, never escalated.
    pub async fn submit(&self, req: &CertificateRequest) -> Result<Ack, LogError> {
        record(&self.logger, LogEntry::now(req)).await
    }

    /// Like [`Issuer::submit`], but the append runs as its own task and keeps going
    /// when the returned handle is dropped.
    pub fn submit_detached(
        &self,
        req: &CertificateRequest,
    ) -> tokio::task::JoinHandle<Result<Ack, LogError>>
    where
        S: 'static,
    {
        let logger = self.logger.clone();
        let entry = LogEntry::now(req);
        tokio::spawn(async move { record(&logger, entry).await })
    }

    /// Render and log concurrently. Only compositor errors fail the call.
    #[tracing::instrument(skip_all)]
    pub async fn issue(&self, req: &CertificateRequest) -> CertResult<Issued> {
        let (artifact, log) = tokio::join!(self.render(req), self.submit(req));
        Ok(Issued {
            artifact: artifact?,
            log,
        })
    }
}

async fn record<S: TabularStore>(logger: &RecordLogger<S>, entry: LogEntry) -> Result<Ack, LogError> {
    let result = logger.append(&entry).await;
    if let Err(e) = &result {
        tracing::warn!(attempts = e.attempts, error = %e, "submission not recorded");
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/service/issuer.rs"]
mod tests;
