use std::{io::Read as _, sync::Arc, time::Duration};

use anyhow::anyhow;

use crate::{
    composition::request::CertificateRequest,
    foundation::error::{CertError, CertResult},
    logger::store::TabularStore,
    service::issuer::Issuer,
};

const MAX_BODY_BYTES: u64 = 64 * 1024;
/// How long `/api/submit-form` waits for the append before answering.
pub const DEFAULT_SUBMIT_WAIT: Duration = Duration::from_secs(2);

/// Transport-independent response.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            headers: Vec::new(),
            body: value.to_string().into_bytes(),
        }
    }

    fn error(status: u16, msg: impl Into<String>) -> Self {
        Self::json(status, serde_json::json!({ "error": msg.into() }))
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, serde::Deserialize)]
struct SubmitForm {
    #[serde(rename = "namaPeserta")]
    participant_name: Option<String>,
    #[serde(rename = "description")]
    affiliation: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct VerifySubmission {
    #[serde(rename = "sheetId")]
    sheet_id: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Routes for the submission API and certificate downloads.
pub struct HttpService<S> {
    issuer: Issuer<S>,
    submit_wait: Duration,
}

impl<S: TabularStore + 'static> HttpService<S> {
    pub fn new(issuer: Issuer<S>) -> Self {
        Self {
            issuer,
            submit_wait: DEFAULT_SUBMIT_WAIT,
        }
    }

    /// Cap on how long a submission waits for its row. A slower append keeps running
    /// in the background and the reply says `"logged": false`.
    pub fn with_submit_wait(mut self, wait: Duration) -> Self {
        self.submit_wait = wait;
        self
    }

    pub async fn route(&self, method: &str, url: &str, body: &[u8]) -> Reply {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        match (method, path) {
            ("POST", "/api/submit-form") => self.submit_form(body).await,
            ("POST", "/api/verify-submission") => verify_submission(body),
            ("GET", "/api/certificate") => self.certificate(query).await,
            ("GET", "/api/preview") => self.preview(query).await,
            _ => Reply::error(404, "Not found"),
        }
    }

    async fn submit_form(&self, body: &[u8]) -> Reply {
        let Ok(form) = serde_json::from_slice::<SubmitForm>(body) else {
            return Reply::error(500, "Failed to submit form data");
        };
        let (Some(name), Some(affiliation)) = (form.participant_name, form.affiliation) else {
            return Reply::error(400, "Missing required fields");
        };
        let req = match CertificateRequest::new_required(name, affiliation) {
            Ok(r) => r,
            Err(e) => return Reply::error(400, validation_message(&e)),
        };

        // Logging is best effort: the submission succeeds either way.
        let append = self.issuer.submit_detached(&req);
        let logged = matches!(
            tokio::time::timeout(self.submit_wait, append).await,
            Ok(Ok(Ok(_)))
        );
        Reply::json(200, serde_json::json!({ "success": true, "logged": logged }))
    }

    async fn certificate(&self, query: &str) -> Reply {
        let req = match request_from_query(query) {
            Ok(r) => r,
            Err(e) => return Reply::error(400, validation_message(&e)),
        };
        match self.issuer.render(&req).await {
            Ok(artifact) => Reply {
                status: 200,
                content_type: artifact.format().mime_type(),
                headers: vec![(
                    "Content-Disposition".to_string(),
                    format!("attachment; filename=\"{}\"", artifact.filename()),
                )],
                body: artifact.into_bytes(),
            },
            Err(e) => {
                tracing::error!(error = %e, "certificate render failed");
                Reply::error(500, e.to_string())
            }
        }
    }

    async fn preview(&self, query: &str) -> Reply {
        let req = match request_from_query(query) {
            Ok(r) => r,
            Err(e) => return Reply::error(400, validation_message(&e)),
        };
        match self.issuer.preview(&req).await {
            Ok(svg) => Reply {
                status: 200,
                content_type: "image/svg+xml",
                headers: Vec::new(),
                body: svg.into_bytes(),
            },
            Err(e) => Reply::error(500, e.to_string()),
        }
    }
}

fn verify_submission(body: &[u8]) -> Reply {
    match serde_json::from_slice::<VerifySubmission>(body) {
        Ok(v) => {
            tracing::info!(sheet_id = v.sheet_id.as_deref().unwrap_or(""), "verification request");
            Reply::json(
                200,
                serde_json::json!({
                    "success": true,
                    "message": "Verification request received",
                    "data": v.data,
                }),
            )
        }
        Err(_) => Reply::json(
            500,
            serde_json::json!({
                "success": false,
                "error": "Failed to process verification request",
            }),
        ),
    }
}

fn request_from_query(query: &str) -> CertResult<CertificateRequest> {
    let mut name = String::new();
    let mut affiliation = String::new();
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        match k.as_ref() {
            "namaPeserta" => name = v.into_owned(),
            "desc" => affiliation = v.into_owned(),
            _ => {}
        }
    }
    CertificateRequest::new(name, affiliation)
}

fn validation_message(e: &CertError) -> String {
    match e {
        CertError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

pub fn bind(addr: &str) -> CertResult<tiny_http::Server> {
    tiny_http::Server::http(addr).map_err(|e| CertError::Other(anyhow!("bind '{addr}': {e}")))
}

/// Accept requests on `server` until it shuts down, handling each on `rt`.
pub fn serve<S>(server: tiny_http::Server, service: Arc<HttpService<S>>, rt: &tokio::runtime::Handle)
where
    S: TabularStore + 'static,
{
    tracing::info!(addr = %server.server_addr(), "listening");
    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if let Err(e) = request
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
        {
            tracing::warn!(error = %e, "failed to read request body");
            continue;
        }
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();
        let service = service.clone();

        rt.spawn(async move {
            let reply = service.route(&method, &url, &body).await;
            let path = url.split('?').next().unwrap_or("");
            tracing::info!(method = %method, path, status = reply.status, "request");
            let _ = tokio::task::spawn_blocking(move || respond(request, reply)).await;
        });
    }
}

fn respond(request: tiny_http::Request, reply: Reply) {
    let mut response = tiny_http::Response::from_data(reply.body).with_status_code(reply.status);
    let headers = std::iter::once(("Content-Type".to_string(), reply.content_type.to_string()))
        .chain(reply.headers);
    for (k, v) in headers {
        if let Ok(h) = tiny_http::Header::from_bytes(k.as_bytes(), v.as_bytes()) {
            response.add_header(h);
        }
    }
    if let Err(e) = request.respond(response) {
        tracing::warn!(error = %e, "failed to write response");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/http.rs"]
mod tests;
