use std::time::Duration;

use anyhow::{Context as _, bail};
use chrono::{DateTime, Utc};

use crate::logger::credential::Secret;

/// OAuth scope for reading and writing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// The parts of a Google service-account JSON key used for the JWT-bearer grant.
#[derive(Clone, serde::Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let key: Self = serde_json::from_str(raw).context("parse service account key")?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            bail!("service account key lacks client_email or private_key");
        }
        Ok(key)
    }

    /// RS256-signed assertion for `scope`, valid for one hour from `now`.
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = jsonwebtoken::EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("parse service account private key")?;
        jsonwebtoken::encode(&header, &claims, &key).context("sign service account assertion")
    }

    /// Trade a fresh assertion for an access token at `token_uri`.
    pub async fn exchange(&self, scope: &str) -> anyhow::Result<Secret> {
        let assertion = self.assertion(scope, Utc::now())?;
        let client = reqwest::Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .build()
            .context("build token http client")?;

        let resp = client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("send token request to '{}'", self.token_uri))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(256).collect();
            bail!("token exchange returned {status}: {body}");
        }
        let token: TokenResponse = resp.json().await.context("parse token response")?;
        Ok(Secret::new(token.access_token))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/logger/service_account.rs"]
mod tests;
