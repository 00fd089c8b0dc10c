use std::path::PathBuf;

use anyhow::{Context as _, bail};

use crate::logger::service_account::{SHEETS_SCOPE, ServiceAccountKey};

/// Bearer credential. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Where the store's bearer token comes from. Resolved again on every append attempt;
/// nothing is cached between calls.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenSource {
    /// Read an environment variable at call time.
    Env { var: String },
    /// Re-read a file at call time.
    File { path: PathBuf },
    /// Run a command and take its trimmed stdout, e.g. `gcloud auth print-access-token`.
    Command { program: String, args: Vec<String> },
    /// Service-account JSON key held in an environment variable. Each call signs a
    /// JWT-bearer assertion and exchanges it at the key's `token_uri`.
    ServiceAccount { key_env: String },
    /// Same as `ServiceAccount`, with the key re-read from a file.
    ServiceAccountFile { path: PathBuf },
    #[serde(skip)]
    Static(Secret),
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::Env {
            var: "GOOGLE_SHEETS_ACCESS_TOKEN".to_string(),
        }
    }
}

impl TokenSource {
    pub async fn resolve(&self) -> anyhow::Result<Secret> {
        let raw = match self {
            Self::Env { var } => std::env::var(var)
                .with_context(|| format!("credential env var '{var}' is not set"))?,
            Self::File { path } => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read credential file '{}'", path.display()))?,
            Self::Command { program, args } => {
                let out = tokio::process::Command::new(program)
                    .args(args)
                    .kill_on_drop(true)
                    .output()
                    .await
                    .with_context(|| format!("spawn credential command '{program}'"))?;
                if !out.status.success() {
                    bail!(
                        "credential command '{program}' exited with {}",
                        out.status
                    );
                }
                String::from_utf8(out.stdout)
                    .with_context(|| format!("credential command '{program}' printed non-utf8"))?
            }
            Self::ServiceAccount { key_env } => {
                let raw = std::env::var(key_env).with_context(|| {
                    format!("service account env var '{key_env}' is not set")
                })?;
                return exchange_key(&raw).await;
            }
            Self::ServiceAccountFile { path } => {
                let raw = tokio::fs::read_to_string(path).await.with_context(|| {
                    format!("read service account key '{}'", path.display())
                })?;
                return exchange_key(&raw).await;
            }
            Self::Static(s) => s.expose().to_string(),
        };

        let token = raw.trim();
        if token.is_empty() {
            bail!("resolved credential is empty");
        }
        Ok(Secret::new(token))
    }
}

async fn exchange_key(raw: &str) -> anyhow::Result<Secret> {
    let key = ServiceAccountKey::from_json(raw)?;
    let token = key.exchange(SHEETS_SCOPE).await?;
    if token.expose().trim().is_empty() {
        bail!("token endpoint returned an empty access token");
    }
    Ok(token)
}

#[cfg(test)]
#[path = "../../tests/unit/logger/credential.rs"]
mod tests;
