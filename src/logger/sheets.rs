use std::time::Duration;

use anyhow::{Context as _, anyhow, bail};
use async_trait::async_trait;

use crate::logger::{credential::TokenSource, store::TabularStore};

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";

/// Google Sheets `values.append` against columns `A:C` of one sheet.
///
/// Every call builds a fresh HTTP client and resolves a fresh bearer token.
#[derive(Clone, Debug)]
pub struct GoogleSheetsStore {
    endpoint: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: TokenSource,
    timeout: Duration,
}

impl GoogleSheetsStore {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        token: TokenSource,
    ) -> Self {
        Self {
            endpoint: DEFAULT_SHEETS_ENDPOINT.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            token,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{endpoint}/v4/spreadsheets/{id}/values/{sheet}!A:C:append?valueInputOption=USER_ENTERED`
    pub fn append_url(&self) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("parse sheets endpoint '{}'", self.endpoint))?;
        let range = format!("{}!A:C:append", self.sheet_name);
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets endpoint '{}' cannot be a base", self.endpoint))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        Ok(url)
    }
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    async fn append_row(&self, row: &[String; 3]) -> anyhow::Result<()> {
        let url = self.append_url()?;
        let token = self
            .token
            .resolve()
            .await
            .context("resolve sheets credential")?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build sheets http client")?;

        let resp = client
            .post(url)
            .bearer_auth(token.expose())
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await
            .context("send sheets append request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(256).collect();
            bail!("sheets append returned {status}: {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/logger/sheets.rs"]
mod tests;
