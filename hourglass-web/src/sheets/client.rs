//! Google Sheets v4 values-API client
//!
//! Talks to a configurable base URL so tests and self-hosted mirrors can
//! point it elsewhere. Authentication uses a pre-issued bearer token read
//! from the configured credentials file; token issuance for the service
//! account happens outside this application.

use hourglass_common::config::SheetsConfig;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Spreadsheet client errors
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Credentials error: {0}")]
    Credentials(String),
}

/// Shape of the credentials file: `{"access_token": "..."}`
#[derive(Debug, Deserialize)]
struct Credentials {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Client for one spreadsheet
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    /// Build a client from configuration
    ///
    /// Returns `Ok(None)` when the mirror is disabled or unusable
    /// (no spreadsheet id, no credentials); the application runs without it.
    pub fn from_config(config: &SheetsConfig) -> Result<Option<Self>, SheetsError> {
        if !config.enabled {
            return Ok(None);
        }
        if config.spreadsheet_id.is_empty() {
            warn!("Sheets mirror enabled but no spreadsheet_id configured; mirror disabled");
            return Ok(None);
        }
        let Some(credentials_path) = &config.credentials_path else {
            warn!("Sheets mirror enabled but no credentials_path configured; mirror disabled");
            return Ok(None);
        };

        let raw = std::fs::read_to_string(credentials_path)
            .map_err(|e| SheetsError::Credentials(format!("{}: {}", credentials_path.display(), e)))?;
        let credentials: Credentials = serde_json::from_str(&raw)
            .map_err(|e| SheetsError::Credentials(format!("Malformed credentials file: {}", e)))?;

        Ok(Some(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            token: credentials.access_token,
        }))
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Titles of the worksheets currently in the spreadsheet
    pub async fn sheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties.title",
            self.base_url, self.spreadsheet_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Add a worksheet with the given title
    pub async fn add_sheet(&self, title: &str) -> Result<(), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base_url, self.spreadsheet_id
        );
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Clear a range of values
    pub async fn clear_range(&self, range: &str) -> Result<(), SheetsError> {
        let url = format!("{}:clear", self.values_url(range));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Write rows starting at a cell, RAW input (no formula parsing)
    pub async fn update_values(
        &self,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let url = format!("{}?valueInputOption=RAW", self.values_url(range));
        let body = json!({ "values": values });
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Create any missing worksheets and their header rows
    pub async fn ensure_sheets_exist(&self) -> Result<(), SheetsError> {
        let existing = self.sheet_titles().await?;

        for (title, header) in [
            (super::PLAN_SHEET_TITLE, super::PLAN_HEADER.as_slice()),
            (super::TIMER_SHEET_TITLE, super::TIMER_HEADER.as_slice()),
        ] {
            if !existing.iter().any(|t| t == title) {
                self.add_sheet(title).await?;
                let header_row = vec![header.iter().map(|c| c.to_string()).collect()];
                self.update_values(&format!("{}!A1", title), &header_row)
                    .await?;
            }
        }

        Ok(())
    }

    /// Replace a worksheet's contents with a header plus data rows
    pub async fn overwrite_sheet(
        &self,
        title: &str,
        header: &[&str],
        rows: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        self.clear_range(&format!("{}!A1:Z", title)).await?;

        let mut values: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
        values.push(header.iter().map(|c| c.to_string()).collect());
        values.extend(rows);

        self.update_values(&format!("{}!A1", title), &values).await
    }
}
