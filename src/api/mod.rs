//! Analysis Backend Client
//!
//! The OCR and ingredient risk classification live in a remote service; this
//! module speaks its HTTP contract. A scan submission is one multipart POST
//! carrying the image bytes in a single `file` field. The service answers
//! 2xx with a [`ScanResult`] body or non-2xx with `{"detail": ...}`.

pub mod models;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::acquire::SelectedImage;
use models::{ErrorBody, Ingredient, IngredientCatalog, ScanFeed, ScanResult};

/// Failure of one scan submission
#[derive(Debug, Error)]
pub enum ScanError {
    /// Network or connection failure; nothing reached the service
    #[error("could not reach the analysis service")]
    Transport(String),

    /// The service rejected the submission with a non-2xx status
    #[error("{detail}")]
    Submission { status: u16, detail: String },

    /// The service answered 2xx but the body did not parse
    #[error("the analysis service returned an unexpected response")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScanError::InvalidResponse(err.to_string())
        } else {
            ScanError::Transport(err.to_string())
        }
    }
}

/// Capability interface the scan orchestrator depends on
#[async_trait]
pub trait AnalysisClient {
    /// Submit one label image and await its analysis.
    async fn scan_label(&self, image: &SelectedImage) -> Result<ScanResult, ScanError>;
}

/// HTTP client for the analysis service
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether the service is reachable.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Fetch the known-ingredient reference catalog.
    pub async fn known_ingredients(&self) -> Result<Vec<Ingredient>, ScanError> {
        let url = format!("{}/api/ingredients", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let resp = check_status(resp).await?;
        let catalog: IngredientCatalog = resp.json().await?;
        Ok(catalog.ingredients)
    }

    /// Fetch the server-side scan feed.
    pub async fn recent_scans(&self) -> Result<Vec<ScanResult>, ScanError> {
        let url = format!("{}/api/scans", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let resp = check_status(resp).await?;
        let feed: ScanFeed = resp.json().await?;
        Ok(feed.scans)
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn scan_label(&self, image: &SelectedImage) -> Result<ScanResult, ScanError> {
        let url = format!("{}/api/scan", self.base_url);
        debug!(
            "Submitting {} byte {} payload to {}",
            image.len(),
            image.mime_type,
            url
        );

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        let resp = check_status(resp).await?;

        let result: ScanResult = resp.json().await?;
        debug!(
            "Scan {} analyzed in {:.2}s ({} ingredients)",
            result.scan_id,
            result.processing_time,
            result.parsed_ingredients.len()
        );
        Ok(result)
    }
}

/// Turn a non-2xx response into a [`ScanError::Submission`], pulling the
/// failure detail out of the body when it is there.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ScanError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| format!("the analysis service returned HTTP {}", status.as_u16()));

    warn!("Analysis service answered {}: {}", status, detail);
    Err(ScanError::Submission {
        status: status.as_u16(),
        detail,
    })
}
