//! HTTP implementation of the dataset service client.
//!
//! Routes (relative to the configured base URL, default
//! `http://localhost:8000/api`):
//! - `POST /upload` — multipart form, field `file`
//! - `POST /schema-map` — JSON `{dataset_id, mapping}`
//! - `POST /clean/{dataset_id}` — JSON body is the cleaning configuration
//! - `POST /analyze/{dataset_id}?weight_col=<optional>` — no body
//!
//! On a non-2xx status the surfaced error is the raw response body text; the
//! backend has no structured error schema.

use crate::config::models::ServiceConfig;
use crate::service::base::{ColumnMapping, DatasetService, ServiceError};
use async_trait::async_trait;
use dk_protocol::{AnalysisReport, CleanResponse, CleaningConfig, UploadResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Reqwest-backed dataset service client.
pub struct HttpDatasetService {
    client: Client,
    base_url: String,
}

impl HttpDatasetService {
    /// Create a new client from service configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transport` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a successful response, or surface the body text of a failed one.
    async fn read_ok<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("Request failed with status {status}")
            } else {
                body
            };
            warn!(%status, "dataset service returned an error");
            return Err(ServiceError::Api(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

#[async_trait]
impl DatasetService for HttpDatasetService {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse, ServiceError> {
        debug!(filename, size = bytes.len(), "uploading dataset");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Self::read_ok(response).await
    }

    async fn create_schema_map(
        &self,
        dataset_id: &str,
        mapping: &ColumnMapping,
    ) -> Result<Value, ServiceError> {
        debug!(dataset_id, columns = mapping.len(), "creating schema map");

        let response = self
            .client
            .post(self.url("/schema-map"))
            .json(&serde_json::json!({
                "dataset_id": dataset_id,
                "mapping": mapping,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Self::read_ok(response).await
    }

    async fn clean(
        &self,
        dataset_id: &str,
        config: &CleaningConfig,
    ) -> Result<CleanResponse, ServiceError> {
        debug!(dataset_id, "cleaning dataset");

        let response = self
            .client
            .post(self.url(&format!("/clean/{dataset_id}")))
            .json(config)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Self::read_ok(response).await
    }

    async fn analyze(
        &self,
        dataset_id: &str,
        weight_col: Option<&str>,
    ) -> Result<AnalysisReport, ServiceError> {
        debug!(dataset_id, ?weight_col, "analyzing dataset");

        let mut request = self.client.post(self.url(&format!("/analyze/{dataset_id}")));
        if let Some(col) = weight_col {
            request = request.query(&[("weight_col", col)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Self::read_ok(response).await
    }
}
