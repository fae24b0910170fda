//! Base DatasetService trait and supporting types.

use async_trait::async_trait;
use dk_protocol::{AnalysisReport, CleanResponse, CleaningConfig, UploadResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Column-name mapping sent to the schema-map operation.
///
/// Keys are source column names, values are target column names. The
/// orchestrator only ever builds identity mappings, but the service accepts
/// arbitrary renames.
pub type ColumnMapping = BTreeMap<String, String>;

/// Errors from the remote dataset service.
///
/// The backend exposes no structured error schema, so every failure collapses
/// to a human-readable message: the raw response body for HTTP errors, the
/// underlying error text for everything else. `Display` yields exactly that
/// message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered with a non-2xx status; the message is the raw
    /// response body text.
    #[error("{0}")]
    Api(String),

    /// The request never produced a usable response (connection failure,
    /// timeout, undecodable body).
    #[error("{0}")]
    Transport(String),
}

/// Operations exposed by the remote dataset service.
///
/// Each operation is an independent request/response call. The orchestrator
/// invokes the three post-upload operations strictly in sequence; `upload`
/// is called by the UI shell before a run starts.
#[async_trait]
pub trait DatasetService: Send + Sync {
    /// Upload a dataset file; returns the dataset id and a row preview.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse, ServiceError>;

    /// Create a schema map for an uploaded dataset. The confirmation payload
    /// is opaque to callers.
    async fn create_schema_map(
        &self,
        dataset_id: &str,
        mapping: &ColumnMapping,
    ) -> Result<Value, ServiceError>;

    /// Clean an uploaded dataset with the given configuration.
    async fn clean(
        &self,
        dataset_id: &str,
        config: &CleaningConfig,
    ) -> Result<CleanResponse, ServiceError>;

    /// Run analysis on a cleaned dataset, optionally weighted by a column.
    async fn analyze(
        &self,
        dataset_id: &str,
        weight_col: Option<&str>,
    ) -> Result<AnalysisReport, ServiceError>;
}
