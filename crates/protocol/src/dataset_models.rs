//! Dataset descriptors and remote dataset-service wire types.
//!
//! These structures mirror the JSON exchanged with the backend dataset
//! service. Response payloads that the orchestrator treats as opaque keep
//! unknown keys via `#[serde(flatten)]` so nothing the backend sends is lost.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// A single preview row: column name to cell value.
pub type PreviewRow = Map<String, Value>;

/// Client-side record identifying an uploaded dataset.
///
/// Created once per successful upload and immutable thereafter. The preview
/// holds the first few rows returned by the upload endpoint and is the only
/// source the orchestrator uses to derive the identity column mapping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct DatasetDescriptor {
    /// Backend-assigned dataset identifier.
    pub id: String,

    /// Original filename of the uploaded file.
    pub filename: String,

    /// Ordered sample of rows from the uploaded dataset.
    #[ts(type = "Array<Record<string, unknown>>")]
    pub preview: Vec<PreviewRow>,
}

impl DatasetDescriptor {
    /// Column names of the dataset, taken from the first preview row.
    ///
    /// Returns an empty vector when the preview is empty.
    pub fn columns(&self) -> Vec<String> {
        self.preview
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Response body of `POST /upload`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct UploadResponse {
    pub dataset_id: String,
    pub filename: String,
    #[serde(default)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub preview: Vec<PreviewRow>,
}

impl From<UploadResponse> for DatasetDescriptor {
    fn from(resp: UploadResponse) -> Self {
        Self {
            id: resp.dataset_id,
            filename: resp.filename,
            preview: resp.preview,
        }
    }
}

/// Configuration sent to `POST /clean/{dataset_id}`.
///
/// The pipeline always cleans with the same fixed configuration; `Default`
/// yields exactly that configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct CleaningConfig {
    /// Strategy for filling missing values.
    pub fill_missing: String,

    /// How outliers are treated.
    pub outlier_method: String,

    /// Whether duplicate rows are dropped.
    pub drop_duplicates: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            fill_missing: "median".to_string(),
            outlier_method: "remove".to_string(),
            drop_duplicates: true,
        }
    }
}

/// Cleaning report nested inside a [`CleanResponse`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct CleanReport {
    /// Number of rows remaining after cleaning.
    #[serde(default)]
    pub rows_after: Option<u64>,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

/// Response body of `POST /clean/{dataset_id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct CleanResponse {
    #[serde(default)]
    pub report: CleanReport,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

/// Analysis payload returned by `POST /analyze/{dataset_id}`.
///
/// Opaque to the orchestrator: it is stored as the run outcome and handed to
/// the UI untouched. Every field is optional because the backend's report
/// shape varies by dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub stats: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charts_count: Option<u32>,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}
