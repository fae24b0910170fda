//! Mock dataset service for deterministic testing.

use async_trait::async_trait;
use dk_core::service::base::{ColumnMapping, DatasetService, ServiceError};
use dk_protocol::dataset_models::{AnalysisReport, CleanResponse, CleaningConfig, UploadResponse};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

/// A recorded invocation of the mock service.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum ServiceCall {
    Upload {
        filename: String,
    },
    SchemaMap {
        dataset_id: String,
        mapping: ColumnMapping,
    },
    Clean {
        dataset_id: String,
        config: CleaningConfig,
    },
    Analyze {
        dataset_id: String,
        weight_col: Option<String>,
    },
}

/// Scriptable dataset service that records every call.
///
/// By default every operation succeeds; `failing_at` makes exactly one
/// operation reject with a given message.
pub struct MockDatasetService {
    fail_on: Option<(&'static str, String)>,
    delay: Duration,
    rows_after: Option<u64>,
    report: AnalysisReport,
    calls: Mutex<Vec<ServiceCall>>,
}

#[allow(dead_code)]
impl MockDatasetService {
    pub fn succeeding() -> Self {
        Self {
            fail_on: None,
            delay: Duration::ZERO,
            rows_after: None,
            report: AnalysisReport::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the named operation (`upload`, `schema_map`, `clean`, `analyze`)
    /// with the given message.
    pub fn failing_at(op: &'static str, message: &str) -> Self {
        Self {
            fail_on: Some((op, message.to_string())),
            ..Self::succeeding()
        }
    }

    /// Add an artificial latency to every operation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report this row count from the cleaning operation.
    pub fn with_rows_after(mut self, rows: u64) -> Self {
        self.rows_after = Some(rows);
        self
    }

    /// Return this payload from the analyze operation.
    pub fn with_report(mut self, report: AnalysisReport) -> Self {
        self.report = report;
        self
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    async fn gate(&self, op: &'static str, call: ServiceCall) -> Result<(), ServiceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.lock().expect("calls lock").push(call);

        match &self.fail_on {
            Some((fail_op, message)) if *fail_op == op => {
                Err(ServiceError::Api(message.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DatasetService for MockDatasetService {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<UploadResponse, ServiceError> {
        self.gate(
            "upload",
            ServiceCall::Upload {
                filename: filename.to_string(),
            },
        )
        .await?;

        Ok(UploadResponse {
            dataset_id: "d1".to_string(),
            filename: filename.to_string(),
            preview: vec![],
        })
    }

    async fn create_schema_map(
        &self,
        dataset_id: &str,
        mapping: &ColumnMapping,
    ) -> Result<Value, ServiceError> {
        self.gate(
            "schema_map",
            ServiceCall::SchemaMap {
                dataset_id: dataset_id.to_string(),
                mapping: mapping.clone(),
            },
        )
        .await?;

        Ok(serde_json::json!({"status": "ok"}))
    }

    async fn clean(
        &self,
        dataset_id: &str,
        config: &CleaningConfig,
    ) -> Result<CleanResponse, ServiceError> {
        self.gate(
            "clean",
            ServiceCall::Clean {
                dataset_id: dataset_id.to_string(),
                config: config.clone(),
            },
        )
        .await?;

        let mut response = CleanResponse::default();
        response.report.rows_after = self.rows_after;
        Ok(response)
    }

    async fn analyze(
        &self,
        dataset_id: &str,
        weight_col: Option<&str>,
    ) -> Result<AnalysisReport, ServiceError> {
        self.gate(
            "analyze",
            ServiceCall::Analyze {
                dataset_id: dataset_id.to_string(),
                weight_col: weight_col.map(String::from),
            },
        )
        .await?;

        Ok(self.report.clone())
    }
}
