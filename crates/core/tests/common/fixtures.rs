//! Test fixtures for datasets and reports.

use dk_protocol::dataset_models::{AnalysisReport, DatasetDescriptor, PreviewRow};
use serde_json::{json, Value};

/// Build a dataset descriptor from JSON preview rows.
#[allow(dead_code)]
pub fn dataset_with_preview(rows: Vec<Value>) -> DatasetDescriptor {
    let preview: Vec<PreviewRow> = rows
        .into_iter()
        .map(|row| serde_json::from_value(row).expect("preview row must be an object"))
        .collect();

    DatasetDescriptor {
        id: "d1".to_string(),
        filename: "x.csv".to_string(),
        preview,
    }
}

/// The upload scenario from the product walkthrough: one row, two columns.
#[allow(dead_code)]
pub fn sample_dataset() -> DatasetDescriptor {
    dataset_with_preview(vec![json!({"age": 30, "income": 50000})])
}

/// A representative analysis payload.
#[allow(dead_code)]
pub fn sample_report() -> AnalysisReport {
    AnalysisReport {
        report_url: Some("/reports/d1.html".to_string()),
        report_type: Some("html".to_string()),
        charts_count: Some(4),
        stats: Some(json!({"rows": 1, "columns": 2})),
        ..AnalysisReport::default()
    }
}
