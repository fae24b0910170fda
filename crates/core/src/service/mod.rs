//! Remote dataset service client.
//!
//! This module provides:
//! - The [`DatasetService`] trait, the seam between the orchestrator and the
//!   backend
//! - [`HttpDatasetService`], the reqwest-based implementation

pub mod base;
pub mod http;

pub use base::{ColumnMapping, DatasetService, ServiceError};
pub use http::HttpDatasetService;
