//! Core-to-UI event protocol.
//!
//! The orchestrator reports progress exclusively through these events (plus
//! the shared overlay store); nothing is rendered from return values
//! directly. Communication is asynchronous and channel-based so the UI stays
//! responsive while remote calls are in flight.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::run_models::StepStatus;

/// Events sent from the core to the UI shell.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stepStatusUpdate",
///   "payload": {
///     "run_id": "uuid-here",
///     "step_id": "cleaning",
///     "status": "PROCESSING"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new pipeline run has started for a dataset.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        dataset_id: String,
    },

    /// A processing step changed status.
    StepStatusUpdate {
        #[ts(type = "string")]
        run_id: Uuid,
        step_id: String,
        status: StepStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A run produced new log output.
    RunLogChunk {
        #[ts(type = "string")]
        run_id: Uuid,
        content: String,
    },

    /// A run finished with all stages completed.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
    },

    /// A run halted on a stage failure.
    RunError {
        #[ts(type = "string")]
        run_id: Uuid,
        error: String,
    },
}
