//! Runtime run state models.
//!
//! This module defines the structures for tracking one end-to-end execution
//! of the three-stage post-upload pipeline (mapping, cleaning, analysis).

use crate::dataset_models::AnalysisReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Status of a single processing step.
///
/// A step moves forward only: Pending -> Processing -> Completed, or
/// Pending -> Processing -> Error. Regressions are rejected by the step
/// tracker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Step has not started yet.
    Pending,

    /// Step is currently executing its remote call.
    Processing,

    /// Step finished successfully.
    Completed,

    /// Step failed; its message carries the failure text.
    Error,
}

impl StepStatus {
    fn rank(self) -> u8 {
        match self {
            StepStatus::Pending => 0,
            StepStatus::Processing => 1,
            StepStatus::Completed => 2,
            StepStatus::Error => 2,
        }
    }

    /// Whether a step in `self` may transition to `next`.
    ///
    /// Completed and Error are both terminal and mutually exclusive.
    pub fn advances_to(self, next: StepStatus) -> bool {
        next.rank() > self.rank()
    }
}

/// One entry in the step tracker.
///
/// Steps are created fresh at the start of every run, never reused across
/// runs, and mutated in place as the run progresses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProcessingStep {
    /// Stable identifier, unique within a run (`mapping`, `cleaning`, `analysis`).
    pub id: String,

    /// Human-readable step name for display.
    pub name: String,

    /// Current status.
    pub status: StepStatus,

    /// Optional status message (confirmation text or failure text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProcessingStep {
    /// Create a fresh pending step.
    pub fn pending(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: StepStatus::Pending,
            message: None,
        }
    }
}

/// Lifecycle status of a whole run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Run has been created but not started yet.
    Pending,

    /// Run is actively executing its stages.
    Running,

    /// All three stages completed successfully.
    Completed,

    /// A stage failed; the outcome carries the error.
    Failed,

    /// A newer run was started for the session while this one was in
    /// flight; this run stopped publishing updates.
    Superseded,
}

/// Final result of a run: the analysis payload, or an error descriptor.
///
/// Serialized untagged so the wire shape is either the report object itself
/// or `{"error": "..."}`. The error variant is declared first: an analysis
/// report matches any object, so it has to be the fallback when parsing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(untagged)]
pub enum RunOutcome {
    /// The failure message of the stage that halted the run.
    Error { error: String },

    /// The analysis payload returned by the final stage.
    Report(AnalysisReport),
}

/// Runtime state of a single pipeline execution.
///
/// Each run owns an ordered sequence of exactly three steps. A new run is
/// created for every upload; the previous run's state is superseded, not
/// mutated.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct Run {
    /// Unique identifier for this run.
    #[ts(type = "string")]
    pub id: Uuid,

    /// Dataset this run processes.
    pub dataset_id: String,

    /// Current lifecycle status.
    pub status: RunStatus,

    /// Zero-based index of the stage currently executing (or next to execute).
    pub current_stage: usize,

    /// Ordered step tracker: mapping, cleaning, analysis.
    pub steps: Vec<ProcessingStep>,

    /// Final result; present once the run completed or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,

    /// Accumulated log messages from this run.
    #[serde(default)]
    pub logs: Vec<String>,

    /// When the run was created.
    pub started_at: DateTime<Utc>,
}

impl Run {
    /// Find a step by id.
    pub fn step(&self, id: &str) -> Option<&ProcessingStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Find a step by id, mutably.
    pub fn step_mut(&mut self, id: &str) -> Option<&mut ProcessingStep> {
        self.steps.iter_mut().find(|s| s.id == id)
    }
}
