//! Run state machine implementation.
//!
//! This module provides functions for managing the lifecycle of a Run,
//! including step transitions, event emission, and the generation counter
//! that supersedes stale runs.

use chrono::Utc;
use dk_protocol::ipc::Event;
use dk_protocol::run_models::{ProcessingStep, Run, RunOutcome, RunStatus, StepStatus};
use dk_protocol::AnalysisReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Stage index of the schema-mapping stage.
pub const STAGE_MAPPING: usize = 0;
/// Stage index of the cleaning stage.
pub const STAGE_CLEANING: usize = 1;
/// Stage index of the analysis stage.
pub const STAGE_ANALYSIS: usize = 2;

/// The fixed stage sequence: (step id, display name).
pub const STAGES: [(&str, &str); 3] = [
    ("mapping", "Schema Mapping"),
    ("cleaning", "Data Cleaning"),
    ("analysis", "Analysis"),
];

/// Create a new Run with three fresh Pending steps.
///
/// Steps are never reused across runs; calling this again for the same
/// dataset yields a clean tracker with no leftover messages.
pub fn create_run(dataset_id: &str) -> Run {
    Run {
        id: Uuid::new_v4(),
        dataset_id: dataset_id.to_string(),
        status: RunStatus::Pending,
        current_stage: 0,
        steps: STAGES
            .iter()
            .map(|(id, name)| ProcessingStep::pending(id, name))
            .collect(),
        outcome: None,
        logs: Vec::new(),
        started_at: Utc::now(),
    }
}

/// Transition the run to Running.
pub fn start_run(run: &mut Run) {
    run.status = RunStatus::Running;
}

/// Mark a stage as Processing and emit a step update event.
pub async fn start_stage(run: &mut Run, stage: usize, events_tx: &Sender<Event>) {
    run.current_stage = stage;
    update_step(run, stage, StepStatus::Processing, None, events_tx).await;
}

/// Mark a stage as Completed with a confirmation message.
pub async fn complete_stage(
    run: &mut Run,
    stage: usize,
    message: String,
    events_tx: &Sender<Event>,
) {
    update_step(run, stage, StepStatus::Completed, Some(message), events_tx).await;
}

/// Mark a stage as Error, fail the run, and record the error outcome.
///
/// Later stages are left untouched (they stay Pending). Emits a step update
/// followed by a RunError event.
pub async fn fail_stage(run: &mut Run, stage: usize, error: String, events_tx: &Sender<Event>) {
    update_step(
        run,
        stage,
        StepStatus::Error,
        Some(error.clone()),
        events_tx,
    )
    .await;
    run.status = RunStatus::Failed;
    run.outcome = Some(RunOutcome::Error {
        error: error.clone(),
    });
    let _ = events_tx
        .send(Event::RunError {
            run_id: run.id,
            error,
        })
        .await;
}

/// Mark the run as completed with the analysis payload as its outcome.
pub async fn complete_run(run: &mut Run, report: AnalysisReport, events_tx: &Sender<Event>) {
    run.status = RunStatus::Completed;
    run.outcome = Some(RunOutcome::Report(report));
    let _ = events_tx.send(Event::RunCompleted { run_id: run.id }).await;
}

/// Append a log message to the run and emit a log chunk event.
pub async fn log_to_run(run: &mut Run, events_tx: &Sender<Event>, message: String) {
    run.logs.push(message.clone());
    let _ = events_tx
        .send(Event::RunLogChunk {
            run_id: run.id,
            content: message,
        })
        .await;
}

/// Apply a status change to exactly one step, leaving others untouched.
///
/// Regressions are ignored: a step never moves back to an earlier status, and
/// terminal statuses never flip.
async fn update_step(
    run: &mut Run,
    stage: usize,
    status: StepStatus,
    message: Option<String>,
    events_tx: &Sender<Event>,
) {
    let run_id = run.id;
    if let Some(step) = run.steps.get_mut(stage) {
        if !step.status.advances_to(status) {
            return;
        }
        step.status = status;
        step.message.clone_from(&message);
        let _ = events_tx
            .send(Event::StepStatusUpdate {
                run_id,
                step_id: step.id.clone(),
                status,
                message,
            })
            .await;
    }
}

/// Session-wide run generation counter.
///
/// Starting a new upload while a run is in flight issues a fresh ticket and
/// invalidates all previous ones. An orchestrator holding a stale ticket
/// stops publishing at its next stage boundary instead of racing the newer
/// run's writes.
#[derive(Clone, Default)]
pub struct RunGeneration(Arc<AtomicU64>);

impl RunGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new run, superseding every earlier ticket.
    pub fn issue(&self) -> RunTicket {
        let seq = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        RunTicket {
            seq,
            counter: Arc::clone(&self.0),
        }
    }
}

/// Proof that a run is (still) the latest one in its session.
pub struct RunTicket {
    seq: u64,
    counter: Arc<AtomicU64>,
}

impl RunTicket {
    /// Whether this ticket's run is still the latest.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.seq
    }
}
