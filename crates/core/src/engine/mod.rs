//! Upload processing orchestrator.
//!
//! The UploadOrchestrator runs the fixed three-stage post-upload pipeline
//! (schema mapping, cleaning, analysis) against the remote dataset service,
//! updating the step tracker and the shared overlay after every stage.
//!
//! Stages execute strictly sequentially; stage N+1 never starts unless stage
//! N succeeded. A single failure anywhere terminates the run: the failed
//! step carries the error message, later steps stay pending, the overlay is
//! hidden, and the error becomes the run's outcome. There is no retry and no
//! rollback of completed stages.

use crate::service::base::{ColumnMapping, DatasetService, ServiceError};
use crate::state::progress::ProgressReporter;
use crate::state::run::{
    complete_run, complete_stage, create_run, fail_stage, log_to_run, start_run, start_stage,
    RunTicket, STAGE_ANALYSIS, STAGE_CLEANING, STAGE_MAPPING,
};
use dk_protocol::dataset_models::{CleaningConfig, DatasetDescriptor};
use dk_protocol::ipc::Event;
use dk_protocol::progress_models::ProgressState;
use dk_protocol::run_models::{Run, RunStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::sync::watch;
use tracing::{info, warn};

/// Overlay progress at the start of the mapping stage.
const PROGRESS_MAPPING: u8 = 10;
/// Overlay progress once the schema map is created.
const PROGRESS_AFTER_MAPPING: u8 = 40;
/// Overlay progress once cleaning finished.
const PROGRESS_AFTER_CLEANING: u8 = 70;
/// Overlay progress on completion.
const PROGRESS_COMPLETE: u8 = 100;

/// How long the completed overlay stays visible before hiding, so the UI can
/// render the finished state.
const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_secs(1);

/// The upload processing orchestrator.
///
/// Owns the overlay reporter (single-writer contract) and a handle to the
/// dataset service. Step and run updates are published over the event
/// channel passed to [`UploadOrchestrator::run`]; nothing is rendered from
/// return values directly.
pub struct UploadOrchestrator {
    service: Arc<dyn DatasetService>,
    overlay: ProgressReporter,
    completion_delay: Duration,
}

impl UploadOrchestrator {
    /// Create a new orchestrator over the given dataset service.
    pub fn new(service: Arc<dyn DatasetService>) -> Self {
        Self {
            service,
            overlay: ProgressReporter::new(),
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }

    /// Override the delay between completion and hiding the overlay.
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Observe the overlay driven by this orchestrator.
    pub fn subscribe_overlay(&self) -> watch::Receiver<ProgressState> {
        self.overlay.subscribe()
    }

    /// Execute the three-stage pipeline for a freshly uploaded dataset.
    ///
    /// The ticket guards against stale runs: when a newer run has been
    /// started for the session, this run stops publishing at its next stage
    /// boundary and returns with status `Superseded`.
    ///
    /// # Returns
    ///
    /// The final Run state. Its outcome is the analysis payload on success
    /// or an error descriptor on the first stage failure; superseded runs
    /// carry no outcome.
    pub async fn run(
        &self,
        dataset: &DatasetDescriptor,
        ticket: &RunTicket,
        events_tx: Sender<Event>,
    ) -> Run {
        let run = create_run(&dataset.id);
        self.execute(run, dataset, ticket, events_tx).await
    }

    /// Run the pipeline on a pre-created Run (used by the run manager, which
    /// needs the run id before spawning the execution task).
    pub(crate) async fn execute(
        &self,
        mut run: Run,
        dataset: &DatasetDescriptor,
        ticket: &RunTicket,
        events_tx: Sender<Event>,
    ) -> Run {
        // A run superseded before it even announced itself must not touch
        // the shared overlay or emit anything: a spawned task can reach this
        // point after a newer run has already started.
        if !ticket.is_current() {
            return Self::supersede(run);
        }
        let _ = events_tx
            .send(Event::RunStarted {
                run_id: run.id,
                dataset_id: dataset.id.clone(),
            })
            .await;
        start_run(&mut run);
        self.overlay.show_with_progress("Initializing processing pipeline...");
        info!(run_id = %run.id, dataset_id = %dataset.id, "pipeline run started");

        // Stage 1: schema mapping. The mapping pairs every preview column
        // with itself; an empty preview yields an empty mapping and the
        // pipeline still proceeds.
        if !ticket.is_current() {
            return Self::supersede(run);
        }
        start_stage(&mut run, STAGE_MAPPING, &events_tx).await;
        self.overlay.set_message("Creating schema map...");
        self.overlay.set_progress(PROGRESS_MAPPING);

        let mapping = identity_mapping(dataset);
        match self.service.create_schema_map(&dataset.id, &mapping).await {
            Ok(_) => {
                complete_stage(
                    &mut run,
                    STAGE_MAPPING,
                    "Schema map created".to_string(),
                    &events_tx,
                )
                .await;
                self.overlay.set_progress(PROGRESS_AFTER_MAPPING);
            }
            Err(e) => return self.fail(run, STAGE_MAPPING, e, &events_tx).await,
        }

        // Stage 2: cleaning, always with the fixed configuration.
        if !ticket.is_current() {
            return Self::supersede(run);
        }
        start_stage(&mut run, STAGE_CLEANING, &events_tx).await;
        self.overlay.set_message("Cleaning dataset...");

        match self
            .service
            .clean(&dataset.id, &CleaningConfig::default())
            .await
        {
            Ok(resp) => {
                let message = match resp.report.rows_after {
                    Some(rows) => format!("{rows} rows after cleaning"),
                    None => "Dataset cleaned".to_string(),
                };
                complete_stage(&mut run, STAGE_CLEANING, message, &events_tx).await;
                self.overlay.set_progress(PROGRESS_AFTER_CLEANING);
            }
            Err(e) => return self.fail(run, STAGE_CLEANING, e, &events_tx).await,
        }

        // Stage 3: analysis, never weighted by the orchestrator.
        if !ticket.is_current() {
            return Self::supersede(run);
        }
        start_stage(&mut run, STAGE_ANALYSIS, &events_tx).await;
        self.overlay.set_message("Analyzing dataset...");

        match self.service.analyze(&dataset.id, None).await {
            Ok(report) => {
                complete_stage(
                    &mut run,
                    STAGE_ANALYSIS,
                    "Analysis complete".to_string(),
                    &events_tx,
                )
                .await;
                self.overlay.set_message("Analysis complete");
                self.overlay.set_progress(PROGRESS_COMPLETE);
                complete_run(&mut run, report, &events_tx).await;
                info!(run_id = %run.id, "pipeline run completed");

                // Let the completed state render before the overlay goes away.
                tokio::time::sleep(self.completion_delay).await;
                self.overlay.hide();
                run
            }
            Err(e) => self.fail(run, STAGE_ANALYSIS, e, &events_tx).await,
        }
    }

    /// Halt the run on a stage failure: mark the step, record the outcome,
    /// hide the overlay immediately (no stuck spinner).
    async fn fail(
        &self,
        mut run: Run,
        stage: usize,
        error: ServiceError,
        events_tx: &Sender<Event>,
    ) -> Run {
        let message = error.to_string();
        warn!(run_id = %run.id, stage, %message, "pipeline run failed");
        log_to_run(&mut run, events_tx, format!("Stage failed: {message}")).await;
        fail_stage(&mut run, stage, message, events_tx).await;
        self.overlay.hide();
        run
    }

    /// A newer run took over the session; stop publishing and step aside.
    fn supersede(mut run: Run) -> Run {
        run.status = RunStatus::Superseded;
        run
    }
}

/// Pair every column of the dataset preview with itself.
fn identity_mapping(dataset: &DatasetDescriptor) -> ColumnMapping {
    dataset
        .columns()
        .into_iter()
        .map(|column| (column.clone(), column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dk_protocol::dataset_models::{AnalysisReport, CleanResponse, UploadResponse};
    use dk_protocol::run_models::StepStatus;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    struct FlakyService {
        fail_clean: bool,
    }

    #[async_trait]
    impl DatasetService for FlakyService {
        async fn upload(
            &self,
            filename: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadResponse, ServiceError> {
            Ok(UploadResponse {
                dataset_id: "d1".to_string(),
                filename: filename.to_string(),
                preview: vec![],
            })
        }

        async fn create_schema_map(
            &self,
            _dataset_id: &str,
            _mapping: &ColumnMapping,
        ) -> Result<Value, ServiceError> {
            Ok(json!({"ok": true}))
        }

        async fn clean(
            &self,
            _dataset_id: &str,
            _config: &CleaningConfig,
        ) -> Result<CleanResponse, ServiceError> {
            if self.fail_clean {
                Err(ServiceError::Api("Server overloaded".to_string()))
            } else {
                Ok(CleanResponse::default())
            }
        }

        async fn analyze(
            &self,
            _dataset_id: &str,
            _weight_col: Option<&str>,
        ) -> Result<AnalysisReport, ServiceError> {
            Ok(AnalysisReport::default())
        }
    }

    fn dataset() -> DatasetDescriptor {
        DatasetDescriptor {
            id: "d1".to_string(),
            filename: "x.csv".to_string(),
            preview: vec![],
        }
    }

    fn orchestrator(fail_clean: bool) -> UploadOrchestrator {
        UploadOrchestrator::new(Arc::new(FlakyService { fail_clean }))
            .with_completion_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_successful_run_completes_all_steps() {
        let orchestrator = orchestrator(false);
        let generation = crate::state::run::RunGeneration::new();
        let (tx, _rx) = mpsc::channel(100);

        let run = orchestrator.run(&dataset(), &generation.issue(), tx).await;

        assert_eq!(run.status, RunStatus::Completed);
        assert!(run
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Completed));
    }

    #[tokio::test]
    async fn test_cleaning_failure_halts_pipeline() {
        let orchestrator = orchestrator(true);
        let generation = crate::state::run::RunGeneration::new();
        let (tx, _rx) = mpsc::channel(100);

        let run = orchestrator.run(&dataset(), &generation.issue(), tx).await;

        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.steps[0].status, StepStatus::Completed);
        assert_eq!(run.steps[1].status, StepStatus::Error);
        assert_eq!(run.steps[1].message.as_deref(), Some("Server overloaded"));
        assert_eq!(run.steps[2].status, StepStatus::Pending);
    }

    #[tokio::test]
    async fn test_failure_hides_overlay() {
        let orchestrator = orchestrator(true);
        let generation = crate::state::run::RunGeneration::new();
        let (tx, _rx) = mpsc::channel(100);
        let overlay = orchestrator.subscribe_overlay();

        let _ = orchestrator.run(&dataset(), &generation.issue(), tx).await;

        assert!(!overlay.borrow().is_visible);
    }

    #[tokio::test]
    async fn test_stale_ticket_supersedes_run() {
        let orchestrator = orchestrator(false);
        let generation = crate::state::run::RunGeneration::new();
        let stale = generation.issue();
        let _newer = generation.issue();
        let (tx, mut rx) = mpsc::channel(100);

        let run = orchestrator.run(&dataset(), &stale, tx).await;

        assert_eq!(run.status, RunStatus::Superseded);
        assert!(run.outcome.is_none());
        // Nothing went out, not even RunStarted.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_run_never_touches_overlay() {
        let orchestrator = orchestrator(false);
        let generation = crate::state::run::RunGeneration::new();
        let stale = generation.issue();
        let _newer = generation.issue();
        let (tx, _rx) = mpsc::channel(100);
        let overlay = orchestrator.subscribe_overlay();

        let run = orchestrator.run(&dataset(), &stale, tx).await;

        assert_eq!(run.status, RunStatus::Superseded);
        // The overlay still carries its initial hidden state; the stale run
        // must not reset it for whichever run took over the session.
        let state = overlay.borrow().clone();
        assert!(!state.is_visible);
        assert!(state.message.is_empty());
        assert!(state.progress.is_none());
    }

    #[test]
    fn test_identity_mapping_pairs_columns_with_themselves() {
        let dataset = DatasetDescriptor {
            id: "d1".to_string(),
            filename: "x.csv".to_string(),
            preview: vec![serde_json::from_value(json!({"age": 30, "income": 50000}))
                .expect("row")],
        };

        let mapping = identity_mapping(&dataset);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("age").map(String::as_str), Some("age"));
        assert_eq!(mapping.get("income").map(String::as_str), Some("income"));
    }

    #[test]
    fn test_identity_mapping_empty_preview() {
        assert!(identity_mapping(&dataset()).is_empty());
    }
}
