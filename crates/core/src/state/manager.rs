//! Run manager for coordinating pipeline runs across a session.
//!
//! The RunManager owns the run registry, the overlay, and the generation
//! counter. At most one run per session is current: starting a new run
//! supersedes any in-flight one, whose orchestrator stops publishing at its
//! next stage boundary. Already-issued network calls are not cancelled.

use crate::engine::UploadOrchestrator;
use crate::service::base::DatasetService;
use crate::state::run::{create_run, RunGeneration};
use anyhow::Result;
use dk_protocol::dataset_models::DatasetDescriptor;
use dk_protocol::ipc::Event;
use dk_protocol::progress_models::ProgressState;
use dk_protocol::run_models::Run;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use uuid::Uuid;

/// Manages all runs of a session.
pub struct RunManager {
    /// Registry of all runs, indexed by their UUID.
    runs: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Run>>>>>,

    /// The orchestrator executing pipelines.
    orchestrator: Arc<UploadOrchestrator>,

    /// Session-wide generation counter for superseding stale runs.
    generation: RunGeneration,

    /// Channel for sending events to the UI.
    events_tx: mpsc::Sender<Event>,
}

impl RunManager {
    /// Create a new RunManager over the given dataset service.
    pub fn new(service: Arc<dyn DatasetService>, events_tx: mpsc::Sender<Event>) -> Self {
        Self {
            runs: Arc::new(Mutex::new(HashMap::new())),
            orchestrator: Arc::new(UploadOrchestrator::new(service)),
            generation: RunGeneration::new(),
            events_tx,
        }
    }

    /// Use a pre-built orchestrator (e.g. with a shortened completion delay).
    pub fn with_orchestrator(mut self, orchestrator: UploadOrchestrator) -> Self {
        self.orchestrator = Arc::new(orchestrator);
        self
    }

    /// Observe the shared loading overlay.
    pub fn subscribe_overlay(&self) -> watch::Receiver<ProgressState> {
        self.orchestrator.subscribe_overlay()
    }

    /// Start executing the pipeline for a dataset in the background.
    ///
    /// The run is registered and its id returned immediately; progress is
    /// reported through the events channel and the overlay. Any in-flight
    /// run is superseded.
    pub async fn start_run(&self, dataset: DatasetDescriptor) -> Uuid {
        let run = create_run(&dataset.id);
        let run_id = run.id;

        {
            let mut runs = self.runs.lock().await;
            runs.insert(run_id, Arc::new(Mutex::new(run.clone())));
        }

        let ticket = self.generation.issue();
        let orchestrator = Arc::clone(&self.orchestrator);
        let runs = Arc::clone(&self.runs);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let final_run = orchestrator.execute(run, &dataset, &ticket, events_tx).await;
            let mut runs = runs.lock().await;
            runs.insert(run_id, Arc::new(Mutex::new(final_run)));
        });

        run_id
    }

    /// Get the current state of a run.
    ///
    /// The registry holds the initial snapshot until the spawned task
    /// finishes, then the final state. Live step progress is observed
    /// through the events channel and the overlay, not here.
    pub async fn get_run(&self, run_id: Uuid) -> Option<Run> {
        let runs = self.runs.lock().await;
        if let Some(run_arc) = runs.get(&run_id) {
            let run = run_arc.lock().await;
            Some(run.clone())
        } else {
            None
        }
    }

    /// Get all runs of this session.
    pub async fn all_runs(&self) -> Vec<Run> {
        let runs = self.runs.lock().await;
        let mut result = Vec::new();

        for run_arc in runs.values() {
            let run = run_arc.lock().await;
            result.push(run.clone());
        }

        result
    }

    /// Number of runs tracked in this session.
    pub async fn run_count(&self) -> usize {
        let runs = self.runs.lock().await;
        runs.len()
    }

    /// Remove a run from the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not found.
    pub async fn discard_run(&self, run_id: Uuid) -> Result<()> {
        let mut runs = self.runs.lock().await;
        if runs.remove(&run_id).is_some() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Run {} not found", run_id))
        }
    }
}
