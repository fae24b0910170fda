//! Shared loading-overlay reporter.
//!
//! The original design mutated a process-global store from anywhere in the
//! tree. Here the reporter is an explicit object with a single writer (the
//! orchestrator); observers subscribe to a watch channel, which gives the
//! required last-writer-wins semantics without queuing overlapping requests.

use dk_protocol::progress_models::ProgressState;
use tokio::sync::watch;

/// Writer handle for the session's loading overlay.
///
/// Deliberately not `Clone`: whoever owns the reporter is the only writer.
pub struct ProgressReporter {
    tx: watch::Sender<ProgressState>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::default());
        Self { tx }
    }

    /// Observe overlay state changes. Receivers always see the latest value.
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current overlay state.
    pub fn current(&self) -> ProgressState {
        self.tx.borrow().clone()
    }

    /// Show the overlay with an indeterminate spinner.
    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.is_visible = true;
            state.message = message;
            state.progress = None;
        });
    }

    /// Show the overlay with a determinate progress bar starting at 0.
    pub fn show_with_progress(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.is_visible = true;
            state.message = message;
            state.progress = Some(0);
        });
    }

    /// Hide the overlay and clear any progress value.
    pub fn hide(&self) {
        self.tx.send_modify(|state| {
            state.is_visible = false;
            state.progress = None;
        });
    }

    /// Update the progress percentage, clamped to 100.
    pub fn set_progress(&self, percent: u8) {
        self.tx.send_modify(|state| {
            state.progress = Some(percent.min(100));
        });
    }

    /// Update the overlay message without touching visibility or progress.
    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.message = message;
        });
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
