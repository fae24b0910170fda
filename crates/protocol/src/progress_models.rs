//! Shared loading-overlay state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// State of the full-screen loading overlay.
///
/// One instance exists per session. Writes are last-writer-wins; there is no
/// queue of overlapping show/hide requests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProgressState {
    /// Whether the overlay is shown.
    pub is_visible: bool,

    /// Message displayed under the spinner.
    pub message: String,

    /// Determinate progress in percent (0-100), or indeterminate when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            is_visible: false,
            message: String::new(),
            progress: None,
        }
    }
}
