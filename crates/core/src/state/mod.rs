//! State management for pipeline runs.
//!
//! This module provides:
//! - Run/step state machine logic
//! - The shared progress (overlay) reporter
//! - RunManager for coordinating runs across a session

pub mod manager;
pub mod progress;
pub mod run;
