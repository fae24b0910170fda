//! # dk-protocol
//!
//! Core protocol definitions and data models for dataset-kit.
//!
//! This crate defines all shared data structures used for:
//! - Talking to the remote dataset service (upload, schema map, clean, analyze)
//! - Runtime run/step state management
//! - Event communication between the core and the UI shell
//!
//! ## Modules
//!
//! - [`dataset_models`]: Dataset descriptors and remote service wire types
//! - [`run_models`]: Runtime run state, processing steps and outcomes
//! - [`progress_models`]: Shared loading-overlay state
//! - [`ipc`]: Events emitted by the core for the UI to render
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for the web client
//! - Independent compilation: No dependencies on other dataset-kit crates

pub mod dataset_models;
pub mod ipc;
pub mod progress_models;
pub mod run_models;

// Re-export all public types for convenience
pub use dataset_models::*;
pub use ipc::*;
pub use progress_models::*;
pub use run_models::*;
