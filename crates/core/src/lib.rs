//! # dk-core
//!
//! Core orchestration logic for dataset-kit.
//!
//! This crate provides:
//! - The remote dataset service client (upload, schema map, clean, analyze)
//! - The upload processing orchestrator (three-stage pipeline)
//! - Run and overlay state management
//! - Configuration loading from `.dataset-kit/` directory
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`service`]: Dataset service trait and HTTP implementation
//! - [`engine`]: The pipeline orchestrator
//! - [`state`]: Run state, step tracker and progress reporter

pub mod config;
pub mod engine;
pub mod service;
pub mod state;
