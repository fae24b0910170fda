//! Shared test infrastructure for integration tests.

pub mod assertions;
pub mod fixtures;
pub mod mock_service;
