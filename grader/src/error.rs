//! Grader Error Types
//!
//! This module defines [`GraderError`], the error type returned by every fallible
//! operation in the grader, and [`ResolutionError`], the per-identity problems the
//! resolver collects while joining metadata with outcomes.
//!
//! None of these are transient: they describe inconsistent input and are never retried.
//!
//! # Example
//!
//! ```rust
//! use grader::error::GraderError;
//!
//! fn check_points(points: i64) -> Result<(), GraderError> {
//!     if points < 0 {
//!         return Err(GraderError::InvalidMetadata(format!("negative points: {points}")));
//!     }
//!     Ok(())
//! }
//! ```

use crate::types::TestIdentity;

/// A single identity that could not be resolved to exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Two or more metadata records share this identity.
    #[error("duplicate graded test identity '{0}'")]
    DuplicateIdentity(TestIdentity),
    /// A graded test produced no outcome.
    #[error("no outcome recorded for graded test '{0}'")]
    MissingOutcome(TestIdentity),
    /// A graded test produced more than one outcome.
    #[error("graded test '{identity}' has {count} outcomes, expected exactly one")]
    DuplicateOutcome { identity: TestIdentity, count: usize },
}

impl ResolutionError {
    pub fn identity(&self) -> &TestIdentity {
        match self {
            ResolutionError::DuplicateIdentity(id) => id,
            ResolutionError::MissingOutcome(id) => id,
            ResolutionError::DuplicateOutcome { identity, .. } => identity,
        }
    }
}

/// Represents all error types that can occur in the grader.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    /// Grading metadata is malformed (negative points, empty identity, empty tag name).
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// One or more graded tests could not be resolved. Lists every offender.
    #[error("Resolution failed: {}", join_errors(.0))]
    Resolution(Vec<ResolutionError>),

    /// Manifest JSON does not match the expected schema.
    #[error("Manifest parse error: {0}")]
    ParseManifest(String),

    /// Manifest text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// I/O error (file not found, unreadable, too large).
    #[error("I/O error: {0}")]
    Io(String),

    /// Grading configuration could not be loaded.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

fn join_errors(errors: &[ResolutionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
