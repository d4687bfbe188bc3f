//! # Parsers
//!
//! Manifest parsers that turn raw JSON into validated grading records.
//!
//! - [`metadata_parser`]: graded-test metadata (points, friendly name, tags).
//! - [`outcome_parser`]: per-test execution outcomes.
//! - [`extras_parser`]: non-test checks and module build status from the outcome manifest.

pub mod extras_parser;
pub mod metadata_parser;
pub mod outcome_parser;
