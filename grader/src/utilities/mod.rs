//! # Utilities
//!
//! Helpers shared across the grader.
//!
//! - [`file_loader`]: loads and size-checks the metadata and outcome manifests.

pub mod file_loader;
