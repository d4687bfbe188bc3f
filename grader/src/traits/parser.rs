//! Parser Trait
//!
//! This module defines the [`Parser`] trait, a generic interface for turning raw input
//! (usually a manifest's JSON value) into validated grading records. Implementations
//! check the input's shape and return a [`GraderError`] describing the first problem found.
//!
//! # Example
//!
//! ```rust
//! use grader::error::GraderError;
//! use grader::traits::parser::Parser;
//! use serde_json::Value;
//!
//! struct CountParser;
//!
//! impl<'a> Parser<&'a Value, usize> for CountParser {
//!     fn parse(&self, raw: &'a Value) -> Result<usize, GraderError> {
//!         raw.as_array()
//!             .map(Vec::len)
//!             .ok_or_else(|| GraderError::ParseManifest("expected an array".to_string()))
//!     }
//! }
//! ```

use crate::error::GraderError;

/// A generic trait for parsing data into a strongly-typed Rust structure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be parsed.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// Parse an input value into the target type.
    ///
    /// # Errors
    ///
    /// Returns a [`GraderError`] if the input does not conform to the expected schema
    /// or holds values the records reject.
    fn parse(&self, input: Input) -> Result<Output, GraderError>;
}
