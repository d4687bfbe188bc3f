//!
//! Traits Module
//!
//! Core traits used throughout the grader for extensibility.
//!
//! - [`parser`]: the generic trait for turning raw input into validated records.

pub mod parser;
