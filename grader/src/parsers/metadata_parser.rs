//! Metadata Manifest Parser
//!
//! This module provides the [`JsonMetadataParser`] for turning a metadata manifest into
//! validated [`MetadataRecord`]s. The manifest is what a discovery step emits after
//! inspecting test code for grading annotations.
//!
//! # JSON Schema
//!
//! ```json
//! {
//!   "tests": [
//!     {
//!       "identity": "suite.ListTest.testAppend",
//!       "points": 10,
//!       "friendly_name": "Append adds to the end",
//!       "tags": [
//!         { "name": "category", "value": "lists" },
//!         { "name": "slow" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! - `identity` must be a non-empty string.
//! - `points` must be an integer; negative values are rejected as invalid metadata.
//! - `friendly_name` is optional (string or null); an empty string means none.
//! - `tags` is optional; each tag needs a `name` and may carry a string `value`.
//!
//! # Error Handling
//!
//! Shape problems are reported as [`GraderError::ParseManifest`]; values the records
//! reject surface as [`GraderError::InvalidMetadata`].

use crate::error::GraderError;
use crate::traits::parser::Parser;
use crate::types::{MetadataRecord, Tag, TestIdentity};
use serde_json::{Map, Value};

/// Parser for metadata manifests in JSON format.
pub struct JsonMetadataParser;

impl<'a> Parser<&'a Value, Vec<MetadataRecord>> for JsonMetadataParser {
    fn parse(&self, raw: &'a Value) -> Result<Vec<MetadataRecord>, GraderError> {
        let obj = raw.as_object().ok_or_else(|| {
            GraderError::ParseManifest("Top-level JSON must be an object with a 'tests' array".to_string())
        })?;

        let arr = obj.get("tests").and_then(|v| v.as_array()).ok_or_else(|| {
            GraderError::ParseManifest("Top-level JSON must have a 'tests' array field".to_string())
        })?;

        let mut records = Vec::with_capacity(arr.len());
        for (i, entry) in arr.iter().enumerate() {
            let entry = entry.as_object().ok_or_else(|| {
                GraderError::ParseManifest(format!("Test entry at index {} is not an object", i))
            })?;
            records.push(parse_entry(i, entry)?);
        }
        Ok(records)
    }
}

fn parse_entry(i: usize, entry: &Map<String, Value>) -> Result<MetadataRecord, GraderError> {
    let identity = match entry.get("identity") {
        Some(Value::String(s)) => TestIdentity::new(s.as_str())?,
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Test entry at index {} missing or invalid 'identity' field",
                i
            )));
        }
    };

    let points = match entry.get("points") {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.as_i64().ok_or_else(|| {
            GraderError::InvalidMetadata(format!("'{}' has too many points ({})", identity, n))
        })?,
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Test '{}' missing or invalid 'points' field (must be an integer)",
                identity
            )));
        }
    };

    let mut record = MetadataRecord::new(identity, points)?;

    match entry.get("friendly_name") {
        Some(Value::String(s)) => record = record.with_friendly_name(s.as_str()),
        Some(Value::Null) | None => {}
        Some(_) => {
            return Err(GraderError::ParseManifest(format!(
                "Test '{}' has a non-string 'friendly_name'",
                record.identity()
            )));
        }
    }

    let tags = match entry.get("tags") {
        Some(Value::Array(tags)) => tags,
        Some(Value::Null) | None => return Ok(record),
        Some(_) => {
            return Err(GraderError::ParseManifest(format!(
                "Test '{}' 'tags' is not an array",
                record.identity()
            )));
        }
    };

    for (j, tag) in tags.iter().enumerate() {
        let tag = tag.as_object().ok_or_else(|| {
            GraderError::ParseManifest(format!(
                "Test '{}' tag at index {} is not an object",
                record.identity(),
                j
            ))
        })?;
        let name = match tag.get("name") {
            Some(Value::String(s)) => s.as_str(),
            _ => {
                return Err(GraderError::ParseManifest(format!(
                    "Test '{}' tag {} missing or invalid 'name' field",
                    record.identity(),
                    j
                )));
            }
        };
        let value = match tag.get("value") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(GraderError::ParseManifest(format!(
                    "Test '{}' tag '{}' has a non-string 'value'",
                    record.identity(),
                    name
                )));
            }
        };
        record = record.with_tag(Tag::new(name, value)?);
    }

    Ok(record)
}
