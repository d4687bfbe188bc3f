//! Outcome Manifest Parser
//!
//! [`JsonOutcomeParser`] reads the results a test run produced into [`OutcomeRecord`]s.
//!
//! ```json
//! {
//!   "outcomes": [
//!     { "identity": "suite.ListTest.testAppend", "status": "passed" },
//!     { "identity": "suite.ListTest.testRemove", "status": "failed", "detail": "expected 2 but was 3" }
//!   ]
//! }
//! ```
//!
//! `status` is one of `passed`, `failed`, `errored` or `skipped` (case-insensitive; the
//! common aliases `pass`, `fail`, `failure`, `error`, `skip` and `ignored` are accepted).
//! Outcomes are not checked for uniqueness here; repeated identities are the resolver's call.

use crate::error::GraderError;
use crate::traits::parser::Parser;
use crate::types::{OutcomeRecord, TestIdentity, TestStatus};
use serde_json::Value;

/// Parser for outcome manifests in JSON format.
pub struct JsonOutcomeParser;

impl<'a> Parser<&'a Value, Vec<OutcomeRecord>> for JsonOutcomeParser {
    fn parse(&self, raw: &'a Value) -> Result<Vec<OutcomeRecord>, GraderError> {
        let arr = raw
            .as_object()
            .and_then(|obj| obj.get("outcomes"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                GraderError::ParseManifest(
                    "Top-level JSON must be an object with an 'outcomes' array".to_string(),
                )
            })?;

        let mut outcomes = Vec::with_capacity(arr.len());
        for (i, entry) in arr.iter().enumerate() {
            let entry = entry.as_object().ok_or_else(|| {
                GraderError::ParseManifest(format!("Outcome entry at index {} is not an object", i))
            })?;

            let identity = match entry.get("identity") {
                Some(Value::String(s)) => TestIdentity::new(s.as_str()).map_err(|_| {
                    GraderError::ParseManifest(format!("Outcome entry at index {} has an empty 'identity'", i))
                })?,
                _ => {
                    return Err(GraderError::ParseManifest(format!(
                        "Outcome entry at index {} missing or invalid 'identity' field",
                        i
                    )));
                }
            };

            let status = match entry.get("status") {
                Some(Value::String(s)) => s.parse::<TestStatus>().map_err(|e| {
                    GraderError::ParseManifest(format!("Outcome for '{}': {}", identity, e))
                })?,
                _ => {
                    return Err(GraderError::ParseManifest(format!(
                        "Outcome for '{}' missing or invalid 'status' field",
                        identity
                    )));
                }
            };

            let mut outcome = OutcomeRecord::new(identity, status);
            match entry.get("detail") {
                Some(Value::String(s)) => outcome = outcome.with_detail(s.as_str()),
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(GraderError::ParseManifest(format!(
                        "Outcome for '{}' has a non-string 'detail'",
                        outcome.identity()
                    )));
                }
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_status() {
        let raw = json!({
            "outcomes": [
                { "identity": "a", "status": "passed" },
                { "identity": "b", "status": "FAILED", "detail": "boom" },
                { "identity": "c", "status": "error" },
                { "identity": "d", "status": "skipped", "detail": null }
            ]
        });
        let outcomes = JsonOutcomeParser.parse(&raw).unwrap();
        let statuses: Vec<TestStatus> = outcomes.iter().map(|o| o.status()).collect();
        assert_eq!(
            statuses,
            [TestStatus::Passed, TestStatus::Failed, TestStatus::Errored, TestStatus::Skipped]
        );
        assert_eq!(outcomes[1].detail(), Some("boom"));
        assert_eq!(outcomes[3].detail(), None);
    }

    #[test]
    fn keeps_repeated_identities_for_the_resolver() {
        let raw = json!({
            "outcomes": [
                { "identity": "a", "status": "passed" },
                { "identity": "a", "status": "failed" }
            ]
        });
        assert_eq!(JsonOutcomeParser.parse(&raw).unwrap().len(), 2);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = json!({ "outcomes": [{ "identity": "a", "status": "flaky" }] });
        let err = JsonOutcomeParser.parse(&raw).unwrap_err();
        assert!(matches!(err, GraderError::ParseManifest(msg) if msg.contains("flaky")));
    }

    #[test]
    fn structural_problems_are_rejected() {
        let cases = [
            json!({}),
            json!({ "outcomes": [1] }),
            json!({ "outcomes": [{ "status": "passed" }] }),
            json!({ "outcomes": [{ "identity": "", "status": "passed" }] }),
            json!({ "outcomes": [{ "identity": "a" }] }),
            json!({ "outcomes": [{ "identity": "a", "status": "passed", "detail": 7 }] }),
        ];
        for raw in cases {
            assert!(
                matches!(JsonOutcomeParser.parse(&raw).unwrap_err(), GraderError::ParseManifest(_)),
                "expected parse error for {raw}"
            );
        }
    }
}
