//! Extra Scoring Parser
//!
//! [`JsonExtrasParser`] reads the optional `checks` and `modules` sections of an outcome
//! manifest into an [`ExtraScoring`]. Both sections may be absent.
//!
//! ```json
//! {
//!   "outcomes": [],
//!   "checks": [
//!     { "type": "checkstyle", "description": "checkstyle", "points": 10, "passed": false,
//!       "explanation": "checkstyle found style issues" }
//!   ],
//!   "modules": [
//!     { "name": "app", "compiled": true },
//!     { "name": "lib", "compiled": false }
//!   ]
//! }
//! ```
//!
//! A check's `type` is `checkstyle` or `compileError`; graded tests only arrive through
//! `outcomes`. `explanation` is optional.

use crate::error::GraderError;
use crate::traits::parser::Parser;
use crate::types::{EntryKind, ExtraScoring, ModuleStatus, ScoredItem};
use serde_json::{Map, Value};

/// Parser for the non-test sections of an outcome manifest.
pub struct JsonExtrasParser;

impl<'a> Parser<&'a Value, ExtraScoring> for JsonExtrasParser {
    fn parse(&self, raw: &'a Value) -> Result<ExtraScoring, GraderError> {
        let obj = raw.as_object().ok_or_else(|| {
            GraderError::ParseManifest("Top-level JSON must be an object".to_string())
        })?;

        let mut extras = ExtraScoring::default();

        for (i, check) in section(obj, "checks")?.iter().enumerate() {
            let check = check.as_object().ok_or_else(|| {
                GraderError::ParseManifest(format!("Check at index {} is not an object", i))
            })?;
            extras.items.push(parse_check(i, check)?);
        }

        for (i, module) in section(obj, "modules")?.iter().enumerate() {
            let module = module.as_object().ok_or_else(|| {
                GraderError::ParseManifest(format!("Module at index {} is not an object", i))
            })?;
            let name = match module.get("name") {
                Some(Value::String(s)) => s.as_str(),
                _ => {
                    return Err(GraderError::ParseManifest(format!(
                        "Module at index {} missing or invalid 'name' field",
                        i
                    )));
                }
            };
            let compiled = match module.get("compiled") {
                Some(Value::Bool(b)) => *b,
                _ => {
                    return Err(GraderError::ParseManifest(format!(
                        "Module '{}' missing or invalid 'compiled' field",
                        name
                    )));
                }
            };
            extras.modules.push(ModuleStatus::new(name, compiled)?);
        }

        Ok(extras)
    }
}

fn section<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<&'v [Value], GraderError> {
    match obj.get(key) {
        Some(Value::Array(arr)) => Ok(arr.as_slice()),
        Some(Value::Null) | None => Ok(&[][..]),
        Some(_) => Err(GraderError::ParseManifest(format!("'{}' is not an array", key))),
    }
}

fn parse_check(i: usize, check: &Map<String, Value>) -> Result<ScoredItem, GraderError> {
    let kind = match check.get("type") {
        Some(Value::String(s)) => s
            .parse::<EntryKind>()
            .map_err(|e| GraderError::ParseManifest(format!("Check at index {}: {}", i, e)))?,
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Check at index {} missing or invalid 'type' field",
                i
            )));
        }
    };
    if kind == EntryKind::Test {
        return Err(GraderError::ParseManifest(format!(
            "Check at index {} has type 'test'; tests belong in 'outcomes'",
            i
        )));
    }

    let description = match check.get("description") {
        Some(Value::String(s)) => s.as_str(),
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Check at index {} missing or invalid 'description' field",
                i
            )));
        }
    };

    let points = match check.get("points") {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.as_i64().ok_or_else(|| {
            GraderError::InvalidMetadata(format!("'{}' has too many points ({})", description, n))
        })?,
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Check '{}' missing or invalid 'points' field (must be an integer)",
                description
            )));
        }
    };

    let passed = match check.get("passed") {
        Some(Value::Bool(b)) => *b,
        _ => {
            return Err(GraderError::ParseManifest(format!(
                "Check '{}' missing or invalid 'passed' field",
                description
            )));
        }
    };

    let item = ScoredItem::new(kind, description, points, passed)?;
    match check.get("explanation") {
        Some(Value::String(s)) => Ok(item.with_explanation(s.as_str())),
        Some(Value::Null) | None => Ok(item),
        Some(_) => Err(GraderError::ParseManifest(format!(
            "Check '{}' has a non-string 'explanation'",
            description
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_sections_mean_no_extras() {
        let extras = JsonExtrasParser.parse(&json!({ "outcomes": [] })).unwrap();
        assert!(extras.is_empty());
    }

    #[test]
    fn parses_checks_and_modules() {
        let raw = json!({
            "outcomes": [],
            "checks": [
                { "type": "checkstyle", "description": "checkstyle", "points": 10, "passed": false,
                  "explanation": "checkstyle found style issues" }
            ],
            "modules": [
                { "name": "app", "compiled": true },
                { "name": "lib", "compiled": false }
            ]
        });
        let extras = JsonExtrasParser.parse(&raw).unwrap();
        assert_eq!(extras.items.len(), 1);
        let style = &extras.items[0];
        assert_eq!(style.kind(), EntryKind::Checkstyle);
        assert_eq!(style.points(), 10);
        assert!(!style.passed());
        assert_eq!(style.explanation(), "checkstyle found style issues");

        let names: Vec<&str> = extras.modules.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["app", "lib"]);
        assert!(!extras.modules[1].compiled());
    }

    #[test]
    fn negative_check_points_are_invalid_metadata() {
        let raw = json!({
            "checks": [{ "type": "checkstyle", "description": "style", "points": -2, "passed": true }]
        });
        assert!(matches!(
            JsonExtrasParser.parse(&raw).unwrap_err(),
            GraderError::InvalidMetadata(_)
        ));
    }

    #[test]
    fn malformed_sections_are_rejected() {
        let cases = [
            json!({ "checks": {} }),
            json!({ "modules": "app" }),
            json!({ "checks": [{ "description": "s", "points": 1, "passed": true }] }),
            json!({ "checks": [{ "type": "test", "description": "s", "points": 1, "passed": true }] }),
            json!({ "checks": [{ "type": "lint", "description": "s", "points": 1, "passed": true }] }),
            json!({ "checks": [{ "type": "checkstyle", "description": "s", "points": 1 }] }),
            json!({ "modules": [{ "name": "app" }] }),
            json!({ "modules": [{ "compiled": true }] }),
        ];
        for raw in cases {
            assert!(
                matches!(JsonExtrasParser.parse(&raw).unwrap_err(), GraderError::ParseManifest(_)),
                "expected parse error for {raw}"
            );
        }
    }
}
